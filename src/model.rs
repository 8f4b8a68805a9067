/*!
 * Canonical subtitle data model.
 *
 * Every parser produces a `SubtitleData` and every exporter consumes one:
 * - `WordTiming`: one word with absolute timing, immutable once built
 * - `SubtitleLine`: one displayed caption interval with optional word timing
 * - `SubtitleData`: the document, lines kept sorted by start time
 *
 * Word timings are not required to sit inside their line's interval and
 * lines may overlap; both are preserved as encoded by the source.
 */

use serde::Serialize;
use std::cmp::Ordering;

use crate::errors::ValidationError;
use crate::style::MetaMap;

// @validates: finite, non-negative time value
fn check_time(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteTime);
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeTime { value });
    }
    Ok(())
}

// @validates: start/end pair with end strictly after start
fn check_range(start: f64, end: f64) -> Result<(), ValidationError> {
    check_time(start)?;
    check_time(end)?;
    if end <= start {
        return Err(ValidationError::InvalidTimeRange { start, end });
    }
    Ok(())
}

/// Collapse whitespace runs to single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Timing for a single spoken word
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordTiming {
    word: String,
    start_time: f64,
    end_time: f64,
}

impl WordTiming {
    /// Creates a validated word timing. The word is stored trimmed.
    pub fn new(word: impl Into<String>, start_time: f64, end_time: f64) -> Result<Self, ValidationError> {
        let word = word.into();
        let trimmed = word.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyWord);
        }
        check_range(start_time, end_time)?;

        Ok(Self {
            word: trimmed.to_string(),
            start_time,
            end_time,
        })
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// True when the two intervals share any time
    pub fn overlaps_with(&self, other: &WordTiming) -> bool {
        !(self.end_time <= other.start_time || self.start_time >= other.end_time)
    }
}

/// One displayed caption interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleLine {
    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds
    pub end_time: f64,

    /// Tag-free display text
    pub text: String,

    /// Per-word timing, empty when the source has none
    pub words: Vec<WordTiming>,

    /// Opaque per-line style values
    pub style_overrides: MetaMap,
}

impl SubtitleLine {
    // @creates: Validated subtitle line
    // @validates: Time range and non-empty text
    pub fn new(
        start_time: f64,
        end_time: f64,
        text: impl Into<String>,
        words: Vec<WordTiming>,
        style_overrides: MetaMap,
    ) -> Result<Self, ValidationError> {
        check_range(start_time, end_time)?;

        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyText);
        }

        Ok(Self {
            start_time,
            end_time,
            text: trimmed.to_string(),
            words,
            style_overrides,
        })
    }

    /// Creates a line without word timing or style overrides
    pub fn plain(start_time: f64, end_time: f64, text: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(start_time, end_time, text, Vec::new(), MetaMap::new())
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn overlaps_with(&self, other: &SubtitleLine) -> bool {
        !(self.end_time <= other.start_time || self.start_time >= other.end_time)
    }

    /// The word active at `time`, if any
    pub fn word_at(&self, time: f64) -> Option<&WordTiming> {
        self.words
            .iter()
            .find(|w| w.start_time <= time && time < w.end_time)
    }

    /// Whether the space-joined words reproduce the text after whitespace normalization.
    ///
    /// Lines without word timing trivially match.
    pub fn words_match_text(&self) -> bool {
        if self.words.is_empty() {
            return true;
        }
        let joined = self
            .words
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        normalize_whitespace(&joined) == normalize_whitespace(&self.text)
    }

    /// Append a word timing. No containment check against the line interval.
    pub fn push_word(&mut self, word: WordTiming) {
        self.words.push(word);
    }
}

/// Summary figures about a document
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DocumentStatistics {
    pub total_lines: usize,
    pub total_words: usize,
    pub total_duration: f64,
    pub average_line_duration: f64,
    pub average_words_per_line: f64,
    pub earliest_start: Option<f64>,
    pub latest_end: Option<f64>,
    /// Adjacent (by start time) line pairs that overlap
    pub overlapping_lines: usize,
}

/// A complete subtitle document
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SubtitleData {
    /// Lines sorted ascending by start time
    pub lines: Vec<SubtitleLine>,

    /// Defaults applied when a line carries no override
    pub global_style: MetaMap,

    /// Opaque document metadata
    pub metadata: MetaMap,
}

fn by_start_time(a: &SubtitleLine, b: &SubtitleLine) -> Ordering {
    a.start_time.total_cmp(&b.start_time)
}

impl SubtitleData {
    /// Creates a document, stably sorting the lines by start time
    pub fn new(lines: Vec<SubtitleLine>, global_style: MetaMap, metadata: MetaMap) -> Self {
        let mut data = Self {
            lines,
            global_style,
            metadata,
        };
        data.sort_lines();
        data
    }

    /// An empty document
    pub fn empty() -> Self {
        Self::default()
    }

    /// Stable sort by start time; ties keep their current order
    pub fn sort_lines(&mut self) {
        self.lines.sort_by(by_start_time);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Latest end time over all lines, zero for an empty document
    pub fn total_duration(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.end_time)
            .fold(0.0, f64::max)
    }

    /// First line active at `time`
    pub fn line_at(&self, time: f64) -> Option<&SubtitleLine> {
        self.lines
            .iter()
            .find(|l| l.start_time <= time && time < l.end_time)
    }

    /// Lines intersecting the half-open range `[start, end)`
    pub fn lines_in_range(&self, start: f64, end: f64) -> Vec<&SubtitleLine> {
        self.lines
            .iter()
            .filter(|l| !(l.end_time <= start || l.start_time >= end))
            .collect()
    }

    /// Insert a line, keeping the order. Lands after lines with an equal start time.
    pub fn add_line(&mut self, line: SubtitleLine) {
        let index = self
            .lines
            .partition_point(|l| l.start_time <= line.start_time);
        self.lines.insert(index, line);
    }

    pub fn remove_line(&mut self, index: usize) -> Option<SubtitleLine> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    pub fn clear_lines(&mut self) {
        self.lines.clear();
    }

    /// Compute summary statistics
    pub fn statistics(&self) -> DocumentStatistics {
        if self.lines.is_empty() {
            return DocumentStatistics::default();
        }

        let total_lines = self.lines.len();
        let total_words: usize = self.lines.iter().map(|l| l.words.len()).sum();
        let duration_sum: f64 = self.lines.iter().map(|l| l.duration()).sum();
        let earliest_start = self
            .lines
            .iter()
            .map(|l| l.start_time)
            .fold(f64::INFINITY, f64::min);
        let latest_end = self.total_duration();
        let overlapping_lines = self
            .lines
            .windows(2)
            .filter(|pair| pair[0].overlaps_with(&pair[1]))
            .count();

        DocumentStatistics {
            total_lines,
            total_words,
            total_duration: latest_end,
            average_line_duration: duration_sum / total_lines as f64,
            average_words_per_line: total_words as f64 / total_lines as f64,
            earliest_start: Some(earliest_start),
            latest_end: Some(latest_end),
            overlapping_lines,
        }
    }
}
