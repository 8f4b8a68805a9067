/*!
 * Karaoke word-timing reconstruction for ASS dialogue text.
 *
 * ASS karaoke encodes per-word timing as `{\kNN}` tags, where `NN` is the
 * duration in centiseconds of the text run that follows the tag. This module:
 * - rebuilds absolute `WordTiming`s from those tags, anchored at the line start
 * - strips every `{...}` override block to produce clean display text
 * - synthesizes karaoke tags back from word timings for export
 */

use log::warn;
use std::borrow::Cow;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Result, SubtitleError, ValidationError};
use crate::model::{normalize_whitespace, WordTiming};
use crate::timecode::duration_to_centiseconds;

// @const: Karaoke duration tag, `\k` plus the `\K`, `\kf` and `\ko` fill variants
static KARAOKE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\\(?:kf|ko|k|K)(\d+)\}").unwrap()
});

// @const: Any override block
static OVERRIDE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

// @const: Soft/hard line breaks and hard spaces
static ESCAPE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[Nnh]").unwrap());

/// A word dropped during reconstruction because its timing was invalid
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedWord {
    /// Position of the karaoke tag within the line (0-based)
    pub tag_index: usize,
    pub word: String,
    pub duration_cs: u64,
    pub reason: ValidationError,
}

/// Output of karaoke reconstruction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KaraokeWords {
    pub words: Vec<WordTiming>,
    pub skipped: Vec<SkippedWord>,
    /// Sum of every karaoke tag duration, including empty and skipped runs
    pub total_centiseconds: u64,
}

impl KaraokeWords {
    /// Whether the text contained any karaoke tag at all
    pub fn has_karaoke(&self) -> bool {
        !self.words.is_empty() || !self.skipped.is_empty() || self.total_centiseconds > 0
    }
}

// @strips: override blocks and escapes, then collapses whitespace
fn strip_markup(raw: &str) -> String {
    let without_tags = OVERRIDE_TAG_REGEX.replace_all(raw, "");
    let without_escapes = ESCAPE_REGEX.replace_all(&without_tags, " ");
    normalize_whitespace(&without_escapes)
}

/// Remove every `{...}` tag from ASS dialogue text and normalize whitespace.
///
/// Independent of karaoke reconstruction: the display text is correct even
/// when the karaoke data is absent or broken.
pub fn clean_ass_text(text: &str) -> String {
    strip_markup(text)
}

/// Rebuild word timings from the karaoke tags in `text`.
///
/// Each tag opens a run that lasts until the next karaoke tag or the end of
/// the string. Runs with no text still advance the clock. Words whose timing
/// is invalid (for example `{\k0}`) are reported in `skipped` instead of
/// failing the line. Text before the first tag carries no timing and is ignored.
pub fn reconstruct_words(text: &str, line_start: f64) -> KaraokeWords {
    let tags: Vec<_> = KARAOKE_TAG_REGEX.captures_iter(text).collect();
    let mut result = KaraokeWords::default();

    // Elapsed time is kept in whole centiseconds to avoid float drift
    let mut elapsed_cs: u64 = 0;

    for (index, cap) in tags.iter().enumerate() {
        let Some(tag) = cap.get(0) else { continue };
        let duration_cs: u64 = cap[1].parse().unwrap_or(0);

        let run_end = tags
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let word = strip_markup(&text[tag.end()..run_end]);

        let start = line_start + elapsed_cs as f64 / 100.0;
        elapsed_cs = elapsed_cs.saturating_add(duration_cs);
        let end = line_start + elapsed_cs as f64 / 100.0;

        if word.is_empty() {
            continue;
        }

        match WordTiming::new(word.clone(), start, end) {
            Ok(timing) => result.words.push(timing),
            Err(reason) => {
                warn!("Skipping karaoke word '{}' (tag {}): {}", word, index + 1, reason);
                result.skipped.push(SkippedWord {
                    tag_index: index,
                    word,
                    duration_cs,
                    reason,
                });
            }
        }
    }

    result.total_centiseconds = elapsed_cs;
    result
}

/// Replace override braces in plain text with fullwidth lookalikes so the
/// text survives a re-parse instead of being stripped as a tag
pub fn escape_override_braces(text: &str) -> Cow<'_, str> {
    if text.contains(['{', '}']) {
        Cow::Owned(text.replace('{', "\u{FF5B}").replace('}', "\u{FF5D}"))
    } else {
        Cow::Borrowed(text)
    }
}

// @aligns: each word to its tokens in `text`; `None` when some word is missing
fn align_words(tokens: &[&str], words: &[WordTiming]) -> Option<Vec<(usize, usize)>> {
    let mut spans = Vec::with_capacity(words.len());
    let mut cursor = 0;

    for word in words {
        let needle: Vec<&str> = word.word().split_whitespace().collect();
        if needle.is_empty() {
            return None;
        }
        let offset = tokens[cursor..]
            .windows(needle.len())
            .position(|window| window == needle.as_slice())?;
        let start = cursor + offset;
        cursor = start + needle.len();
        spans.push((start, cursor));
    }

    Some(spans)
}

// @converts: absolute time to whole centiseconds after the line start
fn offset_centiseconds(line_start: f64, time: f64) -> u64 {
    duration_to_centiseconds(time - line_start)
}

/// Build ASS karaoke text for a line from its word timings.
///
/// Each word becomes `{\kNN}word` with `NN` the rounded duration in
/// centiseconds. Time between the line start and the first word, or between
/// two words, is written as an empty `{\kNN}` run. Text that no word covers is
/// kept: before the first word as untimed plain text, later as a `{\k0}` run.
/// Runs are joined by a single space. When the words cannot be located in
/// `text`, only the words are written.
pub fn synthesize_karaoke(line_start: f64, text: &str, words: &[WordTiming]) -> Result<String> {
    for (index, word) in words.iter().enumerate() {
        let duration = word.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return Err(SubtitleError::validation(
                format!("word {} ('{}')", index, word.word()),
                ValidationError::InvalidTimeRange {
                    start: word.start_time(),
                    end: word.end_time(),
                },
            ));
        }
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let spans = align_words(&tokens, words);

    let mut runs: Vec<String> = Vec::with_capacity(words.len() + 1);
    let mut prefix = String::new();
    let mut token_cursor = 0;
    let mut elapsed_cs: u64 = 0;

    for (index, word) in words.iter().enumerate() {
        if let Some((start, end)) = spans.as_ref().map(|spans| spans[index]) {
            if start > token_cursor {
                let untimed = tokens[token_cursor..start].join(" ");
                if index == 0 {
                    prefix = escape_override_braces(&untimed).into_owned();
                } else {
                    runs.push(format!("{{\\k0}}{}", escape_override_braces(&untimed)));
                }
            }
            token_cursor = end;
        }

        let mut run = String::new();
        let word_start_cs = offset_centiseconds(line_start, word.start_time());
        if word_start_cs > elapsed_cs {
            run.push_str(&format!("{{\\k{}}}", word_start_cs - elapsed_cs));
            elapsed_cs = word_start_cs;
        }

        let duration_cs = duration_to_centiseconds(word.duration());
        run.push_str(&format!("{{\\k{}}}{}", duration_cs, escape_override_braces(word.word())));
        elapsed_cs += duration_cs;
        runs.push(run);
    }

    if spans.is_some() && token_cursor < tokens.len() {
        let untimed = tokens[token_cursor..].join(" ");
        runs.push(format!("{{\\k0}}{}", escape_override_braces(&untimed)));
    }

    let karaoke = runs.join(" ");
    if prefix.is_empty() {
        Ok(karaoke)
    } else {
        Ok(format!("{} {}", prefix, karaoke))
    }
}
