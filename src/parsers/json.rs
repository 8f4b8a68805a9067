/*!
 * JSON segment format.
 *
 * Layout produced by the upstream speech-to-text tooling:
 *
 * ```json
 * {
 *   "metadata": { ... },
 *   "segments": [{"start_time": 1.0, "end_time": 2.0, "text": "Hi", "segment_id": 0}],
 *   "word_segments": [{"word": "Hi", "start_time": 1.0, "end_time": 2.0, "segment_id": 0}]
 * }
 * ```
 *
 * The input is machine generated, so any structural or validation problem
 * fails the whole parse instead of being skipped.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use super::{FormatTag, ParseReport, SubtitleParser};
use crate::app_config::JsonConfig;
use crate::errors::{Result, SubtitleError};
use crate::model::{SubtitleData, SubtitleLine, WordTiming};
use crate::style::{default_global_style, MetaMap, MetaValue};

/// Current on-disk layout version written with statistics
pub const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Deserialize)]
struct RawSegment {
    start_time: f64,
    end_time: f64,
    text: String,
    // Older exports omit the id; the segment position stands in for it
    #[serde(default)]
    segment_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawWordSegment {
    word: String,
    start_time: f64,
    end_time: f64,
    segment_id: i64,
}

#[derive(Debug, Serialize)]
struct ExportSegment<'a> {
    start_time: f64,
    end_time: f64,
    duration: f64,
    text: &'a str,
    segment_id: usize,
}

#[derive(Debug, Serialize)]
struct ExportWordSegment<'a> {
    word: &'a str,
    start_time: f64,
    end_time: f64,
    duration: f64,
    segment_id: usize,
}

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    metadata: MetaMap,
    segments: Vec<ExportSegment<'a>>,
    word_segments: Vec<ExportWordSegment<'a>>,
}

/// Parser and exporter for the JSON segment format
#[derive(Debug, Clone, Default)]
pub struct JsonSubtitleParser {
    config: JsonConfig,
}

impl JsonSubtitleParser {
    /// Create a parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom settings
    pub fn with_config(config: JsonConfig) -> Self {
        Self { config }
    }

    fn is_discarded_text(&self, text: &str) -> bool {
        text.is_empty() || text == self.config.no_text_sentinel
    }

    // @decodes: the optional metadata object
    fn decode_metadata(root: &mut serde_json::Map<String, Value>, source: &Path) -> Result<MetaMap> {
        match root.remove("metadata") {
            None | Some(Value::Null) => Ok(MetaMap::new()),
            Some(value @ Value::Object(_)) => serde_json::from_value(value)
                .map_err(|e| SubtitleError::format(source, format!("invalid metadata: {}", e))),
            Some(_) => Err(SubtitleError::format(source, "'metadata' must be an object")),
        }
    }

    // @decodes: a required or optional array field
    fn take_array(
        root: &mut serde_json::Map<String, Value>,
        key: &str,
        required: bool,
        source: &Path,
    ) -> Result<Vec<Value>> {
        match root.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            None if !required => Ok(Vec::new()),
            None => Err(SubtitleError::format(source, format!("missing '{}' array", key))),
            Some(_) => Err(SubtitleError::format(source, format!("'{}' must be an array", key))),
        }
    }
}

impl SubtitleParser for JsonSubtitleParser {
    fn format(&self) -> FormatTag {
        FormatTag::Json
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &[".json"]
    }

    fn parse_str(&self, content: &str, source: &Path) -> Result<ParseReport> {
        let root: Value = serde_json::from_str(content).map_err(|e| SubtitleError::JsonSyntax {
            path: source.to_path_buf(),
            line: e.line(),
            column: e.column(),
            source: e,
        })?;

        let Value::Object(mut root) = root else {
            return Err(SubtitleError::format(source, "top-level JSON value must be an object"));
        };

        let metadata = Self::decode_metadata(&mut root, source)?;
        let raw_segments = Self::take_array(&mut root, "segments", true, source)?;
        let raw_words = Self::take_array(&mut root, "word_segments", false, source)?;

        // Group word segments by segment id, keeping their relative order
        let mut words_by_segment: HashMap<i64, Vec<(usize, RawWordSegment)>> = HashMap::new();
        for (index, value) in raw_words.into_iter().enumerate() {
            let word: RawWordSegment = serde_json::from_value(value).map_err(|e| {
                SubtitleError::format(source, format!("word segment {}: {}", index, e))
            })?;
            words_by_segment.entry(word.segment_id).or_default().push((index, word));
        }

        let mut lines = Vec::with_capacity(raw_segments.len());
        let mut discarded = 0usize;

        for (index, value) in raw_segments.into_iter().enumerate() {
            let segment: RawSegment = serde_json::from_value(value).map_err(|e| {
                SubtitleError::format(source, format!("segment {}: {}", index, e))
            })?;

            let text = segment.text.trim();
            if self.is_discarded_text(text) {
                discarded += 1;
                continue;
            }

            let segment_id = segment.segment_id.unwrap_or(index as i64);
            let mut words = Vec::new();
            if let Some(raw) = words_by_segment.get(&segment_id) {
                for (word_index, raw_word) in raw {
                    let timing = WordTiming::new(raw_word.word.as_str(), raw_word.start_time, raw_word.end_time)
                        .map_err(|e| {
                            SubtitleError::validation(
                                format!("word segment {} of segment {} in {}", word_index, index, source.display()),
                                e,
                            )
                        })?;
                    words.push(timing);
                }
            }

            let line = SubtitleLine::new(segment.start_time, segment.end_time, text, words, MetaMap::new())
                .map_err(|e| {
                    SubtitleError::validation(format!("segment {} in {}", index, source.display()), e)
                })?;
            lines.push(line);
        }

        if discarded > 0 {
            debug!("Discarded {} empty or no-text segments from {}", discarded, source.display());
        }

        let data = SubtitleData::new(lines, default_global_style(), metadata);
        Ok(ParseReport::new(data, Vec::new()))
    }

    fn export_to_string(&self, data: &SubtitleData, destination: &Path) -> Result<String> {
        let mut segments = Vec::with_capacity(data.lines.len());
        let mut word_segments = Vec::new();

        for (segment_id, line) in data.lines.iter().enumerate() {
            segments.push(ExportSegment {
                start_time: line.start_time,
                end_time: line.end_time,
                duration: line.duration(),
                text: &line.text,
                segment_id,
            });

            for word in &line.words {
                word_segments.push(ExportWordSegment {
                    word: word.word(),
                    start_time: word.start_time(),
                    end_time: word.end_time(),
                    duration: word.duration(),
                    segment_id,
                });
            }
        }

        let mut metadata = data.metadata.clone();
        if self.config.include_statistics {
            metadata.insert("total_segments".to_string(), MetaValue::Integer(segments.len() as i64));
            metadata.insert("total_words".to_string(), MetaValue::Integer(word_segments.len() as i64));
            metadata.insert("format_version".to_string(), FORMAT_VERSION.into());
        }

        let document = ExportDocument {
            metadata,
            segments,
            word_segments,
        };

        let encoded = if self.config.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        };

        encoded.map_err(|e| SubtitleError::Serialization {
            path: destination.to_path_buf(),
            source: e,
        })
    }
}
