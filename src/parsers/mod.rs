/*!
 * Subtitle format parsers, exporters and the parser factory.
 *
 * - `json`: structured segment format produced by speech-to-text tooling
 * - `ass`: Advanced SubStation Alpha with `{\kNN}` karaoke timing
 *
 * Parsers are stateless; every call touches only its own locals and the
 * path it was given, so they can be used from several threads at once.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::app_config::ParserConfig;
use crate::errors::{Result, SubtitleError};
use crate::file_utils::FileManager;
use crate::model::SubtitleData;

pub mod ass;
pub mod json;

pub use ass::AssSubtitleParser;
pub use json::JsonSubtitleParser;

// @const: ASS section header, matched anywhere in the file, case-insensitive
static ASS_SECTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^\s*\[(script info|v4\+? styles|events)\]\s*$").unwrap()
});

/// Subtitle file formats known to the factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Json,
    Ass,
    Unknown,
}

impl FormatTag {
    /// File extension used when writing this format
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::Json => Some("json"),
            Self::Ass => Some("ass"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Ass => "ass",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for FormatTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "ass" | "ssa" => Ok(Self::Ass),
            _ => Err(anyhow::anyhow!("Unknown subtitle format: {}", s)),
        }
    }
}

/// Why a record was dropped or degraded during a lenient parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Event line with too few fields
    MalformedEvent,
    /// Event time field did not parse
    InvalidTimestamp,
    /// Event values broke a line invariant
    InvalidEvent,
    /// Event text was empty once tags were stripped
    EmptyText,
    /// A karaoke word had invalid timing and was skipped
    InvalidWord,
    /// A style line could not be read
    InvalidStyle,
}

impl WarningKind {
    /// Whether this warning means a whole line was dropped
    pub fn drops_line(&self) -> bool {
        matches!(
            self,
            Self::MalformedEvent | Self::InvalidTimestamp | Self::InvalidEvent | Self::EmptyText
        )
    }
}

/// A recoverable problem found while parsing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseWarning {
    /// 1-based source line number, when the format is line oriented
    pub line_number: Option<usize>,
    pub kind: WarningKind,
    pub message: String,
}

impl ParseWarning {
    pub fn at_line(line_number: usize, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            line_number: Some(line_number),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_number {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Parsed document plus the warnings collected on the way
#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport {
    pub data: SubtitleData,
    pub warnings: Vec<ParseWarning>,
}

impl ParseReport {
    pub fn new(data: SubtitleData, warnings: Vec<ParseWarning>) -> Self {
        Self { data, warnings }
    }

    /// Number of source lines dropped entirely
    pub fn dropped_lines(&self) -> usize {
        self.warnings.iter().filter(|w| w.kind.drops_line()).count()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Common contract for every subtitle format
pub trait SubtitleParser: Send + Sync {
    /// Format handled by this parser
    fn format(&self) -> FormatTag;

    /// Lowercase extensions including the leading dot
    fn supported_extensions(&self) -> &'static [&'static str];

    /// Parse in-memory content. `source` is used for error messages only.
    fn parse_str(&self, content: &str, source: &Path) -> Result<ParseReport>;

    /// Encode a document into this format's text
    fn export_to_string(&self, data: &SubtitleData, destination: &Path) -> Result<String>;

    /// Read and parse a file, keeping the warnings
    fn parse_with_report(&self, path: &Path) -> Result<ParseReport> {
        let content = FileManager::read_to_string(path)?;
        let report = self.parse_str(&content, path)?;
        debug!(
            "Parsed {} as {}: {} lines, {} warnings",
            path.display(),
            self.format(),
            report.data.lines.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Read and parse a file
    fn parse(&self, path: &Path) -> Result<SubtitleData> {
        Ok(self.parse_with_report(path)?.data)
    }

    /// Encode and write a document
    fn export(&self, data: &SubtitleData, path: &Path) -> Result<()> {
        let content = self.export_to_string(data, path)?;
        FileManager::write_to_file(path, &content)?;
        debug!("Exported {} lines to {}", data.lines.len(), path.display());
        Ok(())
    }
}

/// Build the parser for a format tag
pub fn parser_for_format(format: FormatTag, config: &ParserConfig) -> Option<Box<dyn SubtitleParser>> {
    match format {
        FormatTag::Json => Some(Box::new(JsonSubtitleParser::with_config(config.json.clone()))),
        FormatTag::Ass => Some(Box::new(AssSubtitleParser::with_config(config.ass.clone()))),
        FormatTag::Unknown => None,
    }
}

/// Pick a parser by file extension (case-insensitive) using default settings
pub fn create_parser(path: &Path) -> Result<Box<dyn SubtitleParser>> {
    create_parser_with_config(path, &ParserConfig::default())
}

/// Pick a parser by file extension (case-insensitive)
pub fn create_parser_with_config(path: &Path, config: &ParserConfig) -> Result<Box<dyn SubtitleParser>> {
    let extension = FileManager::extension_of(path);
    let format = match extension.as_deref() {
        Some("json") => FormatTag::Json,
        Some("ass") | Some("ssa") => FormatTag::Ass,
        _ => FormatTag::Unknown,
    };

    parser_for_format(format, config).ok_or_else(|| SubtitleError::UnsupportedExtension {
        path: path.to_path_buf(),
        extension: extension.map(|e| format!(".{}", e)).unwrap_or_default(),
    })
}

/// Sniff a file's format from its content. Never fails.
pub fn detect_format(path: &Path) -> FormatTag {
    match FileManager::read_to_string(path) {
        Ok(content) => detect_format_from_str(&content),
        Err(e) => {
            debug!("Format detection could not read {}: {}", path.display(), e);
            FormatTag::Unknown
        }
    }
}

/// Sniff a format from in-memory content: JSON first, then ASS section headers
pub fn detect_format_from_str(content: &str) -> FormatTag {
    let trimmed = content.trim_start_matches('\u{feff}').trim();

    if trimmed.starts_with('{') {
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(trimmed) {
            if map.contains_key("segments") || map.contains_key("word_segments") {
                return FormatTag::Json;
            }
        }
    }

    if ASS_SECTION_REGEX.is_match(trimmed) {
        return FormatTag::Ass;
    }

    FormatTag::Unknown
}
