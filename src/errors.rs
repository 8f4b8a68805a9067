/*!
 * Error types for the subcraft library.
 *
 * Every failure the parsing layer can report is a variant of `SubtitleError`.
 * Variants fall into three classes (see `ErrorKind`):
 * - Format: the input does not follow the container syntax, or the format is unsupported
 * - Validation: a decoded value breaks a data-model invariant
 * - Io: the file system refused a read or write
 */

use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of a `SubtitleError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Container syntax or unsupported format
    Format,
    /// Data-model invariant violation
    Validation,
    /// File system failure
    Io,
}

/// Invariant violations raised by the data model constructors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Line text is empty after trimming
    #[error("text cannot be empty or whitespace only")]
    EmptyText,

    /// Word is empty after trimming
    #[error("word cannot be empty or whitespace only")]
    EmptyWord,

    /// A time value is below zero
    #[error("time cannot be negative: {value}")]
    NegativeTime {
        /// Offending value in seconds
        value: f64,
    },

    /// A time value is NaN or infinite
    #[error("time must be a finite number")]
    NonFiniteTime,

    /// End time does not come after start time
    #[error("end time {end} must be greater than start time {start}")]
    InvalidTimeRange {
        /// Start in seconds
        start: f64,
        /// End in seconds
        end: f64,
    },
}

/// Errors returned by parsers, exporters and the parser factory
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// A time string does not match `H:MM:SS.CC`
    #[error("Invalid ASS time format: '{value}'")]
    InvalidTimestamp {
        /// The string that failed to parse
        value: String,
    },

    /// The JSON document is not syntactically valid
    #[error("Invalid JSON in {path} at line {line}, column {column}: {source}")]
    JsonSyntax {
        path: PathBuf,
        line: usize,
        column: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The document structure is not what the format requires
    #[error("Format error in {path}: {reason}")]
    Format {
        path: PathBuf,
        reason: String,
    },

    /// No parser handles this file extension
    #[error("No parser available for file extension '{extension}' ({path})")]
    UnsupportedExtension {
        path: PathBuf,
        extension: String,
    },

    /// Encoding the output document failed
    #[error("Failed to serialize {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A decoded value violates a model invariant
    #[error("Validation failed for {context}: {source}")]
    Validation {
        /// Where the value came from (segment index, line number, word index)
        context: String,
        #[source]
        source: ValidationError,
    },

    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SubtitleError {
    /// Classify the error into the Format / Validation / Io taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTimestamp { .. }
            | Self::JsonSyntax { .. }
            | Self::Format { .. }
            | Self::UnsupportedExtension { .. }
            | Self::Serialization { .. } => ErrorKind::Format,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Wrap a validation error with a location description
    pub fn validation(context: impl Into<String>, source: ValidationError) -> Self {
        Self::Validation {
            context: context.into(),
            source,
        }
    }

    /// Build a structural format error for `path`
    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build an I/O error for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, SubtitleError>;
