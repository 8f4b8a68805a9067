use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::model::DocumentStatistics;
use crate::parsers::{
    create_parser_with_config, detect_format, parser_for_format, FormatTag, ParseReport, ParseWarning,
    SubtitleParser,
};

// @module: Application controller for subtitle conversion and inspection

/// Extensions picked up when converting a whole directory
const SUPPORTED_EXTENSIONS: [&str; 3] = [".json", ".ass", ".ssa"];

/// Result of converting one file
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    /// The output was written
    Converted(ConversionSummary),
    /// The output already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// What a successful conversion read and wrote
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub source_format: FormatTag,
    pub target_format: FormatTag,
    pub lines: usize,
    pub words: usize,
    pub dropped_lines: usize,
    pub warnings: usize,
}

/// Totals for a directory conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Statistics and warnings for one file
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub path: PathBuf,
    pub format: FormatTag,
    pub statistics: DocumentStatistics,
    pub warnings: Vec<ParseWarning>,
}

/// Main application controller for subtitle conversion
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parser for an input file: by extension first, then by sniffing its content
    pub fn parser_for_input(&self, input: &Path) -> Result<Box<dyn SubtitleParser>> {
        match create_parser_with_config(input, &self.config.parser) {
            Ok(parser) => Ok(parser),
            Err(SubtitleError::UnsupportedExtension { extension, .. }) => {
                let sniffed = detect_format(input);
                debug!(
                    "No parser for extension '{}' of {}, content looks like {}",
                    extension,
                    input.display(),
                    sniffed
                );
                parser_for_format(sniffed, &self.config.parser)
                    .ok_or_else(|| anyhow!("Unrecognized subtitle format: {}", input.display()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse an input file and log every warning
    pub fn load(&self, input: &Path) -> Result<ParseReport> {
        if !FileManager::file_exists(input) {
            return Err(anyhow!("Input file does not exist: {}", input.display()));
        }

        let parser = self.parser_for_input(input)?;
        let report = parser
            .parse_with_report(input)
            .with_context(|| format!("Failed to parse {}", input.display()))?;

        for warning in &report.warnings {
            warn!("{}: {}", input.display(), warning);
        }
        if report.dropped_lines() > 0 {
            warn!(
                "Dropped {} line(s) from {}",
                report.dropped_lines(),
                input.display()
            );
        }

        Ok(report)
    }

    /// Convert one file; the output format follows the output extension
    pub fn convert(&self, input: &Path, output: &Path, force_overwrite: bool) -> Result<ConversionOutcome> {
        if output.exists() && !force_overwrite {
            warn!(
                "Skipping {}, output already exists (use -f to force overwrite)",
                output.display()
            );
            return Ok(ConversionOutcome::Skipped(output.to_path_buf()));
        }

        let exporter = create_parser_with_config(output, &self.config.parser)
            .with_context(|| format!("Cannot choose an output format for {}", output.display()))?;
        let parser = self.parser_for_input(input)?;
        let source_format = parser.format();

        let report = self.load(input)?;
        let statistics = report.data.statistics();

        exporter
            .export(&report.data, output)
            .with_context(|| format!("Failed to write {}", output.display()))?;

        info!(
            "Converted {} ({}) -> {} ({}): {} lines, {} words",
            input.display(),
            source_format,
            output.display(),
            exporter.format(),
            statistics.total_lines,
            statistics.total_words
        );

        Ok(ConversionOutcome::Converted(ConversionSummary {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            source_format,
            target_format: exporter.format(),
            lines: statistics.total_lines,
            words: statistics.total_words,
            dropped_lines: report.dropped_lines(),
            warnings: report.warnings.len(),
        }))
    }

    /// Convert every supported file below a directory, writing next to each input
    pub fn convert_dir(&self, input_dir: &Path, target: FormatTag, force_overwrite: bool) -> Result<BatchSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {}", input_dir.display()));
        }
        let extension = target
            .extension()
            .ok_or_else(|| anyhow!("Cannot convert to format '{}'", target))?;

        let files = FileManager::find_files(input_dir, &SUPPORTED_EXTENSIONS)?;
        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {}", input_dir.display()));
        }

        let mut summary = BatchSummary::default();
        for input in &files {
            let output = FileManager::with_extension(input, extension);
            if &output == input {
                debug!("Skipping {}, already in {} format", input.display(), target);
                summary.skipped += 1;
                continue;
            }

            match self.convert(input, &output, force_overwrite) {
                Ok(ConversionOutcome::Converted(_)) => summary.converted += 1,
                Ok(ConversionOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error converting {}: {:#}", input.display(), e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Directory conversion completed in {}: {} converted, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.converted,
            summary.skipped,
            summary.failed
        );

        Ok(summary)
    }

    /// Parse a file and collect its statistics and warnings
    pub fn inspect(&self, input: &Path) -> Result<InspectionReport> {
        let format = self.parser_for_input(input)?.format();
        let report = self.load(input)?;

        Ok(InspectionReport {
            path: input.to_path_buf(),
            format,
            statistics: report.data.statistics(),
            warnings: report.warnings,
        })
    }

    /// Sniff a file's format from its content
    pub fn detect(&self, input: &Path) -> FormatTag {
        detect_format(input)
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
