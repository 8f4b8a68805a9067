// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use subcraft::app_config::{self, Config};
use subcraft::app_controller::{ConversionOutcome, Controller};
use subcraft::FormatTag;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Output formats selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Json,
    Ass,
}

impl From<CliFormat> for FormatTag {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Json => FormatTag::Json,
            CliFormat::Ass => FormatTag::Ass,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert one subtitle file; the output format follows the output extension
    Convert {
        /// Input subtitle file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output subtitle file (.json, .ass or .ssa)
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Force overwrite of an existing output file
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Convert every supported subtitle file below a directory
    ConvertDir {
        /// Directory to walk
        #[arg(value_name = "DIR")]
        input_dir: PathBuf,

        /// Target format
        #[arg(short, long, value_enum)]
        to: CliFormat,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Print statistics and parse warnings for a subtitle file
    Inspect {
        /// Input subtitle file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the format sniffed from a file's content
    Detect {
        /// Input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Generate shell completions for subcraft
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subcraft - convert and inspect timed subtitle documents
///
/// Reads and writes JSON segment files and ASS/SSA scripts, keeping
/// per-word karaoke timing across formats.
#[derive(Parser, Debug)]
#[command(name = "subcraft")]
#[command(version)]
#[command(about = "Subtitle conversion and inspection tool")]
#[command(long_about = "subcraft converts subtitle documents between JSON segments and ASS/SSA karaoke scripts.

EXAMPLES:
    subcraft convert talk.json talk.ass          # JSON segments to ASS karaoke
    subcraft convert -f song.ass song.json       # Overwrite an existing output
    subcraft convert-dir --to ass ./episodes     # Convert a whole directory
    subcraft inspect --json song.ass             # Statistics and warnings as JSON
    subcraft detect mystery.txt                  # Sniff the format from content
    subcraft completions bash > subcraft.bash    # Generate bash completions

CONFIGURATION:
    Settings are read from subcraft.json by default. You can specify a different
    file with --config. A missing file means built-in defaults.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", global = true, default_value = "subcraft.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and marker for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let (colour, marker) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", colour, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "subcraft", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    run_command(&controller, cli.command)
}

// @loads: Configuration file with the command line log level applied on top
fn load_config(path: &Path, log_level: Option<CliLogLevel>) -> Result<Config> {
    if !path.exists() {
        debug!("Config file not found at '{}', using defaults", path.display());
    }

    let mut config = Config::load_or_default(path)?;
    if let Some(level) = log_level {
        config.log_level = level.into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn run_command(controller: &Controller, command: Commands) -> Result<()> {
    match command {
        Commands::Convert {
            input,
            output,
            force_overwrite,
        } => match controller.convert(&input, &output, force_overwrite)? {
            ConversionOutcome::Converted(summary) => {
                println!(
                    "{} -> {}: {} lines, {} words, {} dropped, {} warnings",
                    summary.input.display(),
                    summary.output.display(),
                    summary.lines,
                    summary.words,
                    summary.dropped_lines,
                    summary.warnings
                );
                Ok(())
            }
            ConversionOutcome::Skipped(path) => {
                println!("Skipped {} (already exists)", path.display());
                Ok(())
            }
        },
        Commands::ConvertDir {
            input_dir,
            to,
            force_overwrite,
        } => {
            let summary = controller.convert_dir(&input_dir, to.into(), force_overwrite)?;
            println!(
                "{} converted, {} skipped, {} failed",
                summary.converted, summary.skipped, summary.failed
            );
            if summary.failed > 0 {
                return Err(anyhow!("{} file(s) failed to convert", summary.failed));
            }
            Ok(())
        }
        Commands::Inspect { input, json } => {
            let report = controller.inspect(&input)?;
            if json {
                let encoded = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize inspection report")?;
                println!("{}", encoded);
                return Ok(());
            }

            let stats = &report.statistics;
            println!("File:               {}", report.path.display());
            println!("Format:             {}", report.format);
            println!("Lines:              {}", stats.total_lines);
            println!("Words:              {}", stats.total_words);
            println!("Total duration:     {:.2}s", stats.total_duration);
            println!("Avg line duration:  {:.2}s", stats.average_line_duration);
            println!("Avg words per line: {:.2}", stats.average_words_per_line);
            println!("Overlapping lines:  {}", stats.overlapping_lines);
            if report.warnings.is_empty() {
                println!("Warnings:           none");
            } else {
                println!("Warnings:           {}", report.warnings.len());
                for warning in &report.warnings {
                    println!("  - {}", warning);
                }
            }
            Ok(())
        }
        Commands::Detect { input } => {
            let format = controller.detect(&input);
            if format == FormatTag::Unknown {
                warn!("Could not recognize the format of {}", input.display());
            }
            println!("{}", format);
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}
