use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration module
/// This module handles loading, validating and saving the settings that
/// tune parsing and export. Every field has a default so partial files load.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Parser and exporter settings
    #[serde(default)]
    pub parser: ParserConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Settings for every supported format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ParserConfig {
    #[serde(default)]
    pub json: JsonConfig,

    #[serde(default)]
    pub ass: AssConfig,
}

/// JSON segment format settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JsonConfig {
    /// Segment text meaning "no speech"; such segments are discarded
    #[serde(default = "default_no_text_sentinel")]
    pub no_text_sentinel: String,

    /// Add total_segments, total_words and format_version to exported metadata
    #[serde(default)]
    pub include_statistics: bool,

    /// Indent exported JSON
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            no_text_sentinel: default_no_text_sentinel(),
            include_statistics: false,
            pretty: true,
        }
    }
}

/// ASS export settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AssConfig {
    /// Title written to [Script Info]
    #[serde(default = "default_title")]
    pub title: String,

    /// Horizontal script resolution
    #[serde(default = "default_play_res_x")]
    pub play_res_x: u32,

    /// Vertical script resolution
    #[serde(default = "default_play_res_y")]
    pub play_res_y: u32,

    /// Font used when the global style names none
    #[serde(default = "default_font")]
    pub default_font: String,

    /// Font size used when the global style names none
    #[serde(default = "default_font_size")]
    pub default_font_size: u32,
}

impl Default for AssConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            play_res_x: default_play_res_x(),
            play_res_y: default_play_res_y(),
            default_font: default_font(),
            default_font_size: default_font_size(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

fn default_no_text_sentinel() -> String {
    "[No text]".to_string()
}

fn default_true() -> bool {
    true
}

fn default_title() -> String {
    "Subtitle Creator Export".to_string()
}

fn default_play_res_x() -> u32 {
    1920
}

fn default_play_res_y() -> u32 {
    1080
}

fn default_font() -> String {
    "Arial".to_string()
}

fn default_font_size() -> u32 {
    20
}

impl Config {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.parser.json.no_text_sentinel.trim().is_empty() {
            return Err(anyhow!("JSON no-text sentinel cannot be empty"));
        }

        let ass = &self.parser.ass;
        if ass.play_res_x == 0 || ass.play_res_y == 0 {
            return Err(anyhow!(
                "ASS play resolution must be positive, got {}x{}",
                ass.play_res_x, ass.play_res_y
            ));
        }
        if ass.default_font_size == 0 {
            return Err(anyhow!("ASS default font size must be positive"));
        }
        if ass.default_font.trim().is_empty() {
            return Err(anyhow!("ASS default font cannot be empty"));
        }

        Ok(())
    }
}
