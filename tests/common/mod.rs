/*!
 * Common test utilities for the subcraft test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Sample ASS script: a style table, two karaoke lines and one plain line out of order
pub const SAMPLE_ASS: &str = r"[Script Info]
Title: Sample Karaoke
ScriptType: v4.00+
PlayResX: 1280
PlayResY: 720

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Verdana,32,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,-1,0,0,0,100,100,0,0,1,2,0,2,10,10,20,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:05.00,0:00:07.00,Default,,0,0,0,,Plain closing line
Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,{\k50}Hi {\k100}there
Dialogue: 0,0:00:03.00,0:00:04.50,Default,,0,0,0,,{\k40}Sing {\k60}along {\k30}now
";

/// Sample JSON segment document with metadata, words and a sentinel segment
pub const SAMPLE_JSON: &str = r#"{
  "metadata": {"source": "whisper", "language": "en", "model": {"name": "large-v3", "beam": 5}},
  "segments": [
    {"start_time": 4.0, "end_time": 6.0, "text": "Second line", "segment_id": 1},
    {"start_time": 1.0, "end_time": 3.0, "text": "First line here", "segment_id": 0},
    {"start_time": 7.0, "end_time": 8.0, "text": "[No text]", "segment_id": 2}
  ],
  "word_segments": [
    {"word": "First", "start_time": 1.0, "end_time": 1.5, "segment_id": 0},
    {"word": "line", "start_time": 1.5, "end_time": 2.0, "segment_id": 0},
    {"word": "here", "start_time": 2.0, "end_time": 3.0, "segment_id": 0}
  ]
}"#;

/// Initialize env_logger for tests, ignoring repeated initialization
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates the sample ASS script in the specified directory
pub fn create_sample_ass(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_ASS)
}

/// Creates the sample JSON document in the specified directory
pub fn create_sample_json(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_JSON)
}

/// Builds an ASS script with an events section holding the given raw lines
pub fn ass_with_events(events: &[&str]) -> String {
    let mut script = String::from(
        "[Script Info]\nTitle: Test\n\n[Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
    );
    for event in events {
        script.push_str(event);
        script.push('\n');
    }
    script
}

/// Float comparison within a tolerance
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
