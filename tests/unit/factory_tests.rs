/*!
 * Tests for the parser factory and content sniffing
 */

use anyhow::Result;
use std::path::Path;

use subcraft::errors::{ErrorKind, SubtitleError};
use subcraft::parsers::{detect_format_from_str, parser_for_format};
use subcraft::app_config::ParserConfig;
use subcraft::{create_parser, detect_format, FormatTag};

use crate::common;

#[test]
fn test_createParser_withKnownExtensions_shouldPickFormat() -> Result<()> {
    assert_eq!(create_parser(Path::new("a.json"))?.format(), FormatTag::Json);
    assert_eq!(create_parser(Path::new("a.ass"))?.format(), FormatTag::Ass);
    assert_eq!(create_parser(Path::new("a.ssa"))?.format(), FormatTag::Ass);
    Ok(())
}

#[test]
fn test_createParser_withUppercaseExtension_shouldBeCaseInsensitive() -> Result<()> {
    assert_eq!(create_parser(Path::new("SONG.ASS"))?.format(), FormatTag::Ass);
    assert_eq!(create_parser(Path::new("Talk.Json"))?.format(), FormatTag::Json);
    Ok(())
}

#[test]
fn test_createParser_withUnknownExtension_shouldNameIt() {
    let err = create_parser(Path::new("movie.srt")).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(
        &err,
        SubtitleError::UnsupportedExtension { extension, .. } if extension == ".srt"
    ));
    assert!(err.to_string().contains(".srt"));
}

#[test]
fn test_createParser_withNoExtension_shouldFail() {
    assert!(create_parser(Path::new("README")).is_err());
}

#[test]
fn test_supportedExtensions_shouldListDottedLowercase() -> Result<()> {
    assert_eq!(create_parser(Path::new("a.json"))?.supported_extensions(), &[".json"]);
    assert_eq!(create_parser(Path::new("a.ass"))?.supported_extensions(), &[".ass", ".ssa"]);
    Ok(())
}

#[test]
fn test_parserForFormat_withUnknown_shouldReturnNone() {
    assert!(parser_for_format(FormatTag::Unknown, &ParserConfig::default()).is_none());
}

#[test]
fn test_detectFormat_withMisnamedFiles_shouldSniffContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let ass = common::create_sample_ass(temp_dir.path(), "song.txt")?;
    let json = common::create_sample_json(temp_dir.path(), "talk.dat")?;

    assert_eq!(detect_format(&ass), FormatTag::Ass);
    assert_eq!(detect_format(&json), FormatTag::Json);
    Ok(())
}

#[test]
fn test_detectFormat_withMissingFile_shouldReturnUnknown() {
    assert_eq!(detect_format(Path::new("/definitely/not/here.ass")), FormatTag::Unknown);
}

#[test]
fn test_detectFormatFromStr_withPlainText_shouldReturnUnknown() {
    assert_eq!(detect_format_from_str("1\n00:00:01,000 --> 00:00:02,000\nHello\n"), FormatTag::Unknown);
    assert_eq!(detect_format_from_str(""), FormatTag::Unknown);
}

#[test]
fn test_detectFormatFromStr_withByteOrderMark_shouldStillDetect() {
    assert_eq!(detect_format_from_str("\u{feff}[Script Info]\nTitle: x"), FormatTag::Ass);
    assert_eq!(detect_format_from_str("\u{feff}{\"word_segments\": []}"), FormatTag::Json);
}
