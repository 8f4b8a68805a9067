/*!
 * Integration tests for the convert / inspect / detect workflows
 */

use anyhow::Result;
use std::fs;

use subcraft::app_config::Config;
use subcraft::app_controller::{ConversionOutcome, Controller};
use subcraft::parsers::WarningKind;
use subcraft::FormatTag;

use crate::common::{self, ass_with_events};

#[test]
fn test_controller_withInvalidConfig_shouldRefuseToStart() {
    let mut config = Config::default();
    config.parser.ass.default_font_size = 0;
    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_convert_jsonToAss_shouldWriteOutputAndSummarize() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_sample_json(temp_dir.path(), "talk.json")?;
    let output = temp_dir.path().join("talk.ass");

    let controller = Controller::new_for_test()?;
    let ConversionOutcome::Converted(summary) = controller.convert(&input, &output, false)? else {
        panic!("conversion should not be skipped");
    };

    assert_eq!(summary.source_format, FormatTag::Json);
    assert_eq!(summary.target_format, FormatTag::Ass);
    assert_eq!(summary.lines, 2);
    assert_eq!(summary.words, 3);
    assert!(fs::read_to_string(&output)?.contains("[Events]"));
    Ok(())
}

#[test]
fn test_convert_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_sample_ass(temp_dir.path(), "song.ass")?;
    let output = common::create_test_file(temp_dir.path(), "song.json", "keep me")?;
    let controller = Controller::new_for_test()?;

    assert_eq!(
        controller.convert(&input, &output, false)?,
        ConversionOutcome::Skipped(output.clone())
    );
    assert_eq!(fs::read_to_string(&output)?, "keep me");

    assert!(matches!(
        controller.convert(&input, &output, true)?,
        ConversionOutcome::Converted(_)
    ));
    assert_ne!(fs::read_to_string(&output)?, "keep me");
    Ok(())
}

#[test]
fn test_convert_withUnknownExtension_shouldFallBackToContentSniffing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_sample_ass(temp_dir.path(), "song.txt")?;
    let output = temp_dir.path().join("song.json");

    let outcome = Controller::new_for_test()?.convert(&input, &output, false)?;
    let ConversionOutcome::Converted(summary) = outcome else {
        panic!("conversion should not be skipped");
    };
    assert_eq!(summary.source_format, FormatTag::Ass);
    assert_eq!(summary.lines, 3);
    Ok(())
}

#[test]
fn test_convert_withUnsupportedOutput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_sample_ass(temp_dir.path(), "song.ass")?;
    let output = temp_dir.path().join("song.srt");

    assert!(Controller::new_for_test()?.convert(&input, &output, false).is_err());
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_convertDir_shouldConvertEverySupportedFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("disc2");
    fs::create_dir_all(&nested)?;
    common::create_sample_json(temp_dir.path(), "one.json")?;
    common::create_sample_json(&nested, "two.json")?;
    common::create_sample_ass(temp_dir.path(), "three.ass")?;
    common::create_test_file(temp_dir.path(), "broken.json", "{oops")?;

    let summary = Controller::new_for_test()?.convert_dir(temp_dir.path(), FormatTag::Ass, false)?;

    assert_eq!(summary.converted, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 1);
    assert!(temp_dir.path().join("one.ass").exists());
    assert!(nested.join("two.ass").exists());
    Ok(())
}

#[test]
fn test_convertDir_withMissingDirectory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = Controller::new_for_test()?.convert_dir(&temp_dir.path().join("nope"), FormatTag::Json, false);
    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_inspect_shouldReportStatisticsAndWarnings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = ass_with_events(&[
        r"Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,{\k50}Hi {\k100}there",
        "Dialogue: 0,0:00:xx.00,0:00:04.00,Default,,0,0,0,,broken",
    ]);
    let input = common::create_test_file(temp_dir.path(), "mixed.ass", &content)?;

    let report = Controller::new_for_test()?.inspect(&input)?;

    assert_eq!(report.format, FormatTag::Ass);
    assert_eq!(report.statistics.total_lines, 1);
    assert_eq!(report.statistics.total_words, 2);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, WarningKind::InvalidTimestamp);

    let encoded = serde_json::to_value(&report)?;
    assert_eq!(encoded["format"], "ass");
    assert_eq!(encoded["warnings"][0]["kind"], "invalid_timestamp");
    Ok(())
}

#[test]
fn test_detect_shouldIgnoreExtension() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let json = common::create_sample_json(temp_dir.path(), "actually_json.ass")?;
    assert_eq!(Controller::new_for_test()?.detect(&json), FormatTag::Json);
    Ok(())
}
