/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::path::Path;

use subcraft::errors::ErrorKind;
use subcraft::file_utils::FileManager;

use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "exists.ass", "content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));
    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

#[test]
fn test_extension_of_shouldLowercaseWithoutDot() {
    assert_eq!(FileManager::extension_of("Song.ASS").as_deref(), Some("ass"));
    assert_eq!(FileManager::extension_of("noext"), None);
}

#[test]
fn test_with_extension_shouldReplaceExtension() {
    assert_eq!(
        FileManager::with_extension(Path::new("/tmp/talk.json"), "ass"),
        Path::new("/tmp/talk.ass")
    );
}

#[test]
fn test_read_to_string_withByteOrderMark_shouldStripIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "bom.ass", "\u{feff}[Script Info]")?;

    assert_eq!(FileManager::read_to_string(&path)?, "[Script Info]");
    Ok(())
}

#[test]
fn test_read_to_string_withMissingFile_shouldReturnIoError() {
    let err = FileManager::read_to_string("missing_file_12345.json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("missing_file_12345.json"));
}

#[test]
fn test_write_to_file_shouldCreateParentDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("deeper").join("out.json");

    FileManager::write_to_file(&path, "{}")?;
    assert_eq!(fs::read_to_string(&path)?, "{}");
    Ok(())
}

#[test]
fn test_find_files_shouldMatchExtensionsRecursivelyAndSort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("season1");
    fs::create_dir_all(&nested)?;
    common::create_test_file(temp_dir.path(), "b.ass", "")?;
    common::create_test_file(temp_dir.path(), "a.JSON", "")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "")?;
    common::create_test_file(&nested, "c.ssa", "")?;

    let files = FileManager::find_files(temp_dir.path(), &[".json", ".ass", ".ssa"])?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(names, vec!["a.JSON", "b.ass", "season1/c.ssa"]);
    Ok(())
}
