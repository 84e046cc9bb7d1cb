/*!
 * Tests for file system utilities
 */

use anyhow::Result;

use lenslate::file_utils::FileManager;
use lenslate::pipeline::ImageFormat;

use crate::common;

/// Test report path construction next to the input file
#[test]
fn test_reportPath_withImageFile_shouldInsertLanguageCode() {
    let path = FileManager::report_path("photos/menu.jpg", "es");
    assert_eq!(path.to_string_lossy(), "photos/menu.es.lenslate.txt");

    let path = FileManager::report_path("menu.jpg", "fr");
    assert_eq!(path.file_name().map(|f| f.to_string_lossy().to_string()),
        Some("menu.fr.lenslate.txt".to_string()));
}

/// Test report path for files with dots in the stem
#[test]
fn test_reportPath_withDottedFilename_shouldKeepStem() {
    let path = FileManager::report_path("trip.day2.png", "de");
    assert_eq!(path.file_name().map(|f| f.to_string_lossy().to_string()),
        Some("trip.day2.de.lenslate.txt".to_string()));
}

/// Test existence helpers
#[test]
fn test_fileExists_withRealAndMissingPaths_shouldReportCorrectly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file_path = common::create_test_file(temp_dir.path(), "exists.txt", "content")?;

    assert!(FileManager::file_exists(&file_path));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.txt")));

    assert!(FileManager::dir_exists(temp_dir.path()));
    assert!(!FileManager::dir_exists(&file_path));

    Ok(())
}

/// Test directory creation
#[test]
fn test_ensureDir_withNestedPath_shouldCreateAll() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b").join("c");

    FileManager::ensure_dir(&nested)?;
    assert!(FileManager::dir_exists(&nested));

    // Calling again on an existing directory is fine
    FileManager::ensure_dir(&nested)?;

    Ok(())
}

/// Test recursive image discovery with stable ordering
#[test]
fn test_findImageFiles_withMixedContent_shouldReturnSortedImages() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();

    common::create_test_image(root, "b.png")?;
    common::create_test_image(root, "a.jpg")?;
    common::create_test_file(root, "notes.txt", "not an image")?;

    let nested = root.join("nested");
    FileManager::ensure_dir(&nested)?;
    common::create_test_image(&nested, "c.webp")?;

    let found = FileManager::find_image_files(root)?;

    assert_eq!(found.len(), 3);
    let names: Vec<String> = found
        .iter()
        .filter_map(|p| p.file_name().map(|f| f.to_string_lossy().to_string()))
        .collect();
    assert!(names.contains(&"a.jpg".to_string()));
    assert!(names.contains(&"b.png".to_string()));
    assert!(names.contains(&"c.webp".to_string()));

    // Sorted output
    let mut sorted = found.clone();
    sorted.sort();
    assert_eq!(found, sorted);

    Ok(())
}

/// Test image discovery ignores unsupported extensions
#[test]
fn test_findImageFiles_withNoImages_shouldReturnEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "readme.md", "text")?;

    let found = FileManager::find_image_files(temp_dir.path())?;
    assert!(found.is_empty());

    Ok(())
}

/// Test atomic writes land complete content at the target path
#[test]
fn test_writeAtomic_withContent_shouldPersistFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("report.txt");

    FileManager::write_atomic(&target, "line one\nline two\n")?;

    let read_back = FileManager::read_to_string(&target)?;
    assert_eq!(read_back, "line one\nline two\n");

    // Overwriting replaces the previous content
    FileManager::write_atomic(&target, "replaced")?;
    assert_eq!(FileManager::read_to_string(&target)?, "replaced");

    Ok(())
}

/// Test loading an image sniffs the container format
#[test]
fn test_loadImage_withPngFile_shouldSniffFormat() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let image_path = common::create_test_image(temp_dir.path(), "sign.png")?;

    let image = FileManager::load_image(&image_path)?;

    assert_eq!(image.format, ImageFormat::Png);
    assert_eq!(image.source_path.as_deref(), Some(image_path.as_path()));
    assert!(!image.is_empty());

    Ok(())
}

/// Test loading a non-image file fails
#[test]
fn test_loadImage_withTextFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let text_path = common::create_test_file(temp_dir.path(), "letter.txt", "Dear sir")?;

    assert!(FileManager::load_image(&text_path).is_err());

    Ok(())
}

/// Test loading a missing file fails
#[test]
fn test_loadImage_withMissingFile_shouldFail() {
    assert!(FileManager::load_image("definitely/not/here.png").is_err());
}
