use anyhow::{Result, Context};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use bytes::Bytes;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::pipeline::input::{ImageArtifact, ImageFormat};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Report path next to the analyzed image
    // @params: input_file, target_language
    pub fn report_path<P: AsRef<Path>>(input_file: P, target_language: &str) -> PathBuf {
        let input_file = input_file.as_ref();

        // Get the file stem (filename without extension)
        let stem = input_file.file_stem().unwrap_or_default();

        // Create the report filename with language code and report extension
        let mut report_filename = stem.to_string_lossy().to_string();
        report_filename.push('.');
        report_filename.push_str(target_language);
        report_filename.push_str(".lenslate.txt");

        // Place it next to the input file
        match input_file.parent() {
            Some(parent) => parent.join(report_filename),
            None => PathBuf::from(report_filename),
        }
    }

    /// Find image files in a directory, recursively
    pub fn find_image_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::has_image_extension(path) {
                result.push(path.to_path_buf());
            }
        }

        // Stable processing order regardless of filesystem iteration order
        result.sort();

        Ok(result)
    }

    /// Check for an extension the extraction models accept
    fn has_image_extension(path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy().to_lowercase();
                ["png", "jpg", "jpeg", "webp", "gif"].contains(&ext.as_str())
            }
            None => false,
        }
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Write a string to a file atomically via a sibling temporary file
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&dir)?;

        // The temporary file must live on the same filesystem for the rename
        let mut temp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write report content for {:?}", path))?;
        temp.persist(path)
            .map_err(|e| anyhow::anyhow!("Failed to persist report to {:?}: {}", path, e))?;

        Ok(())
    }

    /// Load an image file into an artifact, sniffing its format
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageArtifact> {
        let path = path.as_ref();

        if !Self::file_exists(path) {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        let data = fs::read(path)
            .with_context(|| format!("Failed to read image file: {:?}", path))?;

        let format = ImageFormat::sniff(&data)
            .ok_or_else(|| anyhow::anyhow!("Unrecognized image format: {:?}", path))?;

        Ok(ImageArtifact::new(
            Bytes::from(data),
            format,
            Some(path.to_path_buf()),
        ))
    }
}
