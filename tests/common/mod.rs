/*!
 * Common test utilities for the lenslate test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use tempfile::TempDir;

use lenslate::capabilities::CapabilityRegistry;
use lenslate::pipeline::runner::RunnerOptions;
use lenslate::pipeline::{ImageArtifact, ImageFormat, PipelineInput, PipelineRunner};
use lenslate::providers::mock::{
    MockDetector, MockExtractor, MockRewriter, MockSummarizer, MockTranslator,
};

/// Minimal PNG payload, magic header plus a few filler bytes
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
];

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

/// Creates a small PNG file for testing
pub fn create_test_image(dir: &Path, filename: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, PNG_BYTES)?;
    Ok(file_path)
}

/// Builds an in-memory image artifact for pipeline tests
pub fn sample_image() -> ImageArtifact {
    ImageArtifact::new(Bytes::from_static(PNG_BYTES), ImageFormat::Png, None)
}

/// Builds a pipeline input around the sample image
pub fn sample_input(target_language: &str) -> PipelineInput {
    PipelineInput::from_image(sample_image(), target_language)
}

/// Registry with every capability backed by a working mock
pub fn working_registry() -> CapabilityRegistry {
    CapabilityRegistry::new()
        .with_extractor(Arc::new(MockExtractor::working()))
        .with_detector(Arc::new(MockDetector::working()))
        .with_translator(Arc::new(MockTranslator::working()))
        .with_summarizer(Arc::new(MockSummarizer::working()))
        .with_rewriter(Arc::new(MockRewriter::working()))
}

/// Runner over a fully working mock registry with default options
pub fn working_runner() -> PipelineRunner {
    PipelineRunner::new(working_registry(), RunnerOptions::default())
}
