/*!
 * Extraction stage: read text out of the source artifact.
 *
 * Image artifacts go to the registered multimodal extractor; literal text
 * artifacts pass through without an external call. Either way an empty
 * result is fatal, because nothing downstream can work without text.
 */

use async_trait::async_trait;
use log::debug;

use crate::capabilities::{CapabilityKind, ExtractionRequest};
use crate::errors::StageError;
use crate::pipeline::input::SourceArtifact;
use crate::pipeline::stage::{
    classify_provider_error, PipelineStage, StageContext, StageKind, StageResult,
};
use crate::prompts;
use crate::sanitize::ReplyCleaner;

/// Extraction stage
#[derive(Debug, Default)]
pub struct ExtractStage;

impl ExtractStage {
    /// Create a new extraction stage
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PipelineStage for ExtractStage {
    fn kind(&self) -> StageKind {
        StageKind::Extract
    }

    async fn run(&self, ctx: &StageContext<'_>) -> StageResult {
        let image = match &ctx.input.artifact {
            SourceArtifact::Text(text) => {
                // Literal text skips the external call but not the emptiness check
                ctx.report_status("Using provided text...");

                let text = text.trim();
                if ReplyCleaner::is_blank(text) {
                    return StageResult::Failed(StageError::EmptyResult(
                        CapabilityKind::Extractor,
                    ));
                }

                return StageResult::Success(text.to_string());
            }
            SourceArtifact::Image(image) => image,
        };

        ctx.report_status("Checking text extraction availability...");
        let outcome = ctx.registry.probe(CapabilityKind::Extractor).await;
        if let Some(error) = outcome.as_stage_error(CapabilityKind::Extractor) {
            return StageResult::Failed(error);
        }

        let Some(extractor) = ctx.registry.extractor() else {
            return StageResult::Failed(StageError::CapabilityMissing(CapabilityKind::Extractor));
        };

        ctx.report_status("Creating extraction session...");
        let request = ExtractionRequest {
            instruction: prompts::extraction_prompt(&ctx.input.target_language),
            output_language: ctx.input.target_language.clone(),
        };

        ctx.report_status("Extracting text from image...");
        let raw = match extractor.extract(image, &request).await {
            Ok(raw) => raw,
            Err(error) => return StageResult::Failed(classify_provider_error(error)),
        };

        let text = ReplyCleaner::clean(&raw);
        if ReplyCleaner::is_blank(&text) {
            return StageResult::Failed(StageError::EmptyResult(CapabilityKind::Extractor));
        }

        debug!(
            "Extracted {} characters from {}",
            text.chars().count(),
            ctx.input.artifact.describe()
        );

        StageResult::Success(text)
    }
}
