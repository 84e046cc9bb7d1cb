/*!
 * Summarization stage.
 *
 * Summarization is optional in the standard plan: a summarizer that is not
 * registered or reports itself unusable turns into a skip, and the run
 * continues without a summary. An actual invocation error still fails the
 * stage.
 */

use async_trait::async_trait;
use log::info;

use crate::capabilities::{CapabilityKind, ProbeOutcome};
use crate::errors::StageError;
use crate::pipeline::stage::{
    classify_provider_error, PipelineStage, StageContext, StageKind, StageResult,
};
use crate::sanitize::ReplyCleaner;

/// Summarization stage
#[derive(Debug, Default)]
pub struct SummarizeStage;

impl SummarizeStage {
    /// Create a new summarization stage
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PipelineStage for SummarizeStage {
    fn kind(&self) -> StageKind {
        StageKind::Summarize
    }

    async fn run(&self, ctx: &StageContext<'_>) -> StageResult {
        let text = ctx.previous_payload();
        if ReplyCleaner::is_blank(text) {
            if ctx.required {
                return StageResult::Failed(StageError::EmptyResult(
                    CapabilityKind::Summarizer,
                ));
            }
            return StageResult::Skipped("nothing to summarize".to_string());
        }

        ctx.report_status("Checking summarizer availability...");
        match ctx.registry.probe(CapabilityKind::Summarizer).await {
            ProbeOutcome::NotRegistered => {
                if ctx.required {
                    return StageResult::Failed(StageError::CapabilityMissing(
                        CapabilityKind::Summarizer,
                    ));
                }
                info!("Summarizer not registered, continuing without a summary");
                return StageResult::Skipped("summarizer not available".to_string());
            }
            ProbeOutcome::Unavailable(reason) => {
                if ctx.required {
                    return StageResult::Failed(StageError::CapabilityUnavailable {
                        capability: CapabilityKind::Summarizer,
                        reason,
                    });
                }
                info!("Summarizer unavailable ({}), continuing without a summary", reason);
                return StageResult::Skipped(format!("summarizer unavailable: {}", reason));
            }
            ProbeOutcome::Available | ProbeOutcome::Downloadable => {}
        }

        let Some(summarizer) = ctx.registry.summarizer() else {
            return StageResult::Failed(StageError::CapabilityMissing(
                CapabilityKind::Summarizer,
            ));
        };

        ctx.report_status("Creating summarization session...");
        let options = &ctx.options.summary;

        ctx.report_status("Summarizing translated text...");
        let raw = match summarizer.summarize(text, options).await {
            Ok(raw) => raw,
            Err(error) => return StageResult::Failed(classify_provider_error(error)),
        };

        let summary = ReplyCleaner::clean(&raw);
        if ReplyCleaner::is_blank(&summary) {
            // An empty summary is nothing to show, not a failure
            if ctx.required {
                return StageResult::Failed(StageError::EmptyResult(
                    CapabilityKind::Summarizer,
                ));
            }
            return StageResult::Skipped("summarizer produced no output".to_string());
        }

        StageResult::Success(summary)
    }
}
