/*!
 * Rewrite stage.
 *
 * Rewrites the translated text in the configured style. Like summarization
 * it is optional in its capability-absence form: no rewriter, or a rewriter
 * that reports itself unusable, turns into a skip.
 */

use async_trait::async_trait;
use log::info;

use crate::capabilities::{CapabilityKind, ProbeOutcome};
use crate::errors::StageError;
use crate::pipeline::stage::{
    classify_provider_error, PipelineStage, StageContext, StageKind, StageResult,
};
use crate::sanitize::ReplyCleaner;

/// Rewrite stage
#[derive(Debug, Default)]
pub struct RewriteStage;

impl RewriteStage {
    /// Create a new rewrite stage
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PipelineStage for RewriteStage {
    fn kind(&self) -> StageKind {
        StageKind::Rewrite
    }

    async fn run(&self, ctx: &StageContext<'_>) -> StageResult {
        let text = ctx.previous_payload();
        if ReplyCleaner::is_blank(text) {
            if ctx.required {
                return StageResult::Failed(StageError::EmptyResult(CapabilityKind::Rewriter));
            }
            return StageResult::Skipped("nothing to rewrite".to_string());
        }

        ctx.report_status("Checking rewriter availability...");
        match ctx.registry.probe(CapabilityKind::Rewriter).await {
            ProbeOutcome::NotRegistered => {
                if ctx.required {
                    return StageResult::Failed(StageError::CapabilityMissing(
                        CapabilityKind::Rewriter,
                    ));
                }
                info!("Rewriter not registered, continuing without a rewrite");
                return StageResult::Skipped("rewriter not available".to_string());
            }
            ProbeOutcome::Unavailable(reason) => {
                if ctx.required {
                    return StageResult::Failed(StageError::CapabilityUnavailable {
                        capability: CapabilityKind::Rewriter,
                        reason,
                    });
                }
                info!("Rewriter unavailable ({}), continuing without a rewrite", reason);
                return StageResult::Skipped(format!("rewriter unavailable: {}", reason));
            }
            ProbeOutcome::Available | ProbeOutcome::Downloadable => {}
        }

        let Some(rewriter) = ctx.registry.rewriter() else {
            return StageResult::Failed(StageError::CapabilityMissing(CapabilityKind::Rewriter));
        };

        let style = ctx.options.rewrite_style;

        ctx.report_status(&format!("Rewriting in {} style...", style));
        let raw = match rewriter.rewrite(text, style).await {
            Ok(raw) => raw,
            Err(error) => return StageResult::Failed(classify_provider_error(error)),
        };

        let rewritten = ReplyCleaner::clean(&raw);
        if ReplyCleaner::is_blank(&rewritten) {
            if ctx.required {
                return StageResult::Failed(StageError::EmptyResult(CapabilityKind::Rewriter));
            }
            return StageResult::Skipped("rewriter produced no output".to_string());
        }

        StageResult::Success(rewritten)
    }
}
