/*!
 * Translation stage with best-effort source language detection.
 *
 * Detection is a convenience, never a requirement: a missing detector, a
 * failing probe or call, an unusable code, or an empty guess list all fall
 * back to the configured default source language with a logged warning. The
 * translator itself is then invoked with explicit source and target codes.
 */

use async_trait::async_trait;
use log::{debug, warn};

use crate::capabilities::CapabilityKind;
use crate::errors::StageError;
use crate::language_utils;
use crate::pipeline::stage::{
    classify_provider_error, PipelineStage, StageContext, StageKind, StageResult,
};
use crate::sanitize::ReplyCleaner;

/// Translation stage
#[derive(Debug, Default)]
pub struct TranslateStage;

impl TranslateStage {
    /// Create a new translation stage
    pub fn new() -> Self {
        Self
    }

    /// Detect the source language of the text, falling back to the
    /// configured default on any problem
    async fn detect_source_language(ctx: &StageContext<'_>, text: &str) -> String {
        let fallback = ctx.options.default_source_language.as_str();

        let Some(detector) = ctx.registry.detector() else {
            debug!("No language detector registered, assuming '{}'", fallback);
            return fallback.to_string();
        };

        ctx.report_status("Detecting source language...");

        let outcome = ctx.registry.probe(CapabilityKind::Detector).await;
        if outcome.as_stage_error(CapabilityKind::Detector).is_some() {
            warn!(
                "Language detector is not usable ({}), assuming '{}'",
                outcome, fallback
            );
            return fallback.to_string();
        }

        match detector.detect(text).await {
            Ok(guesses) => match guesses.first() {
                Some(guess) => match language_utils::normalize_for_capability(&guess.language) {
                    Ok(code) => {
                        debug!(
                            "Detected source language '{}' (confidence {:.2})",
                            code, guess.confidence
                        );
                        code
                    }
                    Err(_) => {
                        warn!(
                            "Detector returned unusable language code '{}', assuming '{}'",
                            guess.language, fallback
                        );
                        fallback.to_string()
                    }
                },
                None => {
                    warn!("Language detection returned no guesses, assuming '{}'", fallback);
                    fallback.to_string()
                }
            },
            Err(error) => {
                warn!("Language detection failed ({}), assuming '{}'", error, fallback);
                fallback.to_string()
            }
        }
    }
}

#[async_trait]
impl PipelineStage for TranslateStage {
    fn kind(&self) -> StageKind {
        StageKind::Translate
    }

    async fn run(&self, ctx: &StageContext<'_>) -> StageResult {
        let text = ctx.previous_payload();
        if ReplyCleaner::is_blank(text) {
            return StageResult::Failed(StageError::EmptyResult(CapabilityKind::Translator));
        }

        ctx.report_status("Checking translation availability...");
        let outcome = ctx.registry.probe(CapabilityKind::Translator).await;
        if let Some(error) = outcome.as_stage_error(CapabilityKind::Translator) {
            return StageResult::Failed(error);
        }

        let Some(translator) = ctx.registry.translator() else {
            return StageResult::Failed(StageError::CapabilityMissing(
                CapabilityKind::Translator,
            ));
        };

        let source_language = Self::detect_source_language(ctx, text).await;
        let target_language = ctx.input.target_language.as_str();

        if language_utils::language_codes_match(&source_language, target_language) {
            debug!(
                "Source language matches target '{}', translating anyway",
                target_language
            );
        }

        ctx.report_status(&format!(
            "Translating from '{}' to '{}'...",
            source_language, target_language
        ));

        let raw = match translator.translate(text, &source_language, target_language).await {
            Ok(raw) => raw,
            Err(error) => return StageResult::Failed(classify_provider_error(error)),
        };

        let translated = ReplyCleaner::clean(&raw);
        if ReplyCleaner::is_blank(&translated) {
            return StageResult::Failed(StageError::EmptyResult(CapabilityKind::Translator));
        }

        StageResult::Success(translated)
    }
}
