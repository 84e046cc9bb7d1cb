/*!
 * Runner for the image analysis pipeline.
 *
 * The runner executes a stage plan sequentially:
 * 1. Extract: Read text out of the source artifact
 * 2. Translate: Detect the source language and translate into the target
 * 3. Summarize: Condense the translation (optional)
 * 4. Rewrite: Restyle the translation (optional)
 *
 * Each stage consumes the payload of its successful predecessor. A failed
 * required stage ends the run; a skipped optional stage leaves the previous
 * payload in place for whatever comes next.
 */

use std::time::{Duration, Instant};

use log::info;
use tokio::sync::Mutex;

use crate::capabilities::{CapabilityRegistry, RewriteStyle, SummaryOptions};
use crate::errors::PipelineError;
use crate::language_utils::{validate_language_code, DEFAULT_SOURCE_LANGUAGE};
use crate::pipeline::extract::ExtractStage;
use crate::pipeline::input::PipelineInput;
use crate::pipeline::rewrite::RewriteStage;
use crate::pipeline::stage::{
    PipelineStage, PipelineState, StageContext, StageKind, StagePlan, StageRecord, StageResult,
};
use crate::pipeline::summarize::SummarizeStage;
use crate::pipeline::translate::TranslateStage;

/// Options shaping how the runner executes a plan.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Options for the summarize stage
    pub summary: SummaryOptions,

    /// Style for the rewrite stage
    pub rewrite_style: RewriteStyle,

    /// Source language assumed when detection is unavailable or fails
    pub default_source_language: String,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            summary: SummaryOptions::default(),
            rewrite_style: RewriteStyle::Simple,
            default_source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
        }
    }
}

impl RunnerOptions {
    /// Create options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the summary options.
    pub fn with_summary(mut self, summary: SummaryOptions) -> Self {
        self.summary = summary;
        self
    }

    /// Set the rewrite style.
    pub fn with_rewrite_style(mut self, style: RewriteStyle) -> Self {
        self.rewrite_style = style;
        self
    }

    /// Set the fallback source language.
    pub fn with_default_source_language(mut self, code: &str) -> Self {
        self.default_source_language = code.to_string();
        self
    }
}

/// Phases of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No stage has started yet
    Idle,
    /// Extract stage in progress
    Extracting,
    /// Translate stage in progress
    Translating,
    /// Summarize stage in progress
    Summarizing,
    /// Rewrite stage in progress
    Rewriting,
    /// All planned stages finished
    Done,
    /// A required stage failed
    Error,
}

impl RunPhase {
    /// The phase a stage runs under.
    pub fn for_stage(kind: StageKind) -> Self {
        match kind {
            StageKind::Extract => RunPhase::Extracting,
            StageKind::Translate => RunPhase::Translating,
            StageKind::Summarize => RunPhase::Summarizing,
            StageKind::Rewrite => RunPhase::Rewriting,
        }
    }

    /// Whether the run has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Error)
    }

    /// Get the phase as a display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::Extracting => "extracting",
            RunPhase::Translating => "translating",
            RunPhase::Summarizing => "summarizing",
            RunPhase::Rewriting => "rewriting",
            RunPhase::Done => "done",
            RunPhase::Error => "error",
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress information during a pipeline run.
#[derive(Debug, Clone)]
pub struct RunProgress {
    /// Current phase
    pub phase: RunPhase,

    /// One-based index of the current stage in the plan
    pub stage_index: usize,

    /// Total stages in the plan
    pub total_stages: usize,

    /// Current status message
    pub status: String,
}

/// Result of a complete pipeline run.
#[derive(Debug)]
pub struct RunReport {
    /// Per-stage records in execution order
    pub state: PipelineState,

    /// Terminal phase of the run
    pub phase: RunPhase,

    /// Total duration of the run
    pub duration: Duration,

    /// Error message if the run failed
    pub error: Option<String>,
}

impl RunReport {
    /// Whether the run completed its plan.
    pub fn succeeded(&self) -> bool {
        self.phase == RunPhase::Done
    }

    /// Text produced by the extract stage, if it succeeded.
    pub fn extracted_text(&self) -> Option<&str> {
        self.state.payload_for(StageKind::Extract)
    }

    /// Text produced by the translate stage, if it succeeded.
    pub fn translated_text(&self) -> Option<&str> {
        self.state.payload_for(StageKind::Translate)
    }

    /// Text produced by the summarize stage, if it succeeded.
    pub fn summary_text(&self) -> Option<&str> {
        self.state.payload_for(StageKind::Summarize)
    }

    /// Text produced by the rewrite stage, if it succeeded.
    pub fn rewritten_text(&self) -> Option<&str> {
        self.state.payload_for(StageKind::Rewrite)
    }

    /// Whether the run failed because a capability refused access.
    pub fn failed_by_restriction(&self) -> bool {
        self.state.first_failure().is_some_and(|record| match &record.result {
            StageResult::Failed(error) => error.is_restriction(),
            _ => false,
        })
    }

    /// Get a summary of the run.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        parts.push(format!("Phase: {}", self.phase));
        parts.push(format!("Duration: {:.2}s", self.duration.as_secs_f32()));

        for record in self.state.records() {
            parts.push(format!("{}: {}", record.kind, record.result.label()));
        }

        if let Some(ref error) = self.error {
            parts.push(format!("Error: {}", error));
        }

        parts.join(" | ")
    }
}

/// The main pipeline runner.
///
/// Holds the capability registry and one instance of each stage. `run` is
/// guarded so a runner executes at most one plan at a time; a second caller
/// gets `PipelineError::RunInFlight` instead of queueing.
pub struct PipelineRunner {
    registry: CapabilityRegistry,
    options: RunnerOptions,
    extract_stage: ExtractStage,
    translate_stage: TranslateStage,
    summarize_stage: SummarizeStage,
    rewrite_stage: RewriteStage,
    run_gate: Mutex<()>,
}

impl PipelineRunner {
    /// Create a new runner with the given registry and options.
    pub fn new(registry: CapabilityRegistry, options: RunnerOptions) -> Self {
        Self {
            registry,
            options,
            extract_stage: ExtractStage::new(),
            translate_stage: TranslateStage::new(),
            summarize_stage: SummarizeStage::new(),
            rewrite_stage: RewriteStage::new(),
            run_gate: Mutex::new(()),
        }
    }

    /// Create a runner with default options.
    pub fn with_registry(registry: CapabilityRegistry) -> Self {
        Self::new(registry, RunnerOptions::default())
    }

    /// Get the capability registry.
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Get the runner options.
    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    fn stage_for(&self, kind: StageKind) -> &dyn PipelineStage {
        match kind {
            StageKind::Extract => &self.extract_stage,
            StageKind::Translate => &self.translate_stage,
            StageKind::Summarize => &self.summarize_stage,
            StageKind::Rewrite => &self.rewrite_stage,
        }
    }

    fn validate_input(&self, input: &PipelineInput) -> Result<(), PipelineError> {
        if input.artifact.is_empty() {
            return Err(PipelineError::InvalidInput(
                "source artifact is empty".to_string(),
            ));
        }

        validate_language_code(&input.target_language)
            .map_err(|e| PipelineError::InvalidInput(e.to_string()))?;

        Ok(())
    }

    /// Execute a stage plan against the input.
    ///
    /// Returns `Err` only for pre-flight problems (a run already in flight,
    /// invalid input). Stage failures end the run early and are reported
    /// through the returned `RunReport`.
    pub async fn run(
        &self,
        input: &PipelineInput,
        plan: &StagePlan,
        progress_callback: Option<Box<dyn Fn(RunProgress) + Send + Sync>>,
    ) -> Result<RunReport, PipelineError> {
        let _guard = self
            .run_gate
            .try_lock()
            .map_err(|_| PipelineError::RunInFlight)?;

        self.validate_input(input)?;

        let start_time = Instant::now();
        let total_stages = plan.len();
        let callback = progress_callback.as_deref();

        info!(
            "Starting analysis of {} ({} stages)",
            input.artifact.describe(),
            total_stages
        );

        let mut state = PipelineState::new();
        let mut phase = RunPhase::Idle;
        let mut previous_payload: Option<String> = None;
        let mut error: Option<String> = None;

        for (index, descriptor) in plan.iter().enumerate() {
            let kind = descriptor.kind;
            let stage_index = index + 1;
            phase = RunPhase::for_stage(kind);

            if let Some(callback) = callback {
                callback(RunProgress {
                    phase,
                    stage_index,
                    total_stages,
                    status: format!("Starting {} stage", kind),
                });
            }

            let status_sink = move |status: &str| {
                if let Some(callback) = callback {
                    callback(RunProgress {
                        phase,
                        stage_index,
                        total_stages,
                        status: status.to_string(),
                    });
                }
            };

            let ctx = StageContext {
                registry: &self.registry,
                input,
                previous_payload: previous_payload.as_deref(),
                options: &self.options,
                required: descriptor.required,
                status: &status_sink,
            };

            let stage_start = Instant::now();
            let result = self.stage_for(kind).run(&ctx).await;
            let stage_duration = stage_start.elapsed();

            info!(
                "{} stage {} in {:.2}s",
                kind,
                result.label(),
                stage_duration.as_secs_f32()
            );

            match &result {
                StageResult::Success(payload) => {
                    previous_payload = Some(payload.clone());
                }
                StageResult::Skipped(reason) => {
                    if descriptor.required {
                        error = Some(format!("required stage {} was skipped: {}", kind, reason));
                    }
                }
                StageResult::Failed(stage_error) => {
                    error = Some(format!("{} stage failed: {}", kind, stage_error));
                }
            }

            state.push(StageRecord::new(kind, result, stage_duration));

            if error.is_some() {
                phase = RunPhase::Error;
                break;
            }
        }

        if phase != RunPhase::Error {
            phase = RunPhase::Done;
        }

        let duration = start_time.elapsed();

        if let Some(callback) = callback {
            let status = match &error {
                Some(message) => message.clone(),
                None => "Analysis complete".to_string(),
            };
            callback(RunProgress {
                phase,
                stage_index: total_stages,
                total_stages,
                status,
            });
        }

        Ok(RunReport {
            state,
            phase,
            duration,
            error,
        })
    }
}
