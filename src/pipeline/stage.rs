/*!
 * Stage model for the analysis pipeline.
 *
 * A run executes an ordered plan of stages (extract, translate, summarize,
 * rewrite). Each stage reports a tagged result; the pipeline state collects
 * one record per executed stage, append-only, so a finished run carries its
 * full history for display and debugging.
 */

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::capabilities::{CapabilityKind, CapabilityRegistry};
use crate::errors::{PipelineError, ProviderError, StageError};
use crate::pipeline::input::PipelineInput;
use crate::pipeline::runner::RunnerOptions;

/// The stages a pipeline run can execute, in their fixed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Read text out of the source artifact
    Extract,
    /// Translate the extracted text into the target language
    Translate,
    /// Summarize the translated text
    Summarize,
    /// Rewrite the translated text in a configured style
    Rewrite,
}

impl StageKind {
    /// Get the kind as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Extract => "extract",
            StageKind::Translate => "translate",
            StageKind::Summarize => "summarize",
            StageKind::Rewrite => "rewrite",
        }
    }

    /// Position in the fixed linear order
    fn position(&self) -> usize {
        match self {
            StageKind::Extract => 0,
            StageKind::Translate => 1,
            StageKind::Summarize => 2,
            StageKind::Rewrite => 3,
        }
    }

    /// The capability the stage invokes
    pub fn capability(&self) -> CapabilityKind {
        match self {
            StageKind::Extract => CapabilityKind::Extractor,
            StageKind::Translate => CapabilityKind::Translator,
            StageKind::Summarize => CapabilityKind::Summarizer,
            StageKind::Rewrite => CapabilityKind::Rewriter,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a stage plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDescriptor {
    /// Which stage to run
    pub kind: StageKind,

    /// Whether the run can complete without this stage succeeding
    pub required: bool,
}

impl StageDescriptor {
    /// Create a required stage descriptor
    pub fn required(kind: StageKind) -> Self {
        Self {
            kind,
            required: true,
        }
    }

    /// Create an optional stage descriptor
    pub fn optional(kind: StageKind) -> Self {
        Self {
            kind,
            required: false,
        }
    }
}

/// An ordered, validated list of stages for one run.
///
/// Construction enforces the fixed linear order, rejects duplicates, and
/// rejects plans that do not start with the extract stage.
#[derive(Debug, Clone)]
pub struct StagePlan {
    stages: Vec<StageDescriptor>,
}

impl StagePlan {
    /// Build a plan from descriptors, validating order and uniqueness
    pub fn new(stages: Vec<StageDescriptor>) -> Result<Self, PipelineError> {
        if stages.is_empty() {
            return Err(PipelineError::InvalidPlan("plan has no stages".to_string()));
        }

        if stages[0].kind != StageKind::Extract {
            return Err(PipelineError::InvalidPlan(format!(
                "plan must start with the extract stage, found {}",
                stages[0].kind
            )));
        }

        for window in stages.windows(2) {
            let (previous, current) = (window[0].kind, window[1].kind);

            if current.position() == previous.position() {
                return Err(PipelineError::InvalidPlan(format!(
                    "duplicate stage: {}",
                    current
                )));
            }

            if current.position() < previous.position() {
                return Err(PipelineError::InvalidPlan(format!(
                    "stage {} cannot run after {}",
                    current, previous
                )));
            }
        }

        Ok(Self { stages })
    }

    /// The standard plan: extract and translate required, summarize optional
    pub fn standard() -> Self {
        Self {
            stages: vec![
                StageDescriptor::required(StageKind::Extract),
                StageDescriptor::required(StageKind::Translate),
                StageDescriptor::optional(StageKind::Summarize),
            ],
        }
    }

    /// Append the optional rewrite stage
    pub fn with_rewrite(mut self) -> Self {
        if !self.contains(StageKind::Rewrite) {
            self.stages.push(StageDescriptor::optional(StageKind::Rewrite));
        }
        self
    }

    /// Iterate the descriptors in execution order
    pub fn iter(&self) -> impl Iterator<Item = &StageDescriptor> {
        self.stages.iter()
    }

    /// Number of stages in the plan
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the plan is empty (never true for a validated plan)
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Check whether the plan includes a stage kind
    pub fn contains(&self, kind: StageKind) -> bool {
        self.stages.iter().any(|descriptor| descriptor.kind == kind)
    }
}

impl Default for StagePlan {
    fn default() -> Self {
        Self::standard()
    }
}

/// Result of one stage execution
#[derive(Debug)]
pub enum StageResult {
    /// The stage produced a payload for the next stage
    Success(String),

    /// The stage did not run, with the reason; the run continues
    Skipped(String),

    /// The stage failed with a classified error
    Failed(StageError),
}

impl StageResult {
    /// Check whether this is a success
    pub fn is_success(&self) -> bool {
        matches!(self, StageResult::Success(_))
    }

    /// Check whether this is a skip
    pub fn is_skipped(&self) -> bool {
        matches!(self, StageResult::Skipped(_))
    }

    /// Check whether this is a failure
    pub fn is_failed(&self) -> bool {
        matches!(self, StageResult::Failed(_))
    }

    /// Get the payload of a successful result
    pub fn payload(&self) -> Option<&str> {
        match self {
            StageResult::Success(payload) => Some(payload.as_str()),
            _ => None,
        }
    }

    /// One-word label for logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            StageResult::Success(_) => "success",
            StageResult::Skipped(_) => "skipped",
            StageResult::Failed(_) => "failed",
        }
    }
}

/// One executed stage, with its outcome and wall-clock duration
#[derive(Debug)]
pub struct StageRecord {
    /// Which stage ran
    pub kind: StageKind,

    /// What it produced
    pub result: StageResult,

    /// How long it took
    pub duration: Duration,
}

impl StageRecord {
    /// Create a new record
    pub fn new(kind: StageKind, result: StageResult, duration: Duration) -> Self {
        Self {
            kind,
            result,
            duration,
        }
    }
}

/// Ordered, append-only sequence of stage records for one run.
///
/// Records are immutable once appended; there is no API to remove or
/// rewrite them.
#[derive(Debug, Default)]
pub struct PipelineState {
    records: Vec<StageRecord>,
}

impl PipelineState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn push(&mut self, record: StageRecord) {
        self.records.push(record);
    }

    /// All records in execution order
    pub fn records(&self) -> &[StageRecord] {
        &self.records
    }

    /// Number of executed stages
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no stage has executed yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record for a stage kind, if that stage executed
    pub fn record_for(&self, kind: StageKind) -> Option<&StageRecord> {
        self.records.iter().find(|record| record.kind == kind)
    }

    /// The successful payload of a stage, if it executed and succeeded
    pub fn payload_for(&self, kind: StageKind) -> Option<&str> {
        self.record_for(kind).and_then(|record| record.result.payload())
    }

    /// The first failed record, if any
    pub fn first_failure(&self) -> Option<&StageRecord> {
        self.records.iter().find(|record| record.result.is_failed())
    }
}

/// Everything a stage needs to run
pub struct StageContext<'a> {
    /// The capability registry for this run
    pub registry: &'a CapabilityRegistry,

    /// The pipeline input
    pub input: &'a PipelineInput,

    /// Successful payload of the previous stage, if any
    pub previous_payload: Option<&'a str>,

    /// Options shaping the optional stages
    pub options: &'a RunnerOptions,

    /// Whether the run needs this stage to succeed
    pub required: bool,

    /// Sink for human-readable status lines
    pub status: &'a (dyn Fn(&str) + Send + Sync),
}

impl StageContext<'_> {
    /// Report a status line to the observer
    pub fn report_status(&self, status: &str) {
        (self.status)(status);
    }

    /// The previous stage's payload, or empty when this is the first stage
    pub fn previous_payload(&self) -> &str {
        self.previous_payload.unwrap_or("")
    }
}

/// One executable unit of the pipeline
#[async_trait]
pub trait PipelineStage: Send + Sync {
    /// Which stage this is
    fn kind(&self) -> StageKind;

    /// Execute the stage against the context
    async fn run(&self, ctx: &StageContext<'_>) -> StageResult;
}

/// Classify a provider error at the call boundary.
///
/// Permission refusals (HTTP 401/403 and provider-flagged policy blocks)
/// become the distinct restriction error; everything else stays a provider
/// error.
pub fn classify_provider_error(error: ProviderError) -> StageError {
    match error {
        ProviderError::Restricted(message) => StageError::Restricted(message),
        ProviderError::ApiError {
            status_code,
            message,
        } if status_code == 401 || status_code == 403 => {
            StageError::Restricted(format!("HTTP {}: {}", status_code, message))
        }
        other => StageError::Provider(other),
    }
}
