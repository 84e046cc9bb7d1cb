/*!
 * Run history entity models.
 *
 * These structures map directly to the history tables and provide
 * type-safe access to persisted runs.
 */

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::input::PipelineInput;
use crate::pipeline::runner::RunReport;
use crate::pipeline::stage::StageResult;

/// Terminal outcome of a recorded run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The run completed its plan
    Completed,
    /// A required stage failed
    Failed,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Completed => write!(f, "completed"),
            RunOutcome::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for RunOutcome {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(RunOutcome::Completed),
            "failed" => Ok(RunOutcome::Failed),
            _ => Err(anyhow::anyhow!("Invalid run outcome: {}", s)),
        }
    }
}

/// One persisted pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRow {
    /// Unique run identifier (UUID)
    pub id: String,
    /// Short description of the source artifact
    pub source: String,
    /// SHA256 hash of the artifact content
    pub source_hash: String,
    /// Target language code of the run
    pub target_language: String,
    /// Terminal outcome
    pub outcome: RunOutcome,
    /// Error message, if the run failed
    pub error: Option<String>,
    /// Total run duration in milliseconds
    pub duration_ms: i64,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

impl RunRow {
    /// Build a run row from a finished report
    pub fn from_report(input: &PipelineInput, report: &RunReport) -> Self {
        let outcome = if report.succeeded() {
            RunOutcome::Completed
        } else {
            RunOutcome::Failed
        };

        Self {
            id: Uuid::new_v4().to_string(),
            source: input.artifact.describe(),
            source_hash: input.artifact.content_hash(),
            target_language: input.target_language.clone(),
            outcome,
            error: report.error.clone(),
            duration_ms: report.duration.as_millis() as i64,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// One persisted stage record of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRow {
    /// Run this stage belongs to
    pub run_id: String,
    /// Zero-based execution position within the run
    pub position: i64,
    /// Stage kind
    pub stage: String,
    /// One-word result label (success, skipped, failed)
    pub status: String,
    /// Skip reason or error message, if any
    pub detail: Option<String>,
    /// Stage duration in milliseconds
    pub duration_ms: i64,
}

impl StageRow {
    /// Build the stage rows for a finished report
    pub fn rows_for(run_id: &str, report: &RunReport) -> Vec<Self> {
        report
            .state
            .records()
            .iter()
            .enumerate()
            .map(|(position, record)| {
                let detail = match &record.result {
                    StageResult::Success(_) => None,
                    StageResult::Skipped(reason) => Some(reason.clone()),
                    StageResult::Failed(error) => Some(error.to_string()),
                };

                Self {
                    run_id: run_id.to_string(),
                    position: position as i64,
                    stage: record.kind.to_string(),
                    status: record.result.label().to_string(),
                    detail,
                    duration_ms: record.duration.as_millis() as i64,
                }
            })
            .collect()
    }
}
