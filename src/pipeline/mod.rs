/*!
 * Sequential analysis pipeline for image text.
 *
 * The pipeline processes one source artifact through up to four stages:
 * 1. **Extract**: Read text out of the image (or accept provided text)
 * 2. **Translate**: Detect the source language, translate into the target
 * 3. **Summarize**: Condense the translation (optional)
 * 4. **Rewrite**: Restyle the translation (optional)
 */

pub mod extract;
pub mod input;
pub mod rewrite;
pub mod runner;
pub mod stage;
pub mod summarize;
pub mod translate;

// Re-export types used externally
pub use input::{ImageArtifact, ImageFormat, PipelineInput, SourceArtifact};
pub use runner::{PipelineRunner, RunPhase, RunProgress, RunReport, RunnerOptions};
pub use stage::{PipelineState, StageDescriptor, StageKind, StagePlan, StageRecord, StageResult};
