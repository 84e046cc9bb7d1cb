/*!
 * Run history persistence.
 *
 * Every finished pipeline run is recorded in a local SQLite database:
 * one row per run plus one row per executed stage.
 */

pub mod models;
pub mod store;

pub use models::{RunOutcome, RunRow, StageRow};
pub use store::HistoryStore;
