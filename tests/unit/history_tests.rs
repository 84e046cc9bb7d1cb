/*!
 * Tests for run history models and the local history store
 */

use anyhow::Result;

use lenslate::history::{HistoryStore, RunOutcome, RunRow, StageRow};
use lenslate::pipeline::StagePlan;

use crate::common;

/// Test run outcome string conversions
#[test]
fn test_runOutcome_stringConversions_shouldRoundTrip() {
    assert_eq!(RunOutcome::Completed.to_string(), "completed");
    assert_eq!(RunOutcome::Failed.to_string(), "failed");

    let completed: RunOutcome = "completed".parse().expect("Should parse completed");
    assert_eq!(completed, RunOutcome::Completed);

    let failed: RunOutcome = "FAILED".parse().expect("Should parse failed");
    assert_eq!(failed, RunOutcome::Failed);

    assert!("cancelled".parse::<RunOutcome>().is_err());
}

/// Test building a run row from a finished report
#[test]
fn test_runRow_fromReport_withCompletedRun_shouldCaptureRunFacts() {
    tokio_test::block_on(async {
        let runner = common::working_runner();
        let input = common::sample_input("es");
        let plan = StagePlan::standard();

        let report = runner
            .run(&input, &plan, None)
            .await
            .expect("Run should complete");
        let row = RunRow::from_report(&input, &report);

        assert!(!row.id.is_empty());
        assert_eq!(row.outcome, RunOutcome::Completed);
        assert_eq!(row.target_language, "es");
        assert!(row.error.is_none());
        assert!(row.duration_ms >= 0);
        assert!(!row.source_hash.is_empty());
        assert!(row.created_at.contains('T'), "Timestamp should be ISO 8601");
    });
}

/// Test building stage rows from a finished report
#[test]
fn test_stageRow_rowsFor_withCompletedRun_shouldRecordEveryStage() {
    tokio_test::block_on(async {
        let runner = common::working_runner();
        let input = common::sample_input("es");
        let plan = StagePlan::standard();

        let report = runner
            .run(&input, &plan, None)
            .await
            .expect("Run should complete");
        let rows = StageRow::rows_for("run-1", &report);

        assert_eq!(rows.len(), 3);
        for (index, row) in rows.iter().enumerate() {
            assert_eq!(row.run_id, "run-1");
            assert_eq!(row.position, index as i64);
            assert_eq!(row.status, "success");
            assert!(row.detail.is_none());
            assert!(row.duration_ms >= 0);
        }
        assert_eq!(rows[0].stage, "extract");
        assert_eq!(rows[1].stage, "translate");
        assert_eq!(rows[2].stage, "summarize");
    });
}

/// Test persisting and reading back a run
#[test]
fn test_historyStore_recordRun_shouldReadBackRunAndStages() -> Result<()> {
    tokio_test::block_on(async {
        let store = HistoryStore::open_in_memory()?;

        let runner = common::working_runner();
        let input = common::sample_input("fr");
        let plan = StagePlan::standard();
        let report = runner
            .run(&input, &plan, None)
            .await
            .expect("Run should complete");

        let run = RunRow::from_report(&input, &report);
        let run_id = run.id.clone();
        let stages = StageRow::rows_for(&run_id, &report);
        store.record_run(run, stages).await?;

        assert_eq!(store.run_count().await?, 1);

        let runs = store.recent_runs(10).await?;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, run_id);
        assert_eq!(runs[0].outcome, RunOutcome::Completed);
        assert_eq!(runs[0].target_language, "fr");

        let stages = store.stages_for(&run_id).await?;
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0].stage, "extract");
        assert_eq!(stages[0].status, "success");

        Ok(())
    })
}

/// Test that recent runs come back newest first and honor the limit
#[test]
fn test_historyStore_recentRuns_shouldReturnNewestFirst() -> Result<()> {
    tokio_test::block_on(async {
        let store = HistoryStore::open_in_memory()?;

        let older = sample_row("run-old", "2026-08-21T10:00:00+00:00");
        let newer = sample_row("run-new", "2026-08-22T10:00:00+00:00");
        store.record_run(older, vec![]).await?;
        store.record_run(newer, vec![]).await?;

        let runs = store.recent_runs(10).await?;
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id, "run-new");
        assert_eq!(runs[1].id, "run-old");

        let limited = store.recent_runs(1).await?;
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, "run-new");

        Ok(())
    })
}

/// Test that unknown run ids come back empty
#[test]
fn test_historyStore_stagesFor_withUnknownRun_shouldReturnEmpty() -> Result<()> {
    tokio_test::block_on(async {
        let store = HistoryStore::open_in_memory()?;

        let stages = store.stages_for("no-such-run").await?;

        assert!(stages.is_empty());
        Ok(())
    })
}

/// Build a minimal run row with an explicit timestamp
fn sample_row(id: &str, created_at: &str) -> RunRow {
    RunRow {
        id: id.to_string(),
        source: "image sign.png".to_string(),
        source_hash: "deadbeef".to_string(),
        target_language: "en".to_string(),
        outcome: RunOutcome::Completed,
        error: None,
        duration_ms: 1200,
        created_at: created_at.to_string(),
    }
}
