/*!
 * SQLite-backed run history store.
 *
 * This module handles connection creation, schema initialization, and the
 * query surface for recording and listing runs. Async callers go through
 * tokio's spawn_blocking so database work never blocks the runtime.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::models::{RunOutcome, RunRow, StageRow};

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "lenslate.db";

/// Default database directory name under the user's data directory
const DEFAULT_DB_DIRNAME: &str = "lenslate";

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run history store with thread-safe connection access
#[derive(Clone)]
pub struct HistoryStore {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection wrapped in Arc<Mutex>
    connection: Arc<Mutex<Connection>>,
}

impl HistoryStore {
    /// Open the store at the default location
    pub fn open_default() -> Result<Self> {
        let db_path = Self::default_database_path()?;
        Self::open(&db_path)
    }

    /// Open the store at the specified path
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening run history at: {:?}", db_path);

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        debug!("Creating in-memory run history");

        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;

        initialize_schema(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the default database path
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Execute a database operation asynchronously using spawn_blocking
    async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

            f(&conn)
        })
        .await
        .context("Database task panicked")?
    }

    /// Begin an async transaction and execute operations within it
    async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;

            Ok(result)
        })
        .await
        .context("Database transaction task panicked")?
    }

    /// Persist a run together with its stage records
    pub async fn record_run(&self, run: RunRow, stages: Vec<StageRow>) -> Result<()> {
        self.transaction_async(move |tx| {
            tx.execute(
                r#"
                INSERT INTO runs (
                    id, source, source_hash, target_language, outcome,
                    error, duration_ms, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    run.id,
                    run.source,
                    run.source_hash,
                    run.target_language,
                    run.outcome.to_string(),
                    run.error,
                    run.duration_ms,
                    run.created_at,
                ],
            )?;

            for stage in &stages {
                tx.execute(
                    r#"
                    INSERT INTO run_stages (
                        run_id, position, stage, status, detail, duration_ms
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        stage.run_id,
                        stage.position,
                        stage.stage,
                        stage.status,
                        stage.detail,
                        stage.duration_ms,
                    ],
                )?;
            }

            Ok(())
        })
        .await
    }

    /// List the most recent runs, newest first
    pub async fn recent_runs(&self, limit: usize) -> Result<Vec<RunRow>> {
        let limit = limit as i64;

        self.execute_async(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, source, source_hash, target_language, outcome,
                       error, duration_ms, created_at
                FROM runs
                ORDER BY created_at DESC, id
                LIMIT ?1
                "#,
            )?;

            let rows = stmt
                .query_map([limit], parse_run_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(rows)
        })
        .await
    }

    /// Stage records of one run, in execution order
    pub async fn stages_for(&self, run_id: &str) -> Result<Vec<StageRow>> {
        let run_id = run_id.to_string();

        self.execute_async(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT run_id, position, stage, status, detail, duration_ms
                FROM run_stages
                WHERE run_id = ?1
                ORDER BY position
                "#,
            )?;

            let rows = stmt
                .query_map([run_id], |row| {
                    Ok(StageRow {
                        run_id: row.get(0)?,
                        position: row.get(1)?,
                        stage: row.get(2)?,
                        status: row.get(3)?,
                        detail: row.get(4)?,
                        duration_ms: row.get(5)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(rows)
        })
        .await
    }

    /// Number of persisted runs
    pub async fn run_count(&self) -> Result<i64> {
        self.execute_async(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
    }
}

fn parse_run_row(row: &rusqlite::Row) -> rusqlite::Result<RunRow> {
    Ok(RunRow {
        id: row.get(0)?,
        source: row.get(1)?,
        source_hash: row.get(2)?,
        target_language: row.get(3)?,
        outcome: row
            .get::<_, String>(4)?
            .parse()
            .unwrap_or(RunOutcome::Failed),
        error: row.get(5)?,
        duration_ms: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Initialize the database schema
fn initialize_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing run history schema v{}", SCHEMA_VERSION);
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        return Err(anyhow::anyhow!(
            "Unknown schema version: {}. Cannot migrate.",
            current_version
        ));
    } else {
        debug!("Run history schema is up to date (v{})", current_version);
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

fn create_all_tables(conn: &Connection) -> Result<()> {
    // WAL for better concurrency and crash recovery
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS runs (
            id TEXT PRIMARY KEY,
            source TEXT NOT NULL,
            source_hash TEXT NOT NULL,
            target_language TEXT NOT NULL,
            outcome TEXT NOT NULL,
            error TEXT,
            duration_ms INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_runs_created ON runs(created_at);
        CREATE INDEX IF NOT EXISTS idx_runs_source_hash ON runs(source_hash);
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS run_stages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id TEXT NOT NULL REFERENCES runs(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            stage TEXT NOT NULL,
            status TEXT NOT NULL,
            detail TEXT,
            duration_ms INTEGER NOT NULL,
            UNIQUE(run_id, position)
        );

        CREATE INDEX IF NOT EXISTS idx_run_stages_run ON run_stages(run_id);
        "#,
    )?;

    debug!("Run history schema created");
    Ok(())
}
