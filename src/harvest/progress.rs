//! Workflow ledger
//!
//! A local SQLite database tracks what each harvest run accomplished,
//! keyed by hour bucket:
//!
//! - `workflow_stats`: one row per `batch_time` with the last update
//!   timestamp, the count of successfully persisted matches (`fetch`),
//!   and a `pair` counter reserved for the downstream pairing stage.
//!   Written with a single atomic upsert, so concurrent or interleaved
//!   runs cannot lose increments.
//! - `dead_letters`: append-only records for matches whose storage
//!   retries were exhausted, carrying enough to replay them later.
//!
//! Both tables are created idempotently on open.

use rusqlite::{Connection, OptionalExtension};

use super::error::ProgressError;

/// One `workflow_stats` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEntry {
    pub batch_time: i64,
    pub updated_epoch: i64,
    /// Successfully persisted matches in this bucket.
    pub fetch: i64,
    /// Reserved for the pairing stage; this pipeline never increments it.
    pub pair: i64,
}

/// One `dead_letters` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetter {
    pub match_id: u64,
    pub batch_time: i64,
    pub error: String,
    pub created_epoch: i64,
}

pub struct ProgressTracker {
    conn: Connection,
    now_fn: Box<dyn Fn() -> i64 + Send + Sync>,
}

impl ProgressTracker {
    /// Open (creating if needed) the ledger at `path`.
    pub fn open(path: &str) -> Result<Self, ProgressError> {
        Self::open_with_now(path, Box::new(|| chrono::Utc::now().timestamp()))
    }

    /// Open with an injected clock. Tests use this to pin
    /// `updated_epoch` values.
    pub fn open_with_now(
        path: &str,
        now_fn: Box<dyn Fn() -> i64 + Send + Sync>,
    ) -> Result<Self, ProgressError> {
        let conn = Connection::open(path)?;
        let tracker = Self { conn, now_fn };
        tracker.ensure_schema()?;
        Ok(tracker)
    }

    /// Create both tables when absent. Safe to call repeatedly.
    fn ensure_schema(&self) -> Result<(), ProgressError> {
        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS workflow_stats (
                batch_time      INTEGER PRIMARY KEY,
                updated_epoch   INTEGER NOT NULL,
                fetch           INTEGER NOT NULL DEFAULT 0,
                pair            INTEGER NOT NULL DEFAULT 0
            )
            "#,
            [],
        )?;
        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS dead_letters (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                match_id        INTEGER NOT NULL,
                batch_time      INTEGER NOT NULL,
                error           TEXT NOT NULL,
                created_epoch   INTEGER NOT NULL
            )
            "#,
            [],
        )?;
        Ok(())
    }

    /// Count one successfully persisted match in `batch_time`.
    ///
    /// First success creates the row with `fetch = 1`; later successes
    /// increment it and refresh `updated_epoch`. One statement, so the
    /// increment can never be lost to a concurrent reader.
    pub fn record_success(&self, batch_time: i64) -> Result<(), ProgressError> {
        let now = (self.now_fn)();
        self.conn.execute(
            r#"
            INSERT INTO workflow_stats (batch_time, updated_epoch, fetch, pair)
            VALUES (?1, ?2, 1, 0)
            ON CONFLICT(batch_time) DO UPDATE SET
                updated_epoch = excluded.updated_epoch,
                fetch = workflow_stats.fetch + 1
            "#,
            rusqlite::params![batch_time, now],
        )?;
        Ok(())
    }

    /// Record a match whose storage retries were exhausted.
    pub fn record_dead_letter(
        &self,
        match_id: u64,
        batch_time: i64,
        error: &str,
    ) -> Result<(), ProgressError> {
        let now = (self.now_fn)();
        self.conn.execute(
            r#"
            INSERT INTO dead_letters (match_id, batch_time, error, created_epoch)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            rusqlite::params![match_id as i64, batch_time, error, now],
        )?;
        Ok(())
    }

    /// Read one bucket's entry, `None` when nothing was recorded yet.
    pub fn entry(&self, batch_time: i64) -> Result<Option<ProgressEntry>, ProgressError> {
        let row = self
            .conn
            .query_row(
                "SELECT batch_time, updated_epoch, fetch, pair
                 FROM workflow_stats WHERE batch_time = ?1",
                [batch_time],
                |row| {
                    Ok(ProgressEntry {
                        batch_time: row.get(0)?,
                        updated_epoch: row.get(1)?,
                        fetch: row.get(2)?,
                        pair: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// All dead letters, oldest first.
    pub fn dead_letters(&self) -> Result<Vec<DeadLetter>, ProgressError> {
        let mut stmt = self.conn.prepare(
            "SELECT match_id, batch_time, error, created_epoch
             FROM dead_letters ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(DeadLetter {
                    match_id: row.get::<_, i64>(0)? as u64,
                    batch_time: row.get(1)?,
                    error: row.get(2)?,
                    created_epoch: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Total buckets tracked.
    pub fn bucket_count(&self) -> Result<i64, ProgressError> {
        let count =
            self.conn
                .query_row("SELECT COUNT(*) FROM workflow_stats", [], |row| row.get(0))?;
        Ok(count)
    }
}
