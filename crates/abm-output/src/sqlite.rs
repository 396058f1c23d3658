//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `agent_snapshots`, `tick_summaries`, and `task_summary`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, TaskSummaryRow, TickSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_snapshots (
                 tick        INTEGER NOT NULL,
                 agent_id    INTEGER NOT NULL,
                 room_id     INTEGER NOT NULL,
                 x           REAL    NOT NULL,
                 y           REAL    NOT NULL,
                 floor       INTEGER NOT NULL,
                 activity    TEXT    NOT NULL,
                 task_id     INTEGER,
                 task_status TEXT
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick             INTEGER PRIMARY KEY,
                 unix_time_secs   INTEGER NOT NULL,
                 moving           INTEGER NOT NULL,
                 performing       INTEGER NOT NULL,
                 idle             INTEGER NOT NULL,
                 failed_this_tick INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS task_summary (
                 task_id         INTEGER NOT NULL,
                 agent_id        INTEGER,
                 task_type       TEXT    NOT NULL,
                 status          TEXT    NOT NULL,
                 transition_tick INTEGER,
                 from_status     TEXT,
                 to_status       TEXT
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_snapshots \
                 (tick, agent_id, room_id, x, y, floor, activity, task_id, task_status) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick as i64,
                    row.agent_id,
                    row.room_id,
                    row.x,
                    row.y,
                    row.floor,
                    row.activity,
                    row.task_id,
                    row.task_status,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, unix_time_secs, moving, performing, idle, failed_this_tick) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                row.tick as i64,
                row.unix_time_secs,
                row.moving as i64,
                row.performing as i64,
                row.idle as i64,
                row.failed_this_tick as i64,
            ],
        )?;
        Ok(())
    }

    fn write_task_summary(&mut self, rows: &[TaskSummaryRow]) -> OutputResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO task_summary \
                 (task_id, agent_id, task_type, status, transition_tick, from_status, to_status) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.task_id,
                    row.agent_id,
                    row.task_type,
                    row.status,
                    row.transition_tick.map(|t| t as i64),
                    row.from,
                    row.to,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
