//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `tick_summaries.csv`
//! - `task_summary.csv`
//!
//! Optional columns are written as empty fields.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, TaskSummaryRow, TickSummaryRow};

const SNAPSHOT_HEADER: [&str; 9] =
    ["tick", "agent_id", "room_id", "x", "y", "floor", "activity", "task_id", "task_status"];
const SUMMARY_HEADER: [&str; 6] =
    ["tick", "unix_time_secs", "moving", "performing", "idle", "failed_this_tick"];
const TASK_HEADER: [&str; 7] =
    ["task_id", "agent_id", "task_type", "status", "transition_tick", "from", "to"];

/// Writes simulation output as three CSV streams.
pub struct CsvWriter<W: Write = File> {
    snapshots: Writer<W>,
    summaries: Writer<W>,
    tasks:     Writer<W>,
    finished:  bool,
}

impl CsvWriter<File> {
    /// Create the three CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        Self::from_writers(
            File::create(dir.join("agent_snapshots.csv"))?,
            File::create(dir.join("tick_summaries.csv"))?,
            File::create(dir.join("task_summary.csv"))?,
        )
    }
}

impl<W: Write> CsvWriter<W> {
    /// Write to arbitrary sinks (e.g. in-memory buffers).
    pub fn from_writers(snapshots: W, summaries: W, tasks: W) -> OutputResult<Self> {
        let mut snapshots = Writer::from_writer(snapshots);
        snapshots.write_record(SNAPSHOT_HEADER)?;
        let mut summaries = Writer::from_writer(summaries);
        summaries.write_record(SUMMARY_HEADER)?;
        let mut tasks = Writer::from_writer(tasks);
        tasks.write_record(TASK_HEADER)?;
        Ok(Self { snapshots, summaries, tasks, finished: false })
    }

    /// Flush and return the sinks as `(snapshots, summaries, tasks)`.
    pub fn into_inner(self) -> OutputResult<(W, W, W)> {
        Ok((
            self.snapshots.into_inner().map_err(|e| e.into_error())?,
            self.summaries.into_inner().map_err(|e| e.into_error())?,
            self.tasks.into_inner().map_err(|e| e.into_error())?,
        ))
    }
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

impl<W: Write> OutputWriter for CsvWriter<W> {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.agent_id.to_string(),
                row.room_id.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.floor.to_string(),
                row.activity.to_owned(),
                opt(row.task_id),
                opt(row.task_status),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            row.moving.to_string(),
            row.performing.to_string(),
            row.idle.to_string(),
            row.failed_this_tick.to_string(),
        ])?;
        Ok(())
    }

    fn write_task_summary(&mut self, rows: &[TaskSummaryRow]) -> OutputResult<()> {
        for row in rows {
            self.tasks.write_record(&[
                row.task_id.to_string(),
                opt(row.agent_id),
                row.task_type.to_owned(),
                row.status.to_owned(),
                opt(row.transition_tick),
                opt(row.from),
                opt(row.to),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        self.tasks.flush()?;
        Ok(())
    }
}
