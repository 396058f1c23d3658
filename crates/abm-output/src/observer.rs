//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use abm_core::Tick;
use abm_sim::{SimObserver, Snapshot, TickStats};
use abm_task::TaskSummary;

use crate::row::{AgentSnapshotRow, TaskSummaryRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes snapshots, tick summaries, and the final
/// task summary to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect buffers after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        if snapshot.agents.is_empty() {
            return;
        }
        let rows: Vec<AgentSnapshotRow> = snapshot
            .agents
            .iter()
            .map(|a| AgentSnapshotRow::from_snapshot(snapshot.tick.0, a))
            .collect();
        let result = self.writer.write_snapshots(&rows);
        self.store_err(result);
    }

    fn on_tick_end(&mut self, _tick: Tick, stats: &TickStats) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(stats));
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick, summary: &[TaskSummary]) {
        let rows: Vec<TaskSummaryRow> = summary.iter().flat_map(TaskSummaryRow::from_summary).collect();
        let result = self.writer.write_task_summary(&rows);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
