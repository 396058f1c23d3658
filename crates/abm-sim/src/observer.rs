//! Simulation observer trait for progress reporting and data collection.

use abm_core::Tick;
use abm_task::TaskSummary;

use crate::snapshot::{Snapshot, TickStats};

/// Callbacks invoked by [`Sim`][crate::Sim] at key points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Hooks are infallible; an observer that can
/// fail (e.g. a file writer) stores its first error for the caller to collect
/// after the run.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {} moving", stats.moving);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any agent is updated.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called every `config.output_interval_ticks` ticks (counted from
    /// `start_tick`), after the agent pass and the deadline sweep.
    fn on_snapshot(&mut self, _snapshot: &Snapshot) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _tick: Tick, _stats: &TickStats) {}

    /// Called once when the engine reaches `Completed`.
    fn on_sim_end(&mut self, _final_tick: Tick, _tasks: &[TaskSummary]) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
