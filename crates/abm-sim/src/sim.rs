//! The `Sim` struct, its state machine, and the tick loop.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use abm_agent::{update, Activity, Agent, StepContext, StepOutcome};
use abm_core::{AgentId, SimClock, SimConfig, TaskId, Tick, ValidationError};
use abm_spatial::{DijkstraRouter, Router, Space};
use abm_task::{TaskRegistry, TaskSpec, TaskSummary};

use crate::snapshot::{AgentSnapshot, Snapshot, TickStats};
use crate::{SimError, SimObserver, SimResult};

// ── EngineState ───────────────────────────────────────────────────────────────

/// Lifecycle of one simulation run.
///
/// ```text
/// Uninitialized ──build()──► Configured ──first tick──► Running ──end_tick──► Completed
/// ```
///
/// `Uninitialized` is the [`SimBuilder`](crate::SimBuilder); a `Sim` is
/// always at least `Configured`.  `Completed` is final.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EngineState {
    Uninitialized,
    Configured,
    Running,
    Completed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Configured    => "configured",
            EngineState::Running       => "running",
            EngineState::Completed     => "completed",
        };
        f.write_str(s)
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation engine.
///
/// Holds the read-only `Space`, the agents (ascending id), and the single
/// mutable `TaskRegistry`.  Each tick runs, strictly in order:
///
/// 1. the agent update for every agent, ascending `AgentId`;
/// 2. the deadline sweep over all live tasks;
/// 3. the snapshot (on output ticks) and end-of-tick statistics.
///
/// Ticks run from `config.start_tick` to `config.end_tick` inclusive.  The
/// loop can be driven all at once ([`run`](Self::run)), a tick at a time
/// ([`step`](Self::step)), or until an external flag is raised
/// ([`run_until_cancelled`](Self::run_until_cancelled)); it only ever stops
/// between ticks.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: Router = DijkstraRouter> {
    pub(crate) config:   SimConfig,
    pub(crate) clock:    SimClock,
    pub(crate) space:    Space,
    pub(crate) router:   R,
    pub(crate) agents:   BTreeMap<AgentId, Agent>,
    pub(crate) registry: TaskRegistry,
    pub(crate) state:    EngineState,
}

impl<R: Router> Sim<R> {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn state(&self) -> EngineState { self.state }
    pub fn config(&self) -> &SimConfig { &self.config }
    pub fn clock(&self) -> &SimClock { &self.clock }
    pub fn space(&self) -> &Space { &self.space }
    pub fn registry(&self) -> &TaskRegistry { &self.registry }

    /// The tick the next call to `step` will run (`end_tick` once completed).
    pub fn next_tick(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// All agents, ascending by id.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Ticks still to run before `Completed`.
    pub fn remaining_ticks(&self) -> u64 {
        if self.state == EngineState::Completed {
            return 0;
        }
        self.config.end_tick.since(self.clock.current_tick) + 1
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Run every remaining tick and finish `Completed`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.ensure_runnable()?;
        while self.state != EngineState::Completed {
            self.process_tick(observer);
        }
        Ok(())
    }

    /// Run exactly one tick.  Returns the statistics of that tick.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickStats> {
        self.ensure_runnable()?;
        Ok(self.process_tick(observer))
    }

    /// Run up to `n` ticks, stopping early at `end_tick`.  Returns the number
    /// of ticks run.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<u64> {
        self.ensure_runnable()?;
        let mut ran = 0;
        while ran < n && self.state != EngineState::Completed {
            self.process_tick(observer);
            ran += 1;
        }
        Ok(ran)
    }

    /// Run until `end_tick` or until `cancel` is raised, checked between
    /// ticks.  Returns the state after the last tick that ran.
    pub fn run_until_cancelled<O: SimObserver>(
        &mut self,
        cancel:   &AtomicBool,
        observer: &mut O,
    ) -> SimResult<Snapshot> {
        self.ensure_runnable()?;
        while self.state != EngineState::Completed {
            if cancel.load(Ordering::Relaxed) {
                info!(next_tick = %self.clock.current_tick, "run cancelled between ticks");
                break;
            }
            self.process_tick(observer);
        }
        Ok(self.snapshot())
    }

    fn ensure_runnable(&self) -> SimResult<()> {
        match self.state {
            EngineState::Completed => Err(SimError::AlreadyCompleted),
            _ => Ok(()),
        }
    }

    // ── Between-tick mutation ─────────────────────────────────────────────

    /// Create a task for `agent` and queue it.  Takes effect from the next
    /// tick that runs.
    pub fn inject_task(&mut self, agent: AgentId, spec: TaskSpec) -> SimResult<TaskId> {
        self.ensure_runnable()?;
        if !self.agents.contains_key(&agent) {
            return Err(ValidationError::UnknownAgent(agent).into());
        }
        if !self.space.contains_room(spec.target) {
            return Err(ValidationError::UnknownRoom(spec.target).into());
        }
        let task = self.registry.create_for(agent, spec)?;
        debug!(%agent, %task, "task injected");
        Ok(task)
    }

    /// Take `agent` out of the run, cancelling its unfinished tasks.
    pub fn remove_agent(&mut self, agent: AgentId) -> SimResult<Agent> {
        self.ensure_runnable()?;
        let removed = self
            .agents
            .remove(&agent)
            .ok_or(ValidationError::UnknownAgent(agent))?;
        let cancelled = self.registry.retire_agent(agent, self.clock.current_tick);
        info!(%agent, cancelled = cancelled.len(), "agent removed");
        Ok(removed)
    }

    // ── Results ───────────────────────────────────────────────────────────

    /// Current state of every agent and its current task.
    pub fn snapshot(&self) -> Snapshot {
        let tick = self.last_tick();
        let agents = self
            .agents
            .values()
            .map(|a| self.agent_snapshot(a, a.current_task))
            .collect();
        Snapshot { tick, agents }
    }

    /// Final status and transition history of every task.
    pub fn task_summary(&self) -> Vec<TaskSummary> {
        self.registry.summary()
    }

    /// The most recent tick that ran (or `start_tick` before the first).
    fn last_tick(&self) -> Tick {
        let next = self.clock.current_tick;
        match self.state {
            EngineState::Completed => next,
            _ if next > self.config.start_tick => Tick(next.0 - 1),
            _ => next,
        }
    }

    fn agent_snapshot(&self, agent: &Agent, task: Option<TaskId>) -> AgentSnapshot {
        AgentSnapshot {
            agent:    agent.id,
            room:     agent.room,
            location: agent.location,
            activity: agent.activity,
            task:     task.and_then(|t| self.registry.get(t).map(|task| (t, task.status()))),
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<O: SimObserver>(&mut self, observer: &mut O) -> TickStats {
        let now = self.clock.current_tick;
        if self.state == EngineState::Configured {
            self.state = EngineState::Running;
            info!(
                start = %self.config.start_tick,
                end = %self.config.end_tick,
                agents = self.agents.len(),
                tasks = self.registry.len(),
                "simulation running"
            );
        }
        observer.on_tick_start(now);

        // ── Phase 1: agent pass (ascending AgentId) ───────────────────────
        let mut failed = 0;
        let mut touched: Vec<Option<TaskId>> = Vec::with_capacity(self.agents.len());
        {
            let ctx = StepContext {
                space:              &self.space,
                router:             &self.router,
                now,
                tick_duration_secs: self.config.tick_duration_secs,
            };
            let registry = &mut self.registry;
            for agent in self.agents.values_mut() {
                let task = match update(agent, &ctx, registry) {
                    Ok(StepOutcome::Failed { task }) => {
                        failed += 1;
                        Some(task)
                    }
                    Ok(StepOutcome::Completed { task }) => Some(task),
                    Ok(_) => agent.current_task,
                    Err(e) => {
                        // Contained to this agent; the tick goes on.
                        warn!(agent = %agent.id, error = %e, "agent update failed");
                        let task = agent.current_task;
                        if let Some(t) = task {
                            if registry.fail(t, now).is_ok() {
                                failed += 1;
                            }
                        }
                        agent.go_idle();
                        task
                    }
                };
                touched.push(task);
            }
        }

        // ── Phase 2: deadline sweep ───────────────────────────────────────
        failed += self.registry.sweep_deadlines(now).len();

        // ── Phase 3: statistics and snapshot ──────────────────────────────
        let mut stats = TickStats {
            tick: now,
            unix_time_secs: self.clock.unix_secs_at(now),
            failed_this_tick: failed,
            ..TickStats::default()
        };
        for agent in self.agents.values() {
            match agent.activity {
                Activity::Moving     => stats.moving += 1,
                Activity::Performing => stats.performing += 1,
                Activity::Idle       => stats.idle += 1,
            }
        }

        if now.since(self.config.start_tick) % self.config.output_interval_ticks == 0 {
            let agents = self
                .agents
                .values()
                .zip(&touched)
                .map(|(a, &task)| self.agent_snapshot(a, task))
                .collect();
            observer.on_snapshot(&Snapshot { tick: now, agents });
        }
        observer.on_tick_end(now, &stats);

        // ── Advance / finish ──────────────────────────────────────────────
        if now >= self.config.end_tick {
            self.state = EngineState::Completed;
            let summary = self.registry.summary();
            let [pending, in_progress, completed, cancelled, failed_total] = self.registry.status_counts();
            info!(
                final_tick = %now,
                pending, in_progress, completed, cancelled,
                failed = failed_total,
                "simulation completed"
            );
            observer.on_sim_end(now, &summary);
        } else {
            self.clock.advance();
        }
        stats
    }
}
