//! `TaskRegistry` — the single owner of task state.
//!
//! Tasks live in an arena indexed by `TaskId` (allocated sequentially by
//! [`TaskRegistry::create`]).  Each agent has a queue of task ids kept sorted
//! by [`Task::queue_key`]; a task sits in at most one queue at a time.
//!
//! Agents and the engine never touch task fields directly: they call
//! [`assign`](TaskRegistry::assign), [`transition`](TaskRegistry::transition)
//! and the dwell helpers, which enforce the state machine and record every
//! accepted status change in an append-only log.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use abm_core::{AgentId, TaskId, Tick, ValidationError};

use crate::task::{Task, TaskSpec, TaskStatus, TaskType};
use crate::{TaskError, TaskResult};

// ── Transition log ────────────────────────────────────────────────────────────

/// One accepted status change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    pub task: TaskId,
    pub from: TaskStatus,
    pub to:   TaskStatus,
    pub at:   Tick,
}

/// End-of-run record for one task.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskSummary {
    pub task:        TaskId,
    pub owner:       Option<AgentId>,
    pub kind:        TaskType,
    pub status:      TaskStatus,
    /// Accepted transitions of this task, oldest first.
    pub transitions: Vec<Transition>,
}

// ── TaskRegistry ──────────────────────────────────────────────────────────────

#[derive(Default, Debug, Clone)]
pub struct TaskRegistry {
    tasks:  Vec<Task>,
    /// Per-agent queues, each sorted by `Task::queue_key`.
    queues: BTreeMap<AgentId, Vec<TaskId>>,
    log:    Vec<Transition>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Creation & lookup ─────────────────────────────────────────────────

    /// Register a new Pending, unowned task.
    pub fn create(&mut self, spec: TaskSpec) -> TaskId {
        let id = TaskId(self.tasks.len() as u32);
        self.tasks.push(Task::new(id, spec));
        id
    }

    /// Create a task and assign it to `agent` in one step.
    pub fn create_for(&mut self, agent: AgentId, spec: TaskSpec) -> TaskResult<TaskId> {
        let id = self.create(spec);
        self.assign(agent, id)?;
        Ok(id)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// All tasks in ascending id order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter()
    }

    /// The agent's queue, most urgent first.
    pub fn queue(&self, agent: AgentId) -> &[TaskId] {
        self.queues.get(&agent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Agents that have (or had) a queue, ascending.
    pub fn agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.queues.keys().copied()
    }

    fn task(&self, id: TaskId) -> TaskResult<&Task> {
        self.tasks
            .get(id.index())
            .ok_or(TaskError::Validation(ValidationError::UnknownTask(id)))
    }

    fn task_mut(&mut self, id: TaskId) -> TaskResult<&mut Task> {
        self.tasks
            .get_mut(id.index())
            .ok_or(TaskError::Validation(ValidationError::UnknownTask(id)))
    }

    // ── Ownership ─────────────────────────────────────────────────────────

    /// Put `task` into `agent`'s queue at its priority position.
    ///
    /// Fails with [`TaskError::Assignment`] while another agent owns the task
    /// and it is not Completed or Cancelled; otherwise ownership moves to
    /// `agent`.  Assigning a task to its current owner is a no-op.
    pub fn assign(&mut self, agent: AgentId, task: TaskId) -> TaskResult<()> {
        let (owner, status) = {
            let current = self.task(task)?;
            (current.owner, current.status)
        };
        match owner {
            Some(owner) if owner == agent => return Ok(()),
            Some(owner) if !matches!(status, TaskStatus::Completed | TaskStatus::Cancelled) => {
                return Err(TaskError::Assignment { task, owner, requested: agent });
            }
            Some(owner) => self.detach(owner, task),
            None => {}
        }
        self.attach(agent, task);
        Ok(())
    }

    /// Move a Pending task from its owner's queue to `to`.
    pub fn reassign(&mut self, task: TaskId, to: AgentId) -> TaskResult<()> {
        let (owner, status) = {
            let current = self.task(task)?;
            (current.owner, current.status)
        };
        if status != TaskStatus::Pending {
            return Err(TaskError::NotReassignable { task, status });
        }
        if let Some(owner) = owner {
            if owner == to {
                return Ok(());
            }
            self.detach(owner, task);
        }
        self.attach(to, task);
        debug!(%task, %to, "task reassigned");
        Ok(())
    }

    fn attach(&mut self, agent: AgentId, task: TaskId) {
        self.tasks[task.index()].owner = Some(agent);
        let key = self.tasks[task.index()].queue_key();
        let tasks = &self.tasks;
        let queue = self.queues.entry(agent).or_default();
        let pos = queue.partition_point(|t| tasks[t.index()].queue_key() < key);
        queue.insert(pos, task);
    }

    fn detach(&mut self, agent: AgentId, task: TaskId) {
        if let Some(queue) = self.queues.get_mut(&agent) {
            queue.retain(|&t| t != task);
        }
        self.tasks[task.index()].owner = None;
    }

    /// Cancel every live task of `agent` and drop its queue.
    ///
    /// Returns the ids of the tasks that were cancelled.
    pub fn retire_agent(&mut self, agent: AgentId, at: Tick) -> Vec<TaskId> {
        let queue = self.queues.remove(&agent).unwrap_or_default();
        let mut cancelled = Vec::new();
        for task in queue {
            if self.tasks[task.index()].status.is_live()
                && self.transition(task, TaskStatus::Cancelled, at).is_ok()
            {
                cancelled.push(task);
            }
        }
        cancelled
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// The most urgent task of `agent` that is due at `now`, still Pending or
    /// InProgress, and not overdue.
    pub fn next_actionable(&self, agent: AgentId, now: Tick) -> Option<TaskId> {
        self.queue(agent)
            .iter()
            .copied()
            .find(|t| self.tasks[t.index()].is_actionable(now))
    }

    // ── State machine ─────────────────────────────────────────────────────

    /// Change the status of `task`, enforcing the lifecycle.
    ///
    /// An illegal change fails with [`TaskError::InvalidTransition`] and
    /// leaves the task untouched.
    pub fn transition(&mut self, task: TaskId, to: TaskStatus, at: Tick) -> TaskResult<()> {
        let entry = self.task_mut(task)?;
        let from = entry.status;
        if !from.can_transition_to(to) {
            return Err(TaskError::InvalidTransition { task, from, to });
        }
        entry.status = to;
        match to {
            TaskStatus::InProgress => entry.started_at = Some(at),
            _ if to.is_terminal() => entry.finished_at = Some(at),
            _ => {}
        }
        self.log.push(Transition { task, from, to, at });
        debug!(%task, %from, %to, %at, "task transition");
        Ok(())
    }

    pub fn cancel(&mut self, task: TaskId, at: Tick) -> TaskResult<()> {
        self.transition(task, TaskStatus::Cancelled, at)
    }

    pub fn fail(&mut self, task: TaskId, at: Tick) -> TaskResult<()> {
        self.transition(task, TaskStatus::Failed, at)
    }

    // ── Dwell accounting ──────────────────────────────────────────────────

    /// The owner has arrived at the target: go InProgress, and straight to
    /// Completed when no dwell is required.  Returns the resulting status.
    ///
    /// A task already overdue at `at` is failed instead.
    pub fn begin(&mut self, task: TaskId, at: Tick) -> TaskResult<TaskStatus> {
        if self.fail_if_overdue(task, at)? {
            return Ok(TaskStatus::Failed);
        }
        self.transition(task, TaskStatus::InProgress, at)?;
        if self.tasks[task.index()].spec.dwell_ticks == 0 {
            self.transition(task, TaskStatus::Completed, at)?;
        }
        Ok(self.tasks[task.index()].status)
    }

    /// Add one tick of performance to an InProgress task, completing it once
    /// the dwell time is reached.  Returns the resulting status.
    ///
    /// A task already overdue at `at` is failed instead.
    pub fn perform(&mut self, task: TaskId, at: Tick) -> TaskResult<TaskStatus> {
        if self.fail_if_overdue(task, at)? {
            return Ok(TaskStatus::Failed);
        }
        let entry = self.task_mut(task)?;
        if entry.status != TaskStatus::InProgress {
            return Err(TaskError::InvalidTransition {
                task,
                from: entry.status,
                to: TaskStatus::InProgress,
            });
        }
        entry.performed_ticks += 1;
        if entry.performed_ticks >= entry.spec.dwell_ticks {
            self.transition(task, TaskStatus::Completed, at)?;
        }
        Ok(self.tasks[task.index()].status)
    }

    // ── Deadlines ─────────────────────────────────────────────────────────

    /// Fail `task` when it is live and overdue at `now`.  Returns whether it
    /// was failed.
    pub fn fail_if_overdue(&mut self, task: TaskId, now: Tick) -> TaskResult<bool> {
        let entry = self.task_mut(task)?;
        if !(entry.status.is_live() && entry.is_overdue(now)) {
            return Ok(false);
        }
        let (owner, deadline) = (entry.owner, entry.spec.deadline);
        self.fail(task, now)?;
        warn!(%task, ?owner, ?deadline, %now, "task missed its deadline");
        Ok(true)
    }

    /// Fail every live task that is overdue at `now`, in ascending id order.
    ///
    /// Returns the ids that were failed.
    pub fn sweep_deadlines(&mut self, now: Tick) -> Vec<TaskId> {
        let overdue: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|t| t.status.is_live() && t.is_overdue(now))
            .map(|t| t.id)
            .collect();
        overdue
            .into_iter()
            .filter(|&task| self.fail_if_overdue(task, now).unwrap_or(false))
            .collect()
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// Every accepted transition, in the order it happened.
    pub fn log(&self) -> &[Transition] {
        &self.log
    }

    pub fn transitions_of(&self, task: TaskId) -> impl Iterator<Item = &Transition> + '_ {
        self.log.iter().filter(move |t| t.task == task)
    }

    /// Number of tasks currently in each status, indexed as
    /// `[pending, in_progress, completed, cancelled, failed]`.
    pub fn status_counts(&self) -> [usize; 5] {
        let mut counts = [0; 5];
        for t in &self.tasks {
            counts[t.status as usize] += 1;
        }
        counts
    }

    /// One summary per task, ascending id.
    pub fn summary(&self) -> Vec<TaskSummary> {
        let mut per_task: Vec<Vec<Transition>> = vec![Vec::new(); self.tasks.len()];
        for t in &self.log {
            per_task[t.task.index()].push(*t);
        }
        self.tasks
            .iter()
            .zip(per_task)
            .map(|(task, transitions)| TaskSummary {
                task: task.id,
                owner: task.owner,
                kind: task.spec.kind,
                status: task.status,
                transitions,
            })
            .collect()
    }
}
