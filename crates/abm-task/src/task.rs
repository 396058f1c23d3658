//! Core task types: `TaskType`, `Priority`, `TaskStatus`, `TaskSpec`, `Task`.
//!
//! # Priority scale
//!
//! `Priority(0)` is the most urgent; larger values are less urgent.  Queues
//! are ordered by the key `(priority, start_tick, id)`, which is a total
//! order because task ids are unique, so identical inputs always produce
//! identical schedules.
//!
//! # Time window
//!
//! A task becomes *due* at `start_tick`.  With a `deadline`, it is *overdue*
//! once `deadline < now`, or immediately if it is still Pending and its
//! deadline lies before its own start (it can never be met).

use std::fmt;

use abm_core::{AgentId, RoomId, TaskId, Tick};

// ── TaskType ──────────────────────────────────────────────────────────────────

/// What kind of work a task represents.
///
/// The engine treats every type the same way (go to the target room, stay
/// for the dwell time); the type is carried through to outputs so analyses
/// can separate e.g. patient contact from office time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TaskType {
    #[default]
    Generic,
    AttendPatient,
    NurseRound,
    AttendBell,
    TakeBreak,
    Clean,
    OfficeWork,
    Workstation,
    GotoLocation,
    StayInRoom,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Generic       => "generic",
            TaskType::AttendPatient => "attend_patient",
            TaskType::NurseRound    => "nurse_round",
            TaskType::AttendBell    => "attend_bell",
            TaskType::TakeBreak     => "take_break",
            TaskType::Clean         => "clean",
            TaskType::OfficeWork    => "office_work",
            TaskType::Workstation   => "workstation",
            TaskType::GotoLocation  => "goto_location",
            TaskType::StayInRoom    => "stay_in_room",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Priority ──────────────────────────────────────────────────────────────────

/// Task urgency.  **Lower value = more urgent.**
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Priority(pub u32);

impl Priority {
    pub const URGENT: Priority = Priority(0);
    pub const HIGH:   Priority = Priority(1);
    pub const MEDIUM: Priority = Priority(2);
    pub const LOW:    Priority = Priority(3);

    /// `true` if `self` should be served before `other`.
    #[inline]
    pub fn is_more_urgent_than(self, other: Priority) -> bool {
        self.0 < other.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::MEDIUM
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

// ── TaskStatus ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Failed,
}

impl TaskStatus {
    /// Completed, Cancelled, and Failed are final.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled | TaskStatus::Failed)
    }

    /// Pending or InProgress.
    #[inline]
    pub fn is_live(self) -> bool {
        !self.is_terminal()
    }

    /// Whether the state machine allows `self → to`.
    pub fn can_transition_to(self, to: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, to),
            (Pending, InProgress)
                | (Pending, Cancelled)
                | (Pending, Failed)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
                | (InProgress, Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending    => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed  => "completed",
            TaskStatus::Cancelled  => "cancelled",
            TaskStatus::Failed     => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── TaskSpec ──────────────────────────────────────────────────────────────────

/// Everything needed to create a task, before it has an id or an owner.
///
/// ```
/// use abm_core::{RoomId, Tick};
/// use abm_task::{Priority, TaskSpec, TaskType};
///
/// let spec = TaskSpec::new(TaskType::AttendPatient, RoomId(3))
///     .with_priority(Priority::HIGH)
///     .starting_at(Tick(10))
///     .due_by(Tick(40))
///     .with_dwell(5);
/// assert_eq!(spec.deadline, Some(Tick(40)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskSpec {
    pub kind:        TaskType,
    pub target:      RoomId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority:    Priority,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_tick:  Tick,
    #[cfg_attr(feature = "serde", serde(default))]
    pub deadline:    Option<Tick>,
    /// Ticks the agent must spend performing the task once it has arrived.
    #[cfg_attr(feature = "serde", serde(default))]
    pub dwell_ticks: u64,
}

impl TaskSpec {
    pub fn new(kind: TaskType, target: RoomId) -> Self {
        Self {
            kind,
            target,
            priority: Priority::default(),
            start_tick: Tick::ZERO,
            deadline: None,
            dwell_ticks: 0,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn starting_at(mut self, tick: Tick) -> Self {
        self.start_tick = tick;
        self
    }

    pub fn due_by(mut self, deadline: Tick) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_dwell(mut self, ticks: u64) -> Self {
        self.dwell_ticks = ticks;
        self
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// A task registered with a [`TaskRegistry`](crate::TaskRegistry).
///
/// Fields are read-only outside this crate; every mutation goes through the
/// registry so the state machine cannot be bypassed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Task {
    pub(crate) id:              TaskId,
    pub(crate) spec:            TaskSpec,
    pub(crate) status:          TaskStatus,
    pub(crate) owner:           Option<AgentId>,
    /// Ticks of performance accumulated while InProgress.
    pub(crate) performed_ticks: u64,
    pub(crate) started_at:      Option<Tick>,
    pub(crate) finished_at:     Option<Tick>,
}

impl Task {
    pub(crate) fn new(id: TaskId, spec: TaskSpec) -> Self {
        Self {
            id,
            spec,
            status: TaskStatus::Pending,
            owner: None,
            performed_ticks: 0,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn id(&self) -> TaskId { self.id }
    pub fn spec(&self) -> &TaskSpec { &self.spec }
    pub fn kind(&self) -> TaskType { self.spec.kind }
    pub fn target(&self) -> RoomId { self.spec.target }
    pub fn priority(&self) -> Priority { self.spec.priority }
    pub fn start_tick(&self) -> Tick { self.spec.start_tick }
    pub fn deadline(&self) -> Option<Tick> { self.spec.deadline }
    pub fn dwell_ticks(&self) -> u64 { self.spec.dwell_ticks }
    pub fn status(&self) -> TaskStatus { self.status }
    pub fn owner(&self) -> Option<AgentId> { self.owner }
    pub fn performed_ticks(&self) -> u64 { self.performed_ticks }
    pub fn started_at(&self) -> Option<Tick> { self.started_at }
    pub fn finished_at(&self) -> Option<Tick> { self.finished_at }

    /// Queue ordering key: `(priority, start_tick, id)`.
    #[inline]
    pub fn queue_key(&self) -> (Priority, Tick, TaskId) {
        (self.spec.priority, self.spec.start_tick, self.id)
    }

    /// The start tick has arrived.
    #[inline]
    pub fn is_due(&self, now: Tick) -> bool {
        self.spec.start_tick <= now
    }

    /// The deadline can no longer be met at `now`.
    pub fn is_overdue(&self, now: Tick) -> bool {
        match self.spec.deadline {
            None => false,
            Some(deadline) => {
                deadline < now
                    || (self.status == TaskStatus::Pending && deadline < self.spec.start_tick)
            }
        }
    }

    /// Live, due, and not overdue.
    pub fn is_actionable(&self, now: Tick) -> bool {
        self.status.is_live() && self.is_due(now) && !self.is_overdue(now)
    }
}
