//! Per-tick records handed to observers.

use abm_agent::Activity;
use abm_core::{AgentId, Location, RoomId, TaskId, Tick};
use abm_task::TaskStatus;

/// One agent's state at the end of a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentSnapshot {
    pub agent:    AgentId,
    pub room:     RoomId,
    pub location: Location,
    pub activity: Activity,
    /// The task the agent worked on this tick and its status after the tick,
    /// including a task that completed or failed during it.
    pub task:     Option<(TaskId, TaskStatus)>,
}

/// All agents at the end of `tick`, ascending by agent id.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Snapshot {
    pub tick:   Tick,
    pub agents: Vec<AgentSnapshot>,
}

/// Population counters for one tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct TickStats {
    pub tick:             Tick,
    pub unix_time_secs:   i64,
    pub moving:           usize,
    pub performing:       usize,
    pub idle:             usize,
    /// Tasks that became Failed during this tick (unreachable or overdue).
    pub failed_this_tick: usize,
}
