//! Plain data row types written by output backends, and their conversion
//! from the engine's snapshot types.

use abm_sim::{AgentSnapshot, TickStats};
use abm_task::TaskSummary;

/// One agent at one snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshotRow {
    pub tick:        u64,
    pub agent_id:    u32,
    pub room_id:     u32,
    pub x:           f64,
    pub y:           f64,
    pub floor:       i32,
    pub activity:    &'static str,
    /// Task the agent held (or finished) this tick.
    pub task_id:     Option<u32>,
    pub task_status: Option<&'static str>,
}

impl AgentSnapshotRow {
    pub fn from_snapshot(tick: u64, agent: &AgentSnapshot) -> Self {
        Self {
            tick,
            agent_id:    agent.agent.0,
            room_id:     agent.room.0,
            x:           agent.location.x,
            y:           agent.location.y,
            floor:       agent.location.floor,
            activity:    agent.activity.as_str(),
            task_id:     agent.task.map(|(t, _)| t.0),
            task_status: agent.task.map(|(_, s)| s.as_str()),
        }
    }
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:             u64,
    pub unix_time_secs:   i64,
    pub moving:           u64,
    pub performing:       u64,
    pub idle:             u64,
    pub failed_this_tick: u64,
}

impl From<&TickStats> for TickSummaryRow {
    fn from(stats: &TickStats) -> Self {
        Self {
            tick:             stats.tick.0,
            unix_time_secs:   stats.unix_time_secs,
            moving:           stats.moving as u64,
            performing:       stats.performing as u64,
            idle:             stats.idle as u64,
            failed_this_tick: stats.failed_this_tick as u64,
        }
    }
}

/// One accepted transition of one task.
///
/// A task that never left `Pending` is written as a single row with the
/// transition columns empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummaryRow {
    pub task_id:         u32,
    pub agent_id:        Option<u32>,
    pub task_type:       &'static str,
    /// Final status of the task.
    pub status:          &'static str,
    pub transition_tick: Option<u64>,
    pub from:            Option<&'static str>,
    pub to:              Option<&'static str>,
}

impl TaskSummaryRow {
    /// Expand one summary into its rows, oldest transition first.
    pub fn from_summary(summary: &TaskSummary) -> Vec<Self> {
        let base = Self {
            task_id:         summary.task.0,
            agent_id:        summary.owner.map(|a| a.0),
            task_type:       summary.kind.as_str(),
            status:          summary.status.as_str(),
            transition_tick: None,
            from:            None,
            to:              None,
        };
        if summary.transitions.is_empty() {
            return vec![base];
        }
        summary
            .transitions
            .iter()
            .map(|t| Self {
                transition_tick: Some(t.at.0),
                from:            Some(t.from.as_str()),
                to:              Some(t.to.as_str()),
                ..base
            })
            .collect()
    }
}
