//! The per-tick agent update.

use tracing::{debug, trace};

use abm_core::{TaskId, Tick};
use abm_spatial::{Router, Space, SpatialError};
use abm_task::{TaskRegistry, TaskStatus};

use crate::agent::{normalise_heading, Activity, Agent};
use crate::movement::Route;
use crate::AgentResult;

/// Read-only world state shared by every agent update in one tick.
pub struct StepContext<'a, R: Router> {
    pub space:              &'a Space,
    pub router:             &'a R,
    pub now:                Tick,
    pub tick_duration_secs: u32,
}

/// What an agent did during one update.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// No actionable task.
    Idle,
    /// Walking towards the task's target room.
    Moving { task: TaskId },
    /// Arrived this tick; the task is now InProgress.
    Started { task: TaskId },
    /// Another tick of dwell at the target.
    Performing { task: TaskId },
    /// The task reached its dwell time and completed.
    Completed { task: TaskId },
    /// The target could not be reached or the deadline passed; the task was
    /// marked Failed.
    Failed { task: TaskId },
}

/// Advance `agent` by one tick.
///
/// Reads the `Space` through `ctx`, mutates only `agent`, and changes task
/// state only through `registry`'s contract methods.  An unreachable target
/// fails the task and leaves the agent Idle; it is not an error.
pub fn update<R: Router>(
    agent:    &mut Agent,
    ctx:      &StepContext<'_, R>,
    registry: &mut TaskRegistry,
) -> AgentResult<StepOutcome> {
    drop_dead_task(agent, registry);
    if let Some(task) = agent.current_task {
        if registry.fail_if_overdue(task, ctx.now)? {
            debug!(agent = %agent.id, %task, now = %ctx.now, "deadline passed, abandoning task");
            agent.go_idle();
            return Ok(StepOutcome::Failed { task });
        }
    }

    match (agent.activity, agent.current_task) {
        (Activity::Moving, Some(task)) => {
            if agent.route.as_ref().is_none_or(Route::is_finished) {
                return arrive(agent, task, ctx.now, registry);
            }
            walk(agent, ctx.tick_duration_secs);
            Ok(StepOutcome::Moving { task })
        }
        (Activity::Performing, Some(task)) => {
            match registry.perform(task, ctx.now)? {
                TaskStatus::Completed => {
                    debug!(agent = %agent.id, %task, now = %ctx.now, "task completed");
                    agent.go_idle();
                    Ok(StepOutcome::Completed { task })
                }
                TaskStatus::Failed => {
                    agent.go_idle();
                    Ok(StepOutcome::Failed { task })
                }
                _ => Ok(StepOutcome::Performing { task }),
            }
        }
        _ => {
            agent.go_idle();
            select(agent, ctx, registry)
        }
    }
}

/// A task failed or cancelled by someone else (deadline sweep, removal) is
/// abandoned before anything else happens this tick.
fn drop_dead_task(agent: &mut Agent, registry: &TaskRegistry) {
    let Some(task) = agent.current_task else { return };
    let still_ours = registry
        .get(task)
        .is_some_and(|t| t.status().is_live() && t.owner() == Some(agent.id));
    if !still_ours {
        debug!(agent = %agent.id, %task, "dropping task that is no longer live");
        agent.go_idle();
    }
}

fn select<R: Router>(
    agent:    &mut Agent,
    ctx:      &StepContext<'_, R>,
    registry: &mut TaskRegistry,
) -> AgentResult<StepOutcome> {
    let Some(task) = registry.next_actionable(agent.id, ctx.now) else {
        return Ok(StepOutcome::Idle);
    };
    let target = match registry.get(task) {
        Some(t) => t.target(),
        None => return Ok(StepOutcome::Idle),
    };
    agent.current_task = Some(task);

    if agent.room == target {
        return arrive(agent, task, ctx.now, registry);
    }

    let path = match ctx.router.route(ctx.space, agent.room, target) {
        Ok(path) => path,
        Err(SpatialError::Unreachable { from, to }) => {
            debug!(agent = %agent.id, %task, %from, %to, "target unreachable, failing task");
            registry.fail(task, ctx.now)?;
            agent.go_idle();
            return Ok(StepOutcome::Failed { task });
        }
        Err(e) => return Err(e.into()),
    };

    agent.route = Some(Route::plan(ctx.space, &path, agent.location)?);
    agent.activity = Activity::Moving;
    walk(agent, ctx.tick_duration_secs);
    Ok(StepOutcome::Moving { task })
}

/// Spend one tick of movement budget on the agent's route.
fn walk(agent: &mut Agent, tick_duration_secs: u32) {
    let budget = agent.budget_per_tick(tick_duration_secs);
    let Some(route) = agent.route.as_mut() else { return };
    let before = agent.location;
    let (location, room) = route.advance(budget);

    if location.floor == before.floor {
        let (dx, dy) = (location.x - before.x, location.y - before.y);
        if dx != 0.0 || dy != 0.0 {
            agent.heading = normalise_heading(dy.atan2(dx).to_degrees());
        }
    }
    agent.location = location;
    agent.room = room;
    trace!(agent = %agent.id, %location, %room, remaining = route.remaining(), "walked");
}

/// The agent stands in the task's target room.
fn arrive(
    agent:    &mut Agent,
    task:     TaskId,
    now:      Tick,
    registry: &mut TaskRegistry,
) -> AgentResult<StepOutcome> {
    agent.route = None;
    let status = match registry.get(task).map(|t| t.status()) {
        Some(TaskStatus::Pending) => registry.begin(task, now)?,
        Some(status) => status,
        None => TaskStatus::Cancelled,
    };
    match status {
        TaskStatus::InProgress => {
            agent.activity = Activity::Performing;
            Ok(StepOutcome::Started { task })
        }
        TaskStatus::Completed => {
            debug!(agent = %agent.id, %task, %now, "task completed on arrival");
            agent.go_idle();
            Ok(StepOutcome::Completed { task })
        }
        TaskStatus::Failed => {
            agent.go_idle();
            Ok(StepOutcome::Failed { task })
        }
        _ => {
            agent.go_idle();
            Ok(StepOutcome::Idle)
        }
    }
}
