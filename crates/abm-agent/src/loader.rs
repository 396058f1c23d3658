//! Movement-seed loader.
//!
//! # CSV format
//!
//! One row per observed position of an agent:
//!
//! ```csv
//! agent_id,timestamp,location
//! 7,1700000000,Main:0:Corridor
//! 7,1700000600,Main:0:Ward A
//! 3,1700000000,Main:1:Staff Room
//! ```
//!
//! `timestamp` is Unix seconds; `location` is a `"Building:level:Room"`
//! reference resolved against the `Space`.  An optional `agent_type` column
//! (`generic`, `patient`, `healthcare_worker`) overrides the default type.
//!
//! Per agent, rows are taken in timestamp order:
//!
//! - the first row places the agent inside its room, at a point drawn from
//!   the agent's own [`AgentRng`] (so placement is reproducible per seed);
//! - every later row becomes a `GotoLocation` task starting at the tick that
//!   contains its timestamp.
//!
//! Agents are returned in ascending id order.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use abm_core::{AgentId, AgentRng, Location, RoomId, SimClock, ValidationError};
use abm_spatial::Space;
use abm_task::{Priority, TaskSpec, TaskType};

use crate::agent::{Agent, AgentType};
use crate::{AgentError, AgentResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct MovementRecord {
    agent_id:   u32,
    timestamp:  i64,
    location:   String,
    #[serde(default)]
    agent_type: Option<AgentType>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parameters applied to every seeded agent and task.
#[derive(Clone, Debug, PartialEq)]
pub struct SeedDefaults {
    pub kind:        AgentType,
    /// Metres per simulated second.
    pub speed:       f64,
    pub priority:    Priority,
    pub dwell_ticks: u64,
    /// Global RNG seed for placement jitter.
    pub seed:        u64,
}

impl Default for SeedDefaults {
    fn default() -> Self {
        Self {
            kind:        AgentType::HealthcareWorker,
            speed:       1.4,
            priority:    Priority::MEDIUM,
            dwell_ticks: 0,
            seed:        0,
        }
    }
}

/// An agent ready to hand to the simulation builder, with its initial tasks.
#[derive(Clone, Debug)]
pub struct SeededAgent {
    pub agent: Agent,
    pub tasks: Vec<TaskSpec>,
}

/// Load seeded agents from a movement CSV file.
pub fn load_movement_csv(
    path:     &Path,
    space:    &Space,
    clock:    &SimClock,
    defaults: &SeedDefaults,
) -> AgentResult<Vec<SeededAgent>> {
    let file = std::fs::File::open(path)?;
    load_movement_reader(file, space, clock, defaults)
}

/// Like [`load_movement_csv`] but accepts any `Read` source.
pub fn load_movement_reader<R: Read>(
    reader:   R,
    space:    &Space,
    clock:    &SimClock,
    defaults: &SeedDefaults,
) -> AgentResult<Vec<SeededAgent>> {
    // ── Parse CSV rows ────────────────────────────────────────────────────
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut by_agent: BTreeMap<u32, Vec<MovementRecord>> = BTreeMap::new();

    for result in csv_reader.deserialize::<MovementRecord>() {
        let row = result.map_err(|e| AgentError::Parse(e.to_string()))?;
        by_agent.entry(row.agent_id).or_default().push(row);
    }

    // ── Build one agent per id ────────────────────────────────────────────
    let mut seeded = Vec::with_capacity(by_agent.len());
    let mut task_count = 0;

    for (raw_id, mut rows) in by_agent {
        rows.sort_by_key(|r| r.timestamp);
        let id = AgentId(raw_id);
        let mut rows = rows.into_iter();
        let Some(first) = rows.next() else { continue };

        let room_id = resolve(space, &first.location)?;
        let room = space.room(room_id).ok_or(ValidationError::UnknownRoom(room_id))?;
        let mut rng = AgentRng::new(defaults.seed, id);
        let half = room.half_extent();
        let location = Location::new(
            room.centre.x + rng.jitter(half),
            room.centre.y + rng.jitter(half),
            room.centre.floor,
        );
        let heading = rng.gen_range(0.0..360.0);
        let kind = first.agent_type.unwrap_or(defaults.kind);
        let agent = Agent::new(id, kind, room_id, location, defaults.speed).with_heading(heading);
        agent.validate()?;

        let tasks = rows
            .map(|row| {
                let target = resolve(space, &row.location)?;
                let start = clock.tick_at_unix_secs(row.timestamp).ok_or_else(|| {
                    ValidationError::Config(format!(
                        "agent {id}: timestamp {} precedes the simulation start",
                        row.timestamp
                    ))
                })?;
                Ok(TaskSpec::new(TaskType::GotoLocation, target)
                    .with_priority(defaults.priority)
                    .starting_at(start)
                    .with_dwell(defaults.dwell_ticks))
            })
            .collect::<AgentResult<Vec<_>>>()?;

        task_count += tasks.len();
        seeded.push(SeededAgent { agent, tasks });
    }

    info!(agents = seeded.len(), tasks = task_count, "movement data loaded");
    Ok(seeded)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn resolve(space: &Space, reference: &str) -> AgentResult<RoomId> {
    space
        .resolve(reference)
        .ok_or_else(|| ValidationError::UnknownRoomName(reference.to_owned()).into())
}
