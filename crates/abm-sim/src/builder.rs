//! Fluent builder for constructing a [`Sim`].

use std::collections::BTreeMap;

use tracing::info;

use abm_agent::{Agent, SeededAgent};
use abm_core::{AgentId, SimConfig, ValidationError};
use abm_spatial::{DijkstraRouter, Router, Space};
use abm_task::{TaskRegistry, TaskSpec};

use crate::config::Scenario;
use crate::sim::EngineState;
use crate::{Sim, SimResult};

/// Fluent builder for [`Sim<R>`]; the engine's `Uninitialized` state.
///
/// # Required inputs
///
/// - [`SimConfig`]: tick range, tick duration, seed, output interval
/// - [`Space`]: from [`abm_spatial::SpaceBuilder`] or a layout file
/// - `R: Router`: the routing algorithm (e.g. [`DijkstraRouter`])
///
/// # Optional inputs
///
/// | Method          | Default   |
/// |-----------------|-----------|
/// | `.agent(a)`     | no agents |
/// | `.task(id, t)`  | no tasks  |
/// | `.seeded(v)`    | —         |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, space, DijkstraRouter)
///     .agent(nurse)
///     .task(nurse_id, TaskSpec::new(TaskType::AttendPatient, ward))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: Router = DijkstraRouter> {
    config: SimConfig,
    space:  Space,
    router: R,
    agents: Vec<Agent>,
    tasks:  Vec<(AgentId, TaskSpec)>,
}

impl SimBuilder<DijkstraRouter> {
    /// Builder over a loaded [`Scenario`] with the default router.
    pub fn from_scenario(config: SimConfig, scenario: Scenario) -> Self {
        SimBuilder::new(config, scenario.space, DijkstraRouter).seeded(scenario.agents)
    }
}

impl<R: Router> SimBuilder<R> {
    pub fn new(config: SimConfig, space: Space, router: R) -> Self {
        Self { config, space, router, agents: Vec::new(), tasks: Vec::new() }
    }

    pub fn state(&self) -> EngineState {
        EngineState::Uninitialized
    }

    pub fn agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn agents(mut self, agents: impl IntoIterator<Item = Agent>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Queue `spec` for `agent`.  Tasks are created in the order given.
    pub fn task(mut self, agent: AgentId, spec: TaskSpec) -> Self {
        self.tasks.push((agent, spec));
        self
    }

    /// Add agents together with their initial tasks (e.g. from the
    /// movement-seed loader).
    pub fn seeded(mut self, seeded: Vec<SeededAgent>) -> Self {
        for SeededAgent { agent, tasks } in seeded {
            let id = agent.id;
            self.tasks.extend(tasks.into_iter().map(|t| (id, t)));
            self.agents.push(agent);
        }
        self
    }

    /// Validate every input and return a `Configured` [`Sim`].
    ///
    /// Fails with a `ValidationError` on an invalid config, duplicate agent
    /// ids, invalid speeds, agents in rooms that do not exist, or tasks that
    /// name an unknown agent or target room.
    pub fn build(self) -> SimResult<Sim<R>> {
        self.config.validate()?;

        // ── Agents ────────────────────────────────────────────────────────
        let mut agents = BTreeMap::new();
        for agent in self.agents {
            agent.validate()?;
            let room = self
                .space
                .room(agent.room)
                .ok_or(ValidationError::UnknownRoom(agent.room))?;
            if room.centre.floor != agent.location.floor {
                return Err(ValidationError::FloorMismatch {
                    agent:      agent.id,
                    floor:      agent.location.floor,
                    room:       agent.room,
                    room_floor: room.centre.floor,
                }
                .into());
            }
            let id = agent.id;
            if agents.insert(id, agent).is_some() {
                return Err(ValidationError::DuplicateAgent(id).into());
            }
        }

        // ── Tasks ─────────────────────────────────────────────────────────
        let mut registry = TaskRegistry::new();
        for (agent, spec) in self.tasks {
            if !agents.contains_key(&agent) {
                return Err(ValidationError::UnknownAgent(agent).into());
            }
            if !self.space.contains_room(spec.target) {
                return Err(ValidationError::UnknownRoom(spec.target).into());
            }
            registry.create_for(agent, spec)?;
        }

        info!(
            agents = agents.len(),
            tasks = registry.len(),
            rooms = self.space.room_count(),
            ticks = self.config.total_ticks(),
            "simulation configured"
        );

        Ok(Sim {
            clock:    self.config.make_clock(),
            config:   self.config,
            space:    self.space,
            router:   self.router,
            agents,
            registry,
            state:    EngineState::Configured,
        })
    }
}
