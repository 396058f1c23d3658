//! Per-agent state.

use std::fmt;

use serde::{Deserialize, Serialize};

use abm_core::{AgentId, Location, RoomId, TaskId, ValidationError, ValidationResult};

use crate::movement::Route;

/// What kind of entity an agent represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    #[default]
    Generic,
    Patient,
    HealthcareWorker,
}

impl AgentType {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentType::Generic          => "generic",
            AgentType::Patient          => "patient",
            AgentType::HealthcareWorker => "healthcare_worker",
        }
    }
}

/// An agent's momentary mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Activity {
    #[default]
    Idle,
    Moving,
    Performing,
}

impl Activity {
    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Idle       => "idle",
            Activity::Moving     => "moving",
            Activity::Performing => "performing",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A moving entity inside the `Space`.
///
/// `room` is the room the agent is in, or the room it last left while
/// walking a leg between two connected rooms.
#[derive(Clone, Debug)]
pub struct Agent {
    pub id:           AgentId,
    pub kind:         AgentType,
    pub room:         RoomId,
    pub location:     Location,
    /// Metres per simulated second.
    pub speed:        f64,
    /// Direction of travel in degrees, `[0, 360)`, counter-clockwise from +x.
    pub heading:      f64,
    pub activity:     Activity,
    pub current_task: Option<TaskId>,
    pub route:        Option<Route>,
}

impl Agent {
    /// A new Idle agent standing at `location` in `room`.
    pub fn new(id: AgentId, kind: AgentType, room: RoomId, location: Location, speed: f64) -> Self {
        Self {
            id,
            kind,
            room,
            location,
            speed,
            heading: 0.0,
            activity: Activity::Idle,
            current_task: None,
            route: None,
        }
    }

    pub fn with_heading(mut self, degrees: f64) -> Self {
        self.heading = normalise_heading(degrees);
        self
    }

    /// Speed must be positive and finite.
    pub fn validate(&self) -> ValidationResult<()> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(ValidationError::InvalidSpeed { agent: self.id, speed: self.speed });
        }
        Ok(())
    }

    /// Distance this agent covers in one tick.
    #[inline]
    pub fn budget_per_tick(&self, tick_duration_secs: u32) -> f64 {
        self.speed * tick_duration_secs as f64
    }

    /// Return to Idle with no task and no route.
    pub fn go_idle(&mut self) {
        self.activity = Activity::Idle;
        self.current_task = None;
        self.route = None;
    }

    pub fn is_idle(&self) -> bool {
        self.activity == Activity::Idle
    }
}

pub(crate) fn normalise_heading(degrees: f64) -> f64 {
    if degrees.is_finite() { degrees.rem_euclid(360.0) } else { 0.0 }
}
