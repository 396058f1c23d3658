//! `abm-agent` — the Agent Model: agent state, movement along door paths,
//! and the per-tick update that selects, travels to, and performs tasks.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`agent`]    | `Agent`, `AgentType`, `Activity`                             |
//! | [`movement`] | `Route`, `Leg` — waypoint travel with budget carry-over      |
//! | [`update`]   | `StepContext`, `StepOutcome`, `update` — one agent, one tick |
//! | [`loader`]   | `load_movement_csv`, `load_movement_reader`, `SeededAgent`   |
//! | [`error`]    | `AgentError`, `AgentResult<T>`                               |
//!
//! # Per-tick update (summary)
//!
//! ```text
//! current task failed/cancelled elsewhere → drop it, go Idle
//! Moving      → route finished? arrive (task InProgress) : advance by speed × tick
//! Performing  → one more tick of dwell; Completed → Idle
//! Idle        → next_actionable? in target room → arrive
//!                                else route → Moving (or task Failed if unreachable)
//! ```
//!
//! The update reads the `Space` and mutates only the agent and, through its
//! contract methods, the `TaskRegistry`.

pub mod agent;
pub mod error;
pub mod loader;
pub mod movement;
pub mod update;

#[cfg(test)]
mod tests;

pub use agent::{Activity, Agent, AgentType};
pub use error::{AgentError, AgentResult};
pub use loader::{load_movement_csv, load_movement_reader, SeedDefaults, SeededAgent};
pub use movement::{Leg, Route};
pub use update::{update, StepContext, StepOutcome};
