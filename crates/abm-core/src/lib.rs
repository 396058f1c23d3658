//! `abm-core` — foundational types for the hospital agent-based simulation.
//!
//! This crate is a dependency of every other `abm-*` crate.  It has no
//! `abm-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                      |
//! |-----------------|---------------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `TaskId`, `BuildingId`, `FloorId`, `RoomId`, `DoorId`, `ComponentId` |
//! | [`geo`]         | `Location`, planar distance and interpolation                 |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                               |
//! | [`rng`]         | `AgentRng` (per-agent deterministic RNG)                      |
//! | [`error`]       | `ValidationError`, `ValidationResult`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by `abm-sim` for configuration loading.           |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{ValidationError, ValidationResult};
pub use geo::Location;
pub use ids::{AgentId, BuildingId, ComponentId, DoorId, FloorId, RoomId, TaskId};
pub use rng::AgentRng;
pub use time::{SimClock, SimConfig, Tick};
