//! Setup-time validation error shared by every `abm-*` crate.
//!
//! Structural and configuration problems are detected before a run starts
//! and are fatal: the engine never reaches `Running` with an invalid Space,
//! agent set, or task list.  Sub-crates wrap `ValidationError` as one variant
//! of their own error enums via `#[from]`.

use thiserror::Error;

use crate::{AgentId, BuildingId, DoorId, FloorId, RoomId, TaskId};

/// Malformed or inconsistent spatial, agent, task, or run configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("building {0} does not exist")]
    UnknownBuilding(BuildingId),

    #[error("floor {0} does not exist")]
    UnknownFloor(FloorId),

    #[error("room {0} does not exist")]
    UnknownRoom(RoomId),

    #[error("door {0} does not exist")]
    UnknownDoor(DoorId),

    #[error("agent {0} does not exist")]
    UnknownAgent(AgentId),

    #[error("task {0} does not exist")]
    UnknownTask(TaskId),

    #[error("no room named {0:?}")]
    UnknownRoomName(String),

    #[error("a building named {0:?} already exists")]
    DuplicateBuilding(String),

    #[error("building {building} already has a floor at level {level}")]
    DuplicateFloor { building: BuildingId, level: i32 },

    #[error("floor {floor} already has a room named {name:?}")]
    DuplicateRoom { floor: FloorId, name: String },

    #[error("agent {0} is defined more than once")]
    DuplicateAgent(AgentId),

    #[error("door {door} joins room {room} to itself")]
    SelfLoop { door: DoorId, room: RoomId },

    #[error("door {door} joins rooms {a} and {b} in different buildings")]
    CrossBuildingDoor { door: DoorId, a: RoomId, b: RoomId },

    #[error("door {0} was never attached to a pair of rooms")]
    DetachedDoor(DoorId),

    #[error("door {0} is already attached")]
    AlreadyAttached(DoorId),

    #[error("agent {agent} has invalid speed {speed}")]
    InvalidSpeed { agent: AgentId, speed: f64 },

    #[error("agent {agent} stands on floor {floor} but room {room} is on floor {room_floor}")]
    FloorMismatch { agent: AgentId, floor: i32, room: RoomId, room_floor: i32 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Shorthand result type for setup-time validation.
pub type ValidationResult<T> = Result<T, ValidationError>;
