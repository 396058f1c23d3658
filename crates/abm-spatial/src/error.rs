//! Spatial-subsystem error type.

use thiserror::Error;

use abm_core::{Location, RoomId, ValidationError};

/// Errors produced by `abm-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// Structural problem detected while building the Space.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No sequence of doors leads from `from` to `to`.
    #[error("no path from {from} to {to}")]
    Unreachable { from: RoomId, to: RoomId },

    /// A location that cannot be matched to any room.
    #[error("location {0} is not inside any room")]
    OutsideSpace(Location),

    #[error("layout error: {0}")]
    Layout(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpatialError {
    /// `true` for setup-time structural errors, which are fatal to a run.
    pub fn is_validation(&self) -> bool {
        matches!(self, SpatialError::Validation(_) | SpatialError::Layout(_))
    }
}

pub type SpatialResult<T> = Result<T, SpatialError>;
