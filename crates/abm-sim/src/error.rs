use thiserror::Error;

use abm_agent::AgentError;
use abm_core::ValidationError;
use abm_spatial::SpatialError;
use abm_task::TaskError;

#[derive(Debug, Error)]
pub enum SimError {
    /// Setup-time problem; the engine never reaches `Running`.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("spatial error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("task error: {0}")]
    Task(#[from] TaskError),

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("simulation configuration error: {0}")]
    Config(String),

    /// The engine reached `Completed`; a new run needs a new `Sim`.
    #[error("simulation already completed")]
    AlreadyCompleted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
