use thiserror::Error;

use abm_core::ValidationError;
use abm_spatial::SpatialError;
use abm_task::TaskError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("spatial error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("task error: {0}")]
    Task(#[from] TaskError),

    #[error("movement data parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
