use thiserror::Error;

use abm_core::{AgentId, TaskId, ValidationError};

use crate::TaskStatus;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The task is still live in another agent's queue.
    #[error("task {task} is owned by {owner}, cannot assign to {requested}")]
    Assignment { task: TaskId, owner: AgentId, requested: AgentId },

    #[error("task {task} cannot go from {from} to {to}")]
    InvalidTransition { task: TaskId, from: TaskStatus, to: TaskStatus },

    /// Only Pending tasks may move between queues.
    #[error("task {task} is {status} and cannot be reassigned")]
    NotReassignable { task: TaskId, status: TaskStatus },
}

pub type TaskResult<T> = Result<T, TaskError>;
