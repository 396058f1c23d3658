//! `abm-task` — the Task Registry: units of work, per-agent priority queues,
//! and the task status state machine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`task`]      | `Task`, `TaskSpec`, `TaskType`, `Priority`, `TaskStatus`  |
//! | [`registry`]  | `TaskRegistry`, `Transition`, `TaskSummary`               |
//! | [`error`]     | `TaskError`, `TaskResult<T>`                              |
//!
//! # Lifecycle (summary)
//!
//! ```text
//! Pending ──► InProgress ──► Completed
//!    │             │
//!    ├──► Cancelled ◄┤
//!    └──► Failed  ◄──┘
//! ```
//!
//! Every change of status goes through [`TaskRegistry::transition`], which
//! rejects anything not drawn above and appends accepted changes to the
//! registry's transition log.

pub mod error;
pub mod registry;
pub mod task;


pub use error::{TaskError, TaskResult};
pub use registry::{TaskRegistry, TaskSummary, Transition};
pub use task::{Priority, Task, TaskSpec, TaskStatus, TaskType};
