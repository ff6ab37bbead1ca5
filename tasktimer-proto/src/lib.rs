//! Shared task model and wire definitions for `tasktimer`.

pub mod api;
pub mod task;

pub use task::{
    Category, MAX_TASK_NAME_LENGTH, Task, TaskId, TaskPatch, ValidationError, validate_name,
};
