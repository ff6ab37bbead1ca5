//! Local task state for the timer client.
//!
//! [`board::TaskBoard`] mirrors the store's task list and owns the running
//! set and the ticker. [`sync`] moves board mutations to the store in the
//! background and reports the results back as events.

pub mod board;
pub mod sync;

pub use board::{BoardTask, SyncState, TaskBoard};
pub use sync::{SyncCommand, SyncEvent, spawn_sync};

use tasktimer_proto::ValidationError;
use thiserror::Error;

/// Errors that can occur during local task operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task name is blank after trimming.
    #[error("Nome da tarefa é obrigatório")]
    NameEmpty,
    /// Task name exceeds the maximum length.
    #[error("Nome da tarefa muito longo (máximo 256 caracteres)")]
    NameTooLong,
    /// Task with the given ID was not found on the board.
    #[error("Tarefa não encontrada: {0}")]
    TaskNotFound(String),
}

impl From<ValidationError> for TaskError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::NameTooLong => Self::NameTooLong,
            // Names are the only thing validated on the board.
            _ => Self::NameEmpty,
        }
    }
}
