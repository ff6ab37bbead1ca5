//! Access to the task store.
//!
//! Defines the [`TaskApi`] trait that every store client must satisfy.
//! Concrete implementations:
//! - [`http::HttpTaskApi`]: talks to `tasktimer-server` over HTTP
//! - [`memory::InMemoryTaskApi`]: in-process store for offline use and tests

pub mod http;
pub mod memory;

use std::future::Future;

use tasktimer_proto::{Category, Task, TaskId, TaskPatch};

/// Errors that can occur while talking to the task store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The store answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the error body.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns `true` if the store could not be reached at all.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Returns `true` if the store reported an unknown task.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Async client for the four store operations.
///
/// Implementations must be usable from a spawned tokio task, so every
/// returned future is `Send`.
pub trait TaskApi: Send + Sync {
    /// Fetch every task in insertion order.
    fn list(&self) -> impl Future<Output = Result<Vec<Task>, ApiError>> + Send;

    /// Create a task and return the stored record.
    fn create(
        &self,
        name: &str,
        category: Category,
    ) -> impl Future<Output = Result<Task, ApiError>> + Send;

    /// Apply a patch and return the updated record.
    fn update(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> impl Future<Output = Result<Task, ApiError>> + Send;

    /// Remove a task.
    fn delete(&self, id: &TaskId) -> impl Future<Output = Result<(), ApiError>> + Send;
}
