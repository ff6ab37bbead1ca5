//! JSON request and response bodies of the task HTTP endpoints.
//!
//! | Operation | Method | Request | Response |
//! |---|---|---|---|
//! | List | `GET` | none | [`ListResponse`] |
//! | Create | `POST` | [`CreateRequest`] | [`TaskResponse`] |
//! | Update | `PUT` | [`UpdateRequest`] | [`TaskResponse`] |
//! | Delete | `DELETE` | [`DeleteQuery`] | [`DeleteResponse`] |
//!
//! Every failure carries an [`ErrorBody`].

use serde::{Deserialize, Serialize};

use crate::task::{Category, Task, TaskId, TaskPatch};

/// Path of the task collection endpoint.
pub const TASKS_PATH: &str = "/api/tasks";

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// `GET` response: every persisted task in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    /// All tasks.
    pub tasks: Vec<Task>,
}

/// `POST` body. Both fields are optional on the wire so a missing one is
/// reported as a validation error rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    /// Task name.
    #[serde(default)]
    pub name: Option<String>,
    /// Task category.
    #[serde(default)]
    pub category: Option<Category>,
}

/// `POST` / `PUT` response carrying a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// The created or updated task.
    pub task: Task,
}

/// `PUT` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Target task.
    #[serde(default)]
    pub id: Option<TaskId>,
    /// Fields to change.
    #[serde(default)]
    pub updates: TaskPatch,
}

/// `DELETE` query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteQuery {
    /// Target task.
    #[serde(default)]
    pub id: Option<String>,
}

/// `DELETE` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Always `true` on success.
    pub success: bool,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable, localized message.
    pub error: String,
}
