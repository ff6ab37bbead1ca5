//! In-process [`TaskApi`] implementation.
//!
//! Follows the same contract as the HTTP store (validation, 404 on unknown
//! ids, insertion order) without any I/O. Used by `--offline` mode and by
//! tests. [`InMemoryTaskApi::set_unreachable`] simulates a network outage.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use parking_lot::Mutex;
use tasktimer_proto::{Category, Task, TaskId, TaskPatch};

use super::{ApiError, TaskApi};

/// Shared in-memory task collection. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskApi {
    tasks: Arc<Mutex<Vec<Task>>>,
    unreachable: Arc<AtomicBool>,
}

impl InMemoryTaskApi {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(tasks)),
            unreachable: Arc::default(),
        }
    }

    /// Makes every subsequent call fail with [`ApiError::Network`].
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Copy of the stored records.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    fn check_reachable(&self) -> Result<(), ApiError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ApiError::Network("store unreachable".to_string()));
        }
        Ok(())
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Tarefa não encontrada".to_string(),
    }
}

fn bad_request(message: String) -> ApiError {
    ApiError::Status {
        status: 400,
        message,
    }
}

impl TaskApi for InMemoryTaskApi {
    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        self.check_reachable()?;
        Ok(self.snapshot())
    }

    async fn create(&self, name: &str, category: Category) -> Result<Task, ApiError> {
        self.check_reachable()?;
        let mut tasks = self.tasks.lock();
        let mut id = TaskId::new();
        while tasks.iter().any(|t| t.id == id) {
            id = TaskId::new();
        }
        let task = Task::new(id, name, category, Some(Utc::now()))
            .map_err(|e| bad_request(e.to_string()))?;
        tasks.push(task.clone());
        drop(tasks);
        Ok(task)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        self.check_reachable()?;
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(not_found)?;
        task.apply_patch(patch)
            .map_err(|e| bad_request(e.to_string()))?;
        Ok(task.clone())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), ApiError> {
        self.check_reachable()?;
        let mut tasks = self.tasks.lock();
        let before = tasks.len();
        tasks.retain(|t| &t.id != id);
        if tasks.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}
