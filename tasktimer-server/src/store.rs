//! File-backed task store.
//!
//! The [`TaskStore`] keeps every task in a single JSON document holding an
//! array of records. Each operation reads the whole document, mutates it in
//! memory and replaces the file. The read-modify-write cycle runs under an
//! async mutex so two requests handled by the same process never interleave
//! and lose an update.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tasktimer_proto::{Category, Task, TaskId, TaskPatch, ValidationError};
use tokio::sync::Mutex;

/// Errors returned by [`TaskStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request did not name a task.
    #[error("ID da tarefa é obrigatório")]
    MissingId,

    /// Create was called without a name or a category.
    #[error("Nome e categoria são obrigatórios")]
    MissingFields,

    /// A field failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// No task has the given identifier.
    #[error("Tarefa não encontrada: {0}")]
    NotFound(TaskId),

    /// Reading or writing the document failed.
    #[error("task document I/O failed at {path}: {source}")]
    Io {
        /// Document or temporary file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document exists but is not a JSON array of tasks.
    #[error("task document {path} is corrupt: {source}")]
    Corrupt {
        /// Document path.
        path: PathBuf,
        /// Parse error.
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Returns `true` for errors caused by the caller's input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingId | Self::MissingFields | Self::Invalid(_)
        )
    }

    /// Returns `true` for failures of the underlying storage.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Corrupt { .. })
    }
}

/// Durable mapping from [`TaskId`] to [`Task`] over one JSON file.
pub struct TaskStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TaskStore {
    /// Creates a store backed by `path`. Nothing is touched on disk until
    /// the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns every task in insertion order.
    ///
    /// A missing document is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Corrupt`] if the document
    /// cannot be read.
    pub async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    /// Looks up a single task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or a storage error.
    pub async fn get(&self, id: &TaskId) -> Result<Task, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_all()
            .await?
            .into_iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Creates a zero-initialized task and appends it to the document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] for a blank or overlong name, or a
    /// storage error if the document cannot be read or written.
    pub async fn create(&self, name: &str, category: Category) -> Result<Task, StoreError> {
        let _guard = self.lock.lock().await;
        let mut tasks = self.read_all().await?;

        let mut id = TaskId::new();
        while tasks.iter().any(|t| t.id == id) {
            id = TaskId::new();
        }
        let task = Task::new(id, name, category, Some(Utc::now()))?;

        tasks.push(task.clone());
        self.write_all(&tasks).await?;
        tracing::info!(task_id = %task.id, category = %task.category, "task created");
        Ok(task)
    }

    /// Applies a validated patch to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingId`] for a blank id,
    /// [`StoreError::NotFound`] for an unknown one,
    /// [`StoreError::Invalid`] if the patch fails validation, or a storage
    /// error.
    pub async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        if id.as_str().trim().is_empty() {
            return Err(StoreError::MissingId);
        }
        let _guard = self.lock.lock().await;
        let mut tasks = self.read_all().await?;

        let task = tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        task.apply_patch(patch)?;
        let updated = task.clone();

        self.write_all(&tasks).await?;
        tracing::debug!(task_id = %id, ?patch, "task updated");
        Ok(updated)
    }

    /// Removes a task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingId`] for a blank id,
    /// [`StoreError::NotFound`] if no task has it (including a second delete
    /// of the same id), or a storage error.
    pub async fn delete(&self, id: &TaskId) -> Result<(), StoreError> {
        if id.as_str().trim().is_empty() {
            return Err(StoreError::MissingId);
        }
        let _guard = self.lock.lock().await;
        let mut tasks = self.read_all().await?;

        let before = tasks.len();
        tasks.retain(|t| &t.id != id);
        if tasks.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }

        self.write_all(&tasks).await?;
        tracing::info!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Reads the whole document. Callers must hold the lock.
    async fn read_all(&self) -> Result<Vec<Task>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Replaces the whole document. Callers must hold the lock.
    ///
    /// Writes a sibling temporary file first and renames it over the
    /// document, creating the parent directory if needed.
    async fn write_all(&self, tasks: &[Task]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let json = serde_json::to_string_pretty(tasks).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            source: e,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::Io {
                path: tmp.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Io {
                path: self.path.clone(),
                source: e,
            })
    }
}
