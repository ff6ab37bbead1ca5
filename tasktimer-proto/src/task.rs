//! Task model shared by the store and the client.
//!
//! A [`Task`] is a named stopwatch belonging to one of two [`Category`]
//! values. Records are serialized with camelCase field names, both on disk
//! and on the wire. Mutation goes through [`TaskPatch`], which names the
//! updatable fields explicitly and validates each of them against the
//! current record before anything is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed task name length in characters.
pub const MAX_TASK_NAME_LENGTH: usize = 256;

/// Errors raised while validating task input.
///
/// Messages are user-facing (pt-BR) because the store forwards them verbatim
/// in HTTP error bodies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Name is empty after trimming.
    #[error("Nome da tarefa é obrigatório")]
    NameEmpty,
    /// Name exceeds [`MAX_TASK_NAME_LENGTH`] characters.
    #[error("Nome da tarefa muito longo (máximo 256 caracteres)")]
    NameTooLong,
    /// A nonzero `currentTime` was sent; the store only keeps folded time.
    #[error("currentTime deve ser 0 ao persistir uma tarefa")]
    CurrentTimeNonZero,
    /// `totalTime` would go backwards.
    #[error("totalTime não pode diminuir (atual {current}, recebido {requested})")]
    TotalTimeDecreased {
        /// Stored value.
        current: u64,
        /// Value carried by the patch.
        requested: u64,
    },
}

/// Unique identifier for a task.
///
/// New identifiers are UUID v7 strings, so they sort by creation time.
/// Identifiers read from an existing document are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new time-ordered task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wraps an existing identifier string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The two fixed task categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Creation work ("criação").
    Criacao,
    /// Adjustment work ("ajustes").
    Ajustes,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 2] = [Self::Criacao, Self::Ajustes];

    /// Localized label used in reports and the UI.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Criacao => "Criação",
            Self::Ajustes => "Ajustes",
        }
    }

    /// The other category. Used by the UI selector.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Criacao => Self::Ajustes,
            Self::Ajustes => Self::Criacao,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Criacao => write!(f, "criacao"),
            Self::Ajustes => write!(f, "ajustes"),
        }
    }
}

/// A tracked task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier.
    pub id: TaskId,
    /// Trimmed, non-empty display name.
    pub name: String,
    /// Category the time is booked under.
    pub category: Category,
    /// Seconds accumulated by completed runs.
    pub total_time: u64,
    /// Seconds accumulated by the run in progress. Zero when stopped.
    pub current_time: u64,
    /// Whether the stopwatch is advancing.
    pub is_running: bool,
    /// Creation time. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Builds a zero-initialized task, validating and trimming the name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NameEmpty`] or
    /// [`ValidationError::NameTooLong`] if the name is unusable.
    pub fn new(
        id: TaskId,
        name: &str,
        category: Category,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: validate_name(name)?,
            category,
            total_time: 0,
            current_time: 0,
            is_running: false,
            created_at,
        })
    }

    /// Effective elapsed seconds: `total_time + current_time`.
    #[must_use]
    pub const fn elapsed(&self) -> u64 {
        self.total_time.saturating_add(self.current_time)
    }

    /// Applies a patch after validating every field it carries.
    ///
    /// Either the whole patch is applied or nothing changes.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found in the patch.
    pub fn apply_patch(&mut self, patch: &TaskPatch) -> Result<(), ValidationError> {
        let name = patch.name.as_deref().map(validate_name).transpose()?;
        if let Some(total) = patch.total_time
            && total < self.total_time
        {
            return Err(ValidationError::TotalTimeDecreased {
                current: self.total_time,
                requested: total,
            });
        }
        if patch.current_time.is_some_and(|c| c != 0) {
            return Err(ValidationError::CurrentTimeNonZero);
        }

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(total) = patch.total_time {
            self.total_time = total;
        }
        if let Some(current) = patch.current_time {
            self.current_time = current;
        }
        if let Some(running) = patch.is_running {
            self.is_running = running;
        }
        Ok(())
    }
}

/// Partial update of a task's mutable fields.
///
/// Absent fields are left untouched. Unknown keys are rejected at
/// deserialization time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskPatch {
    /// New name (trimmed, non-empty).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// New total; must not be lower than the stored one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<u64>,
    /// Must be zero when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<u64>,
    /// New running flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_running: Option<bool>,
}

impl TaskPatch {
    /// Patch that renames a task.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Patch pushed when a stopwatch starts.
    #[must_use]
    pub fn start() -> Self {
        Self {
            is_running: Some(true),
            ..Self::default()
        }
    }

    /// Patch pushed when a stopwatch stops, carrying the folded total.
    #[must_use]
    pub fn stop(total_time: u64) -> Self {
        Self {
            total_time: Some(total_time),
            current_time: Some(0),
            is_running: Some(false),
            ..Self::default()
        }
    }

    /// Returns `true` if the patch carries no field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.total_time.is_none()
            && self.current_time.is_none()
            && self.is_running.is_none()
    }
}

/// Trims a task name and checks its length.
///
/// # Errors
///
/// Returns [`ValidationError::NameEmpty`] for blank input and
/// [`ValidationError::NameTooLong`] above [`MAX_TASK_NAME_LENGTH`] characters.
pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::NameEmpty);
    }
    if name.chars().count() > MAX_TASK_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    Ok(name.to_string())
}
