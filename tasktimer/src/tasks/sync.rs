//! Background worker that carries board mutations to the task store.
//!
//! The TUI loop never awaits the network. It sends [`SyncCommand`]s to a
//! spawned tokio task and applies the [`SyncEvent`]s that come back on its
//! next turn:
//!
//! ```text
//! TUI loop  ── SyncCommand ──→  sync worker ──→ TaskApi
//!           ←── SyncEvent ───
//! ```
//!
//! Commands are processed one at a time in arrival order, so a flush of stop
//! patches reaches the store before a list issued after it. Nothing is
//! retried here.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tasktimer_proto::{Category, Task, TaskId, TaskPatch};

use crate::api::{ApiError, TaskApi};

/// Commands sent from the TUI loop to the sync worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Fetch the full task list.
    Load,
    /// Create a task for a pending local record.
    Create {
        /// Id of the local record awaiting confirmation.
        local_id: TaskId,
        /// Task name.
        name: String,
        /// Task category.
        category: Category,
    },
    /// Apply a patch to a stored task.
    Update {
        /// Stored task id.
        id: TaskId,
        /// Fields to change.
        patch: TaskPatch,
    },
    /// Remove a stored task.
    Delete {
        /// Stored task id.
        id: TaskId,
    },
    /// Stop the worker after the commands already queued.
    Shutdown,
}

/// Events sent from the sync worker back to the TUI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The store returned its task list.
    Loaded(Vec<Task>),
    /// Listing failed.
    LoadFailed(ApiError),
    /// The store created a task for a pending record.
    Created {
        /// Id of the local record.
        local_id: TaskId,
        /// Record as stored.
        task: Task,
    },
    /// A create request failed.
    CreateFailed {
        /// Id of the local record.
        local_id: TaskId,
        /// What went wrong.
        error: ApiError,
    },
    /// A patch was applied.
    Updated(Task),
    /// A task was removed.
    Deleted(TaskId),
    /// An update or delete failed. The local state is left as is.
    Error {
        /// Task the request was about.
        id: TaskId,
        /// What went wrong.
        error: ApiError,
    },
}

/// Spawns the sync worker over `api`.
///
/// Returns the command sender, the event receiver and the worker handle.
/// The worker exits on [`SyncCommand::Shutdown`], when every command sender
/// is dropped, or when the event receiver is dropped.
pub fn spawn_sync<A>(
    api: A,
    capacity: usize,
) -> (
    mpsc::Sender<SyncCommand>,
    mpsc::Receiver<SyncEvent>,
    JoinHandle<()>,
)
where
    A: TaskApi + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<SyncCommand>(capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<SyncEvent>(capacity);
    let handle = tokio::spawn(async move {
        command_handler(api, cmd_rx, evt_tx).await;
    });
    (cmd_tx, evt_rx, handle)
}

async fn command_handler<A: TaskApi>(
    api: A,
    mut cmd_rx: mpsc::Receiver<SyncCommand>,
    evt_tx: mpsc::Sender<SyncEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let event = match cmd {
            SyncCommand::Load => match api.list().await {
                Ok(tasks) => {
                    tracing::debug!(count = tasks.len(), "task list loaded");
                    SyncEvent::Loaded(tasks)
                }
                Err(error) => {
                    tracing::warn!(error = %error, "task list failed");
                    SyncEvent::LoadFailed(error)
                }
            },
            SyncCommand::Create {
                local_id,
                name,
                category,
            } => match api.create(&name, category).await {
                Ok(task) => {
                    tracing::info!(local_id = %local_id, task_id = %task.id, "task created");
                    SyncEvent::Created { local_id, task }
                }
                Err(error) => {
                    tracing::warn!(local_id = %local_id, error = %error, "task create failed");
                    SyncEvent::CreateFailed { local_id, error }
                }
            },
            SyncCommand::Update { id, patch } => match api.update(&id, &patch).await {
                Ok(task) => SyncEvent::Updated(task),
                Err(error) => {
                    tracing::warn!(task_id = %id, error = %error, "task update failed");
                    SyncEvent::Error { id, error }
                }
            },
            SyncCommand::Delete { id } => match api.delete(&id).await {
                Ok(()) => {
                    tracing::info!(task_id = %id, "task deleted");
                    SyncEvent::Deleted(id)
                }
                Err(error) => {
                    tracing::warn!(task_id = %id, error = %error, "task delete failed");
                    SyncEvent::Error { id, error }
                }
            },
            SyncCommand::Shutdown => {
                tracing::info!("sync worker shutting down");
                break;
            }
        };

        if evt_tx.send(event).await.is_err() {
            // TUI dropped; exit.
            break;
        }
    }
}
