//! In-memory task board with running set and second ticker.
//!
//! `TaskBoard` holds the client's copy of every task plus the set of ids
//! whose stopwatch is advancing. Membership in that set is the only record
//! of whether a task is running: the `is_running` field of local records is
//! kept `false`, and [`TaskBoard::snapshot`] derives it when a full record
//! is needed.
//!
//! Every mutation that the store has to learn about returns the
//! [`TaskPatch`] to send. The board never performs I/O itself.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tasktimer_proto::{Category, Task, TaskId, TaskPatch, validate_name};

use super::TaskError;

/// Whether a local record is known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// The store holds this record under the same id.
    Synced,
    /// A create request for this record is in flight.
    Pending,
    /// The last create attempt failed to reach the store.
    Offline,
}

/// A task as held by the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTask {
    /// The record. `is_running` is always `false` here.
    pub task: Task,
    /// Store confirmation state.
    pub sync: SyncState,
}

impl BoardTask {
    const fn synced(task: Task) -> Self {
        Self {
            task,
            sync: SyncState::Synced,
        }
    }

    /// Returns `true` if the store knows this record.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        matches!(self.sync, SyncState::Synced)
    }
}

/// Client-side task list and running set.
#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: Vec<BoardTask>,
    running: HashSet<TaskId>,
}

impl TaskBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the board with the store's list.
    ///
    /// Every timer is stopped first and every loaded task starts stopped.
    /// A loaded total never drops below the local one for the same id.
    /// Records the store has not confirmed yet are kept after the loaded
    /// ones. Returns the stop patches for tasks that were running, which
    /// the caller must still send.
    pub fn load(&mut self, tasks: Vec<Task>) -> Vec<(TaskId, TaskPatch)> {
        let stopped = self.stop_all();
        let mut local_totals: HashMap<TaskId, u64> = HashMap::new();
        let mut unconfirmed = Vec::new();
        for record in self.tasks.drain(..) {
            if record.is_persisted() {
                local_totals.insert(record.task.id, record.task.total_time);
            } else {
                unconfirmed.push(record);
            }
        }

        self.tasks = tasks
            .into_iter()
            .map(|mut task| {
                task.is_running = false;
                task.current_time = 0;
                // The loaded copy may predate patches still in flight.
                if let Some(local) = local_totals.get(&task.id) {
                    task.total_time = task.total_time.max(*local);
                }
                BoardTask::synced(task)
            })
            .collect();

        for record in unconfirmed {
            if !self.contains(&record.task.id) {
                self.tasks.push(record);
            }
        }

        tracing::debug!(count = self.tasks.len(), "board loaded");
        stopped
    }

    /// Appends a local record awaiting store confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NameEmpty`] or [`TaskError::NameTooLong`] if the
    /// name is unusable.
    pub fn add_pending(&mut self, name: &str, category: Category) -> Result<TaskId, TaskError> {
        let name = validate_name(name)?;
        let id = TaskId::new();
        let task = Task::new(id.clone(), &name, category, Some(Utc::now()))?;
        self.tasks.push(BoardTask {
            task,
            sync: SyncState::Pending,
        });
        Ok(id)
    }

    /// Replaces a pending record with the record the store created.
    ///
    /// Time and running state gathered while the create was in flight move
    /// to the store's id. Returns the patch that brings the store up to date
    /// with that state, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskNotFound`] if the local record is gone
    /// (removed while pending). The stored record is then orphaned and the
    /// caller should delete it.
    pub fn confirm_created(
        &mut self,
        local_id: &TaskId,
        task: Task,
    ) -> Result<Option<TaskPatch>, TaskError> {
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| &t.task.id == local_id)
            .ok_or_else(|| TaskError::TaskNotFound(local_id.to_string()))?;

        let was_running = self.running.remove(local_id);
        let local = std::mem::replace(&mut slot.task, task);
        slot.sync = SyncState::Synced;
        slot.task.is_running = false;
        slot.task.current_time = local.current_time;

        let mut patch = TaskPatch::default();
        if local.total_time > slot.task.total_time {
            slot.task.total_time = local.total_time;
            patch.total_time = Some(local.total_time);
        }
        if was_running {
            self.running.insert(slot.task.id.clone());
            patch.is_running = Some(true);
        }

        tracing::debug!(local_id = %local_id, task_id = %slot.task.id, "create confirmed");
        Ok((!patch.is_empty()).then_some(patch))
    }

    /// Merges a record returned by the store into a confirmed local one.
    ///
    /// Name and category follow the store. Time only moves forward, so a
    /// stale copy never rolls back seconds counted locally. Returns `false`
    /// if no confirmed record has this id.
    pub fn refresh(&mut self, stored: &Task) -> bool {
        let Some(record) = self
            .tasks
            .iter_mut()
            .find(|t| t.task.id == stored.id && t.is_persisted())
        else {
            return false;
        };
        record.task.name.clone_from(&stored.name);
        record.task.category = stored.category;
        record.task.total_time = record.task.total_time.max(stored.total_time);
        true
    }

    /// Marks a pending record as offline after a failed create.
    ///
    /// Returns `false` if the record no longer exists.
    pub fn create_failed(&mut self, local_id: &TaskId) -> bool {
        match self.tasks.iter_mut().find(|t| &t.task.id == local_id) {
            Some(record) => {
                record.sync = SyncState::Offline;
                true
            }
            None => false,
        }
    }

    /// Moves every offline record back to pending and returns what to
    /// create again: `(local_id, name, category)`.
    pub fn begin_reconcile(&mut self) -> Vec<(TaskId, String, Category)> {
        self.tasks
            .iter_mut()
            .filter(|t| t.sync == SyncState::Offline)
            .map(|t| {
                t.sync = SyncState::Pending;
                (t.task.id.clone(), t.task.name.clone(), t.task.category)
            })
            .collect()
    }

    /// Stops and removes a task. Returns the removed record, or `None` if
    /// the id is unknown.
    pub fn remove(&mut self, id: &TaskId) -> Option<BoardTask> {
        let index = self.tasks.iter().position(|t| &t.task.id == id)?;
        if self.running.remove(id) {
            fold(&mut self.tasks[index].task);
        }
        Some(self.tasks.remove(index))
    }

    /// Starts a stopped task or stops a running one.
    ///
    /// Stopping folds `current_time` into `total_time` and returns the stop
    /// patch. Starting keeps both counters and returns the start patch.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskNotFound`] if the id is unknown.
    pub fn toggle(&mut self, id: &TaskId) -> Result<TaskPatch, TaskError> {
        let task = self
            .tasks
            .iter_mut()
            .map(|t| &mut t.task)
            .find(|t| &t.id == id)
            .ok_or_else(|| TaskError::TaskNotFound(id.to_string()))?;

        if self.running.remove(id) {
            fold(task);
            Ok(TaskPatch::stop(task.total_time))
        } else {
            self.running.insert(id.clone());
            Ok(TaskPatch::start())
        }
    }

    /// Advances every running task by one second. Returns how many advanced.
    pub fn tick(&mut self) -> usize {
        let mut advanced = 0;
        for record in &mut self.tasks {
            if self.running.contains(&record.task.id) {
                record.task.current_time = record.task.current_time.saturating_add(1);
                advanced += 1;
            }
        }
        advanced
    }

    /// Stops every running task.
    ///
    /// Returns the stop patches of tasks the store knows about. Unconfirmed
    /// records are folded too; their time reaches the store once their
    /// create is confirmed.
    pub fn stop_all(&mut self) -> Vec<(TaskId, TaskPatch)> {
        if self.running.is_empty() {
            return Vec::new();
        }
        let running = std::mem::take(&mut self.running);
        let mut patches = Vec::new();
        for record in &mut self.tasks {
            if running.contains(&record.task.id) {
                fold(&mut record.task);
                if record.is_persisted() {
                    patches.push((
                        record.task.id.clone(),
                        TaskPatch::stop(record.task.total_time),
                    ));
                }
            }
        }
        patches
    }

    /// All records in display order.
    #[must_use]
    pub fn tasks(&self) -> &[BoardTask] {
        &self.tasks
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if the board holds no record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Looks up a record by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&BoardTask> {
        self.tasks.iter().find(|t| &t.task.id == id)
    }

    fn contains(&self, id: &TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Returns `true` if the task's stopwatch is advancing.
    #[must_use]
    pub fn is_running(&self, id: &TaskId) -> bool {
        self.running.contains(id)
    }

    /// Returns `true` if the store knows the task under this id.
    #[must_use]
    pub fn is_persisted(&self, id: &TaskId) -> bool {
        self.get(id).is_some_and(BoardTask::is_persisted)
    }

    /// Effective elapsed seconds of a task.
    #[must_use]
    pub fn elapsed(&self, id: &TaskId) -> Option<u64> {
        self.get(id).map(|t| t.task.elapsed())
    }

    /// Owned copy of every record with `is_running` filled in.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .map(|record| {
                let mut task = record.task.clone();
                task.is_running = self.running.contains(&task.id);
                task
            })
            .collect()
    }

    /// Sum of effective elapsed seconds in one category.
    #[must_use]
    pub fn category_total(&self, category: Category) -> u64 {
        self.tasks
            .iter()
            .filter(|t| t.task.category == category)
            .map(|t| t.task.elapsed())
            .sum()
    }

    /// Sum of effective elapsed seconds over every task.
    #[must_use]
    pub fn grand_total(&self) -> u64 {
        self.tasks.iter().map(|t| t.task.elapsed()).sum()
    }
}

fn fold(task: &mut Task) {
    task.total_time = task.total_time.saturating_add(task.current_time);
    task.current_time = 0;
}
