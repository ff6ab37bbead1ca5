//! Application state and event handling.
//!
//! `App` owns the [`TaskBoard`] and is its only mutator. Key presses and
//! sync events change the board immediately and return the [`AppAction`]s
//! the event loop must carry out (store requests, report exports).

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tasktimer_proto::{Category, TaskId, TaskPatch};

use crate::export::{self, ExportFormat, ReportSettings};
use crate::tasks::{SyncCommand, SyncEvent, TaskBoard};

/// Whether keys edit the new-task name or drive the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys act on the task list.
    Normal,
    /// Keys edit the new-task name.
    Editing,
}

/// Side effect requested by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Send a command to the sync worker.
    Sync(SyncCommand),
    /// Write a report of the current board.
    Export(ExportFormat),
}

/// Main application state.
pub struct App {
    /// Local task list and running set.
    pub board: TaskBoard,
    /// Name being typed for a new task.
    pub input: String,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Category used for the next created task.
    pub category: Category,
    /// Index of the highlighted task.
    pub selected: usize,
    /// Last status message shown in the status bar.
    pub status: Option<String>,
    /// Whether the last store request got an answer.
    pub is_online: bool,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App {
    /// Create an empty application.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: TaskBoard::new(),
            input: String::new(),
            input_mode: InputMode::Normal,
            category: Category::Criacao,
            selected: 0,
            status: None,
            is_online: true,
            should_quit: false,
        }
    }

    /// Handle a key event and return the resulting actions.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Vec<AppAction> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Vec::new();
        }

        match self.input_mode {
            InputMode::Editing => self.handle_editing_key(key),
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> Vec<AppAction> {
        match key.code {
            KeyCode::Enter => return self.submit_task(),
            KeyCode::Esc => {
                self.input.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Tab => self.category = self.category.toggled(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
        Vec::new()
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Vec<AppAction> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('a' | 'i') => self.input_mode = InputMode::Editing,
            KeyCode::Tab => self.category = self.category.toggled(),
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char(' ') | KeyCode::Enter => return self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => return self.remove_selected(),
            KeyCode::Char('r') => return self.reload(),
            KeyCode::Char('e') => return vec![AppAction::Export(ExportFormat::Csv)],
            KeyCode::Char('p') => return vec![AppAction::Export(ExportFormat::Pdf)],
            _ => {}
        }
        Vec::new()
    }

    /// Create a task from the input line.
    fn submit_task(&mut self) -> Vec<AppAction> {
        match self.board.add_pending(&self.input, self.category) {
            Ok(local_id) => {
                let name = self.input.trim().to_string();
                self.input.clear();
                self.input_mode = InputMode::Normal;
                self.selected = self.board.len().saturating_sub(1);
                vec![AppAction::Sync(SyncCommand::Create {
                    local_id,
                    name,
                    category: self.category,
                })]
            }
            Err(e) => {
                self.status = Some(e.to_string());
                Vec::new()
            }
        }
    }

    /// Id of the highlighted task.
    #[must_use]
    pub fn selected_id(&self) -> Option<TaskId> {
        self.board
            .tasks()
            .get(self.selected)
            .map(|t| t.task.id.clone())
    }

    /// Start or stop the highlighted task.
    pub fn toggle_selected(&mut self) -> Vec<AppAction> {
        let Some(id) = self.selected_id() else {
            return Vec::new();
        };
        match self.board.toggle(&id) {
            Ok(patch) if self.board.is_persisted(&id) => {
                vec![AppAction::Sync(SyncCommand::Update { id, patch })]
            }
            // Unconfirmed records catch up when their create is confirmed.
            Ok(_) => Vec::new(),
            Err(e) => {
                self.status = Some(e.to_string());
                Vec::new()
            }
        }
    }

    /// Remove the highlighted task.
    pub fn remove_selected(&mut self) -> Vec<AppAction> {
        let Some(id) = self.selected_id() else {
            return Vec::new();
        };
        let Some(removed) = self.board.remove(&id) else {
            return Vec::new();
        };
        self.clamp_selection();
        if removed.is_persisted() {
            vec![AppAction::Sync(SyncCommand::Delete { id })]
        } else {
            Vec::new()
        }
    }

    /// Stop every timer, persist the stop patches, retry offline creates and
    /// fetch the list again. The commands are queued in that order.
    pub fn reload(&mut self) -> Vec<AppAction> {
        let mut actions = stop_commands(self.board.stop_all());
        actions.extend(
            self.board
                .begin_reconcile()
                .into_iter()
                .map(|(local_id, name, category)| {
                    AppAction::Sync(SyncCommand::Create {
                        local_id,
                        name,
                        category,
                    })
                }),
        );
        actions.push(AppAction::Sync(SyncCommand::Load));
        actions
    }

    /// Apply a result reported by the sync worker.
    pub fn apply_sync_event(&mut self, event: SyncEvent) -> Vec<AppAction> {
        match event {
            SyncEvent::Loaded(tasks) => {
                self.is_online = true;
                let count = tasks.len();
                let actions = stop_commands(self.board.load(tasks));
                self.clamp_selection();
                self.status = Some(format!("{count} tarefas carregadas"));
                actions
            }
            SyncEvent::LoadFailed(error) => {
                self.is_online = !error.is_network();
                self.status = Some(format!("Erro ao buscar tarefas: {error}"));
                Vec::new()
            }
            SyncEvent::Created { local_id, task } => {
                self.is_online = true;
                let stored_id = task.id.clone();
                match self.board.confirm_created(&local_id, task) {
                    Ok(Some(patch)) => vec![AppAction::Sync(SyncCommand::Update {
                        id: stored_id,
                        patch,
                    })],
                    Ok(None) => Vec::new(),
                    // Removed while the create was in flight.
                    Err(_) => vec![AppAction::Sync(SyncCommand::Delete { id: stored_id })],
                }
            }
            SyncEvent::CreateFailed { local_id, error } => {
                if error.is_network() {
                    self.is_online = false;
                    self.board.create_failed(&local_id);
                    self.status = Some("Sem conexão: tarefa mantida localmente".to_string());
                } else {
                    self.board.remove(&local_id);
                    self.clamp_selection();
                    self.status = Some(format!("Erro ao criar tarefa: {error}"));
                }
                Vec::new()
            }
            SyncEvent::Updated(task) => {
                self.is_online = true;
                self.board.refresh(&task);
                Vec::new()
            }
            SyncEvent::Deleted(_) => {
                self.is_online = true;
                Vec::new()
            }
            SyncEvent::Error { id, error } => {
                if error.is_network() {
                    self.is_online = false;
                }
                self.status = Some(format!("Erro ao sincronizar {id}: {error}"));
                Vec::new()
            }
        }
    }

    /// Advance running timers by one tick.
    pub fn tick(&mut self) {
        self.board.tick();
    }

    /// Write a report of the current board and report the outcome in the
    /// status bar.
    pub fn export(&mut self, format: ExportFormat, settings: &ReportSettings, date: NaiveDate) {
        match export::save_report(&self.board.snapshot(), format, settings, date) {
            Ok(path) => self.status = Some(format!("Relatório salvo em {}", path.display())),
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                self.status = Some(format!("Erro ao exportar arquivo: {e}"));
            }
        }
    }

    /// Commands to send before exiting: stop patches for running tasks,
    /// then [`SyncCommand::Shutdown`].
    pub fn shutdown(&mut self) -> Vec<SyncCommand> {
        let mut commands: Vec<SyncCommand> = self
            .board
            .stop_all()
            .into_iter()
            .map(|(id, patch)| SyncCommand::Update { id, patch })
            .collect();
        commands.push(SyncCommand::Shutdown);
        commands
    }

    /// Select the previous task.
    const fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Select the next task.
    fn select_next(&mut self) {
        if self.selected < self.board.len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.board.len().saturating_sub(1));
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn stop_commands(patches: Vec<(TaskId, TaskPatch)>) -> Vec<AppAction> {
    patches
        .into_iter()
        .map(|(id, patch)| AppAction::Sync(SyncCommand::Update { id, patch }))
        .collect()
}
