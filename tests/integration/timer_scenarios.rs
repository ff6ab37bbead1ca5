//! End-to-end timer scenarios.
//!
//! Drives the client the way the TUI loop does: key presses and ticks go
//! into `App`, the returned sync commands go through the sync worker to a
//! store, and the resulting events are fed back into `App`.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tasktimer::api::TaskApi;
use tasktimer::api::memory::InMemoryTaskApi;
use tasktimer::app::{App, AppAction};
use tasktimer::export::csv::to_csv;
use tasktimer::tasks::{SyncCommand, SyncEvent, SyncState, spawn_sync};
use tasktimer_proto::{Category, Task, TaskId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Client wired to a sync worker, with a synchronous pump like the TUI loop.
struct Harness {
    app: App,
    tx: mpsc::Sender<SyncCommand>,
    rx: mpsc::Receiver<SyncEvent>,
    worker: JoinHandle<()>,
}

impl Harness {
    fn new<A: TaskApi + 'static>(api: A) -> Self {
        let (tx, rx, worker) = spawn_sync(api, 64);
        Self {
            app: App::new(),
            tx,
            rx,
            worker,
        }
    }

    /// Sends every sync action and applies events until the worker is idle.
    async fn run(&mut self, actions: Vec<AppAction>) {
        let mut pending = 0usize;
        let mut queue = actions;
        loop {
            for action in queue.drain(..) {
                if let AppAction::Sync(cmd) = action {
                    self.tx.send(cmd).await.unwrap();
                    pending += 1;
                }
            }
            if pending == 0 {
                return;
            }
            let event = tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
                .await
                .expect("timeout waiting for sync event")
                .expect("sync worker stopped");
            pending -= 1;
            queue = self.app.apply_sync_event(event);
        }
    }

    async fn key(&mut self, code: KeyCode) {
        let actions = self
            .app
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
        self.run(actions).await;
    }

    async fn create(&mut self, name: &str, category: Category) {
        self.key(KeyCode::Char('a')).await;
        if self.app.category != category {
            self.key(KeyCode::Tab).await;
        }
        for c in name.chars() {
            self.key(KeyCode::Char(c)).await;
        }
        self.key(KeyCode::Enter).await;
    }

    async fn reload(&mut self) {
        let actions = self.app.reload();
        self.run(actions).await;
    }

    fn select(&mut self, name: &str) -> TaskId {
        let index = self
            .app
            .board
            .tasks()
            .iter()
            .position(|t| t.task.name == name)
            .expect("task on board");
        self.app.selected = index;
        self.app.board.tasks()[index].task.id.clone()
    }

    fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.app.tick();
        }
    }
}

fn only(tasks: &[Task]) -> &Task {
    assert_eq!(tasks.len(), 1, "expected a single task: {tasks:?}");
    &tasks[0]
}

#[tokio::test]
async fn start_five_ticks_stop_persists_five_seconds() {
    let store = InMemoryTaskApi::new();
    let mut h = Harness::new(store.clone());
    h.reload().await;

    h.create("Draft banner", Category::Criacao).await;
    let id = h.select("Draft banner");
    assert!(h.app.board.is_persisted(&id));

    h.key(KeyCode::Char(' ')).await;
    h.ticks(5);
    let record = h.app.board.get(&id).unwrap();
    assert_eq!(record.task.current_time, 5);
    assert_eq!(record.task.total_time, 0);

    h.key(KeyCode::Char(' ')).await;
    let stored = store.snapshot();
    let task = only(&stored);
    assert_eq!(task.total_time, 5);
    assert_eq!(task.current_time, 0);
    assert!(!task.is_running);
}

#[tokio::test]
async fn restart_accumulates_on_top_of_total() {
    let store = InMemoryTaskApi::new();
    let mut h = Harness::new(store.clone());
    h.create("t", Category::Ajustes).await;
    h.select("t");

    h.key(KeyCode::Char(' ')).await;
    h.ticks(3);
    h.key(KeyCode::Char(' ')).await;
    h.key(KeyCode::Char(' ')).await;
    h.ticks(4);
    h.key(KeyCode::Char(' ')).await;

    assert_eq!(only(&store.snapshot()).total_time, 7);
}

#[tokio::test]
async fn two_categories_produce_summary_totals() {
    let store = InMemoryTaskApi::new();
    let mut h = Harness::new(store.clone());
    h.create("Draft banner", Category::Criacao).await;
    h.create("Fix logo", Category::Ajustes).await;

    h.select("Draft banner");
    h.key(KeyCode::Char(' ')).await;
    h.ticks(10);
    h.key(KeyCode::Char(' ')).await;

    h.select("Fix logo");
    h.key(KeyCode::Char(' ')).await;
    h.ticks(20);
    h.key(KeyCode::Char(' ')).await;

    let csv = to_csv(&h.app.board.snapshot());
    assert!(csv.contains("Total Criação,,10,\"00:00:10\","));
    assert!(csv.contains("Total Ajustes,,20,\"00:00:20\","));
    assert!(csv.contains("TEMPO TOTAL GERAL,,30,\"00:00:30\","));
}

#[tokio::test]
async fn reload_stops_running_timer_and_keeps_time() {
    let store = InMemoryTaskApi::new();
    let mut h = Harness::new(store.clone());
    h.create("t", Category::Criacao).await;
    let id = h.select("t");
    h.key(KeyCode::Char(' ')).await;
    h.ticks(8);

    h.reload().await;
    assert!(!h.app.board.is_running(&id));
    assert_eq!(h.app.board.elapsed(&id), Some(8));
    assert_eq!(only(&store.snapshot()).total_time, 8);
}

#[tokio::test]
async fn delete_removes_from_store() {
    let store = InMemoryTaskApi::new();
    let mut h = Harness::new(store.clone());
    h.create("keep", Category::Criacao).await;
    h.create("gone", Category::Criacao).await;

    h.select("gone");
    h.key(KeyCode::Char('d')).await;
    assert_eq!(only(&store.snapshot()).name, "keep");
    assert_eq!(h.app.board.len(), 1);
}

#[tokio::test]
async fn offline_create_reconciles_on_reload() {
    let store = InMemoryTaskApi::new();
    let mut h = Harness::new(store.clone());
    store.set_unreachable(true);

    h.create("made offline", Category::Ajustes).await;
    assert!(!h.app.is_online);
    let local = h.select("made offline");
    assert_eq!(h.app.board.get(&local).unwrap().sync, SyncState::Offline);

    // Time counted while offline is kept.
    h.key(KeyCode::Char(' ')).await;
    h.ticks(3);
    h.key(KeyCode::Char(' ')).await;
    assert!(store.snapshot().is_empty());

    // A failed reload keeps the local record.
    h.reload().await;
    assert_eq!(h.app.board.len(), 1);

    store.set_unreachable(false);
    h.reload().await;
    assert!(h.app.is_online);

    let stored = store.snapshot();
    let task = only(&stored);
    assert_eq!(task.name, "made offline");
    assert_eq!(task.total_time, 3);
    assert_eq!(h.app.board.len(), 1);
    assert!(h.app.board.is_persisted(&task.id));
    assert_eq!(h.app.board.elapsed(&task.id), Some(3));
}

#[tokio::test]
async fn stale_store_copy_does_not_roll_back_local_time() {
    let store = InMemoryTaskApi::new();
    let mut h = Harness::new(store.clone());
    store.set_unreachable(true);
    h.create("t", Category::Criacao).await;
    h.select("t");
    h.key(KeyCode::Char(' ')).await;
    h.ticks(2);
    store.set_unreachable(false);

    // Reload stops the timer and retries the create; the confirmation
    // pushes the folded total to the store.
    h.reload().await;
    let id = h.select("t");
    assert!(h.app.board.is_persisted(&id));
    assert_eq!(h.app.board.elapsed(&id), Some(2));
    assert_eq!(only(&store.snapshot()).total_time, 2);
}

#[tokio::test]
async fn shutdown_flushes_running_tasks() {
    let store = InMemoryTaskApi::new();
    let mut h = Harness::new(store.clone());
    h.create("t", Category::Criacao).await;
    h.select("t");
    h.key(KeyCode::Char(' ')).await;
    h.ticks(4);

    for cmd in h.app.shutdown() {
        h.tx.send(cmd).await.unwrap();
    }
    // Keep receiving so the worker never blocks on events.
    while h.rx.recv().await.is_some() {}
    h.worker.await.unwrap();

    assert_eq!(only(&store.snapshot()).total_time, 4);
}
