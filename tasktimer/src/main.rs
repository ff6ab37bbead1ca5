//! `tasktimer`: terminal task timer.
//!
//! Launches the TUI against a running `tasktimer-server`, or keeps tasks
//! in memory with `--offline`. Configuration via CLI flags, environment
//! variables, or config file (`~/.config/tasktimer/config.toml`).
//!
//! ```bash
//! # Against a local store
//! cargo run --bin tasktimer -- --server-url http://127.0.0.1:3000
//!
//! # Without a server
//! cargo run --bin tasktimer -- --offline
//! ```

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_appender::non_blocking::WorkerGuard;

use tasktimer::api::http::HttpTaskApi;
use tasktimer::api::memory::InMemoryTaskApi;
use tasktimer::app::{App, AppAction};
use tasktimer::config::{CliArgs, ClientConfig};
use tasktimer::tasks::{SyncCommand, SyncEvent, spawn_sync};
use tasktimer::ui;

/// How long teardown waits for the sync worker to drain.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::from_cli(&cli)
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(offline = config.offline, server = %config.server_url, "tasktimer starting");

    let (cmd_tx, mut evt_rx, worker) = if config.offline {
        spawn_sync(InMemoryTaskApi::new(), config.channel_capacity)
    } else {
        match HttpTaskApi::new(&config.server_url, config.request_timeout) {
            Ok(api) => spawn_sync(api, config.channel_capacity),
            Err(e) => {
                eprintln!("Error: failed to build HTTP client: {e}");
                std::process::exit(1);
            }
        }
    };

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let result = run_app(&mut terminal, &mut app, &cmd_tx, &mut evt_rx, &config);

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    shutdown(&mut app, cmd_tx, evt_rx, worker).await;

    tracing::info!("tasktimer exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("tasktimer.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    cmd_tx: &mpsc::Sender<SyncCommand>,
    evt_rx: &mut mpsc::Receiver<SyncEvent>,
    config: &ClientConfig,
) -> io::Result<()> {
    let initial = app.reload();
    dispatch(app, cmd_tx, initial, config);
    let mut last_tick = Instant::now();

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Step 2: Drain all pending SyncEvents (non-blocking).
        drain_sync_events(app, cmd_tx, evt_rx, config);

        // Step 3: Advance timers once per elapsed tick interval.
        while last_tick.elapsed() >= config.tick_interval {
            app.tick();
            last_tick += config.tick_interval;
        }

        // Step 4: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let actions = app.handle_key_event(key);
            dispatch(app, cmd_tx, actions, config);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Drain all pending `SyncEvent`s and apply them to the app.
fn drain_sync_events(
    app: &mut App,
    cmd_tx: &mpsc::Sender<SyncCommand>,
    rx: &mut mpsc::Receiver<SyncEvent>,
    config: &ClientConfig,
) {
    while let Ok(event) = rx.try_recv() {
        let actions = app.apply_sync_event(event);
        dispatch(app, cmd_tx, actions, config);
    }
}

/// Carry out the actions requested by the app.
fn dispatch(
    app: &mut App,
    cmd_tx: &mpsc::Sender<SyncCommand>,
    actions: Vec<AppAction>,
    config: &ClientConfig,
) {
    for action in actions {
        match action {
            AppAction::Sync(cmd) => match cmd_tx.try_send(cmd) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(cmd)) => {
                    tracing::warn!(command = ?cmd, "sync queue full, command dropped");
                    app.status = Some("Fila de sincronização cheia".to_string());
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    app.is_online = false;
                    app.status = Some("Sincronização encerrada".to_string());
                }
            },
            AppAction::Export(format) => {
                app.export(format, &config.export, chrono::Local::now().date_naive());
            }
        }
    }
}

/// Flush stop patches, stop the sync worker and wait for it to drain.
///
/// Events are still received (and discarded) meanwhile so the worker never
/// blocks on a full event channel.
async fn shutdown(
    app: &mut App,
    cmd_tx: mpsc::Sender<SyncCommand>,
    mut evt_rx: mpsc::Receiver<SyncEvent>,
    worker: JoinHandle<()>,
) {
    let commands = app.shutdown();
    let send = async move {
        for cmd in commands {
            if cmd_tx.send(cmd).await.is_err() {
                break;
            }
        }
    };
    let receive = async move {
        while let Some(event) = evt_rx.recv().await {
            tracing::debug!(event = ?event, "event after shutdown");
        }
    };
    let drain = async move {
        tokio::join!(send, receive);
        worker.await
    };
    match tokio::time::timeout(SHUTDOWN_GRACE, drain).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "sync worker panicked"),
        Err(_) => tracing::warn!("sync worker did not finish in time"),
    }
}
