//! Configuration system for the `tasktimer` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/tasktimer/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use crate::export::ReportSettings;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    network: NetworkFileConfig,
    export: ExportFileConfig,
    ui: UiFileConfig,
}

/// `[network]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct NetworkFileConfig {
    server_url: Option<String>,
    request_timeout_secs: Option<u64>,
    channel_capacity: Option<usize>,
}

/// `[export]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ExportFileConfig {
    directory: Option<PathBuf>,
    file_prefix: Option<String>,
    title: Option<String>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    tick_interval_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- Network --
    /// Base URL of the task store.
    pub server_url: String,
    /// Upper bound for a single store request.
    pub request_timeout: Duration,
    /// Channel capacity for command/event mpsc channels.
    pub channel_capacity: usize,
    /// Keep tasks in memory only and never contact a server.
    pub offline: bool,

    // -- Export --
    /// Where reports are written and how they are named.
    pub export: ReportSettings,

    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Period of the stopwatch tick.
    pub tick_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
            request_timeout: Duration::from_secs(10),
            channel_capacity: 256,
            offline: false,
            export: ReportSettings::default(),
            poll_timeout: Duration::from_millis(50),
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// Otherwise the default path (`~/.config/tasktimer/config.toml`) is
    /// tried and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `ClientConfig` from CLI args alone, as if the config file
    /// were empty. Used when the file cannot be loaded.
    #[must_use]
    pub fn from_cli(cli: &CliArgs) -> Self {
        Self::resolve(cli, &ConfigFile::default())
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            server_url: cli
                .server_url
                .clone()
                .or_else(|| file.network.server_url.clone())
                .unwrap_or(defaults.server_url),
            request_timeout: file
                .network
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map_or(defaults.request_timeout, Duration::from_secs),
            channel_capacity: file
                .network
                .channel_capacity
                .filter(|n| *n > 0)
                .unwrap_or(defaults.channel_capacity),
            offline: cli.offline,
            export: ReportSettings {
                directory: cli
                    .export_dir
                    .clone()
                    .or_else(|| file.export.directory.clone())
                    .unwrap_or(defaults.export.directory),
                file_prefix: file
                    .export
                    .file_prefix
                    .clone()
                    .unwrap_or(defaults.export.file_prefix),
                title: file
                    .export
                    .title
                    .clone()
                    .unwrap_or(defaults.export.title),
            },
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            tick_interval: file
                .ui
                .tick_interval_ms
                .filter(|ms| *ms > 0)
                .map_or(defaults.tick_interval, Duration::from_millis),
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal task timer")]
pub struct CliArgs {
    /// Base URL of the task store.
    #[arg(long, env = "TASKTIMER_URL")]
    pub server_url: Option<String>,

    /// Keep tasks in memory without contacting a server.
    #[arg(long)]
    pub offline: bool,

    /// Directory exported reports are written to.
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Path to config file (default: `~/.config/tasktimer/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKTIMER_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/tasktimer.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("tasktimer").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
