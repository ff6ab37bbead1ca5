//! `tasktimer` task store server.
//!
//! An axum HTTP server exposing list/create/update/delete over a single
//! JSON document of task records.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 127.0.0.1:3000
//! cargo run --bin tasktimer-server
//!
//! # Custom address and document
//! cargo run --bin tasktimer-server -- --bind 0.0.0.0:8080 --data-file ./data/tasks.json
//!
//! # Or via environment variables
//! TASKTIMER_ADDR=0.0.0.0:8080 TASKTIMER_DATA=./data/tasks.json cargo run --bin tasktimer-server
//! ```

use std::sync::Arc;

use clap::Parser;
use tasktimer_server::api::{self, ServerState};
use tasktimer_server::config::{ServerCliArgs, ServerConfig};
use tasktimer_server::store::TaskStore;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        addr = %config.bind_addr,
        data_file = %config.data_file.display(),
        "starting tasktimer server"
    );

    let store = TaskStore::new(config.data_file.clone());
    let state = Arc::new(ServerState::with_config(store, config.max_body_size));

    match api::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "task server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "task server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start task server");
            std::process::exit(1);
        }
    }
}
