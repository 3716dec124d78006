//! hooklog entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** — load an optional `.env` file, then read the
//!    environment into a validated [`config::Config`].
//! 2. **Wire observability** — configure `tracing-subscriber` with a text or
//!    JSON layer and, when configured, an OpenTelemetry OTLP exporter. All
//!    `tracing` spans and events emitted by every crate flow through here.
//! 3. **Construct infrastructure** — open the configured
//!    [`events::EventStore`] backend and inject it into the HTTP handlers.
//! 4. **Serve** — run the `listener` router until Ctrl-C or SIGTERM, then
//!    drain in-flight requests and flush telemetry.

use std::sync::Arc;

use anyhow::Context;
use events::EventStore;
use listener::AppState;
use store::{MemoryEventStore, SqliteEventStore};
use tracing::{info, warn};

mod config;
mod telemetry;

use config::{Config, DatabaseLocation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let config = Config::from_env()?;
    let telemetry = telemetry::init(&config)?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "Ignoring unreadable environment file"),
    }

    let result = run(config).await;
    telemetry.shutdown();
    result
}

async fn run(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config.database)?;
    listener::serve(config.bind, AppState::new(store), shutdown_signal())
        .await
        .context("webhook listener stopped with an error")?;
    info!("Shut down cleanly");
    Ok(())
}

fn open_store(location: &DatabaseLocation) -> anyhow::Result<Arc<dyn EventStore>> {
    match location {
        DatabaseLocation::Memory => {
            warn!("Using in-memory event store; events will not survive a restart");
            Ok(Arc::new(MemoryEventStore::new()))
        }
        DatabaseLocation::File(path) => {
            let store = SqliteEventStore::open(path)
                .with_context(|| format!("failed to open event store at {}", path.display()))?;
            info!(path = %path.display(), "Opened event store");
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
