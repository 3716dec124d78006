//! hooklog HTTP surface.
//!
//! Binds the [`events`] handlers to HTTP with `axum`:
//!
//! | Route | Handler |
//! |-------|---------|
//! | `POST /webhook` | GitHub webhook receiver; the event kind comes from `X-GitHub-Event` |
//! | `GET /api/events?limit=N` | Recent events, newest first (default 20) |
//! | `GET /api/health` | Liveness probe |
//! | `GET /` | Static page rendering recent events |
//!
//! All routes allow cross-origin requests.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Header extraction, body decoding, status-code mapping,
//! and socket binding live here. The [`events`] crate sees none of it.
//!
//! Webhook signatures are not verified.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use events::{EventStore, IngestHandler, QueryHandler};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod handlers;
pub mod responses;

/// Header carrying the GitHub event name.
pub const EVENT_KIND_HEADER: &str = "x-github-event";

/// Header carrying GitHub's unique delivery identifier.
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    ingest: IngestHandler,
    query: QueryHandler,
}

impl AppState {
    /// Builds the state around one shared store.
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            ingest: IngestHandler::new(Arc::clone(&store)),
            query: QueryHandler::new(store),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/webhook", post(handlers::receive_webhook))
        .route("/api/events", get(handlers::list_events))
        .route("/api/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Errors that stop the HTTP server.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Binds `addr` and serves the router until `shutdown` resolves.
///
/// In-flight requests are allowed to complete after `shutdown` fires.
///
/// # Errors
///
/// Returns [`ListenerError`] if the address cannot be bound or the server
/// loop fails.
pub async fn serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })?;
    let local_addr = listener.local_addr().unwrap_or(addr);
    info!(addr = %local_addr, "Listening for webhooks");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ListenerError::Serve)
}
