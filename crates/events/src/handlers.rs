//! Transport-independent orchestration of ingest and query requests.
//!
//! [`IngestHandler`] sequences normalization and persistence for one webhook;
//! [`QueryHandler`] reads recent events. Both receive their store at
//! construction time and hold no other state.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::{MalformedPayloadError, StorageError};
use crate::{normalizer, Event, EventKind, EventStore, QueryLimit};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a webhook produced no stored event. Ignoring is not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The request carried no event-kind header.
    MissingEventKind,
    /// The event kind is not one the normalizer handles.
    UnsupportedKind(String),
    /// The kind is supported but this particular state is not tracked
    /// (commit-less push, unmerged close, other pull request actions).
    Filtered(EventKind),
}

/// Failure while ingesting a webhook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error(transparent)]
    Malformed(#[from] MalformedPayloadError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result of handling one webhook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The notification was normalized and the event persisted.
    Stored(Event),
    /// The notification was understood but intentionally not recorded.
    Ignored(IgnoreReason),
    /// Normalization or persistence failed.
    Failed(IngestError),
}

/// Coarse status reported to webhook senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestStatus {
    Success,
    Ignored,
    Error,
}

impl IngestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Ignored => "ignored",
            Self::Error => "error",
        }
    }
}

impl IngestOutcome {
    /// Returns the coarse status for this outcome.
    pub fn status(&self) -> IngestStatus {
        match self {
            Self::Stored(_) => IngestStatus::Success,
            Self::Ignored(_) => IngestStatus::Ignored,
            Self::Failed(_) => IngestStatus::Error,
        }
    }
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

/// Normalizes inbound notifications and appends the resulting events.
#[derive(Clone)]
pub struct IngestHandler {
    store: Arc<dyn EventStore>,
}

impl IngestHandler {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Handles one notification. Every failure is returned as an outcome;
    /// a failed insert is reported once and not retried.
    #[instrument(skip(self, payload), fields(event_kind = kind.unwrap_or("")))]
    pub async fn handle(&self, kind: Option<&str>, payload: &Value) -> IngestOutcome {
        let Some(kind_name) = kind else {
            debug!("Ignoring webhook without event kind");
            return IngestOutcome::Ignored(IgnoreReason::MissingEventKind);
        };
        let Some(kind) = EventKind::parse(kind_name) else {
            debug!("Ignoring unsupported webhook event kind");
            return IngestOutcome::Ignored(IgnoreReason::UnsupportedKind(kind_name.to_string()));
        };

        let event = match normalizer::process_kind(kind, payload) {
            Ok(Some(event)) => event,
            Ok(None) => return IngestOutcome::Ignored(IgnoreReason::Filtered(kind)),
            Err(err) => {
                warn!(error = %err, "Rejected malformed webhook payload");
                return IngestOutcome::Failed(err.into());
            }
        };

        match self.store.insert(&event).await {
            Ok(()) => {
                info!(
                    request_id = %event.request_id(),
                    action = %event.action(),
                    author = event.author(),
                    to_branch = %event.to_branch(),
                    "Stored event"
                );
                IngestOutcome::Stored(event)
            }
            Err(err) => {
                error!(error = %err, request_id = %event.request_id(), "Failed to store event");
                IngestOutcome::Failed(err.into())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Reads recent events for display and API consumers.
#[derive(Clone)]
pub struct QueryHandler {
    store: Arc<dyn EventStore>,
}

impl QueryHandler {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Returns the store's newest-first result for `limit`, unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store could not be read.
    #[instrument(skip(self))]
    pub async fn recent(&self, limit: QueryLimit) -> Result<Vec<Event>, StorageError> {
        self.store.query(limit).await.inspect_err(|err| {
            error!(error = %err, "Failed to query events");
        })
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
