//! Error types for the hooklog event domain.
//!
//! Three kinds of failure cross the domain boundary:
//!
//! - [`MalformedPayloadError`] — a recognised webhook is missing a required
//!   field or carries a value of the wrong shape. Surfaced to the webhook
//!   sender as a client error.
//! - [`StorageError`] — the [`crate::EventStore`] could not insert or read
//!   events. Surfaced as a server error; never retried.
//! - [`ValidationError`] — a read request carried an unusable parameter.
//!
//! Unrecognised event kinds and filtered pull-request or push states are not
//! errors. They are reported as [`crate::IgnoreReason`] values instead.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Normalization errors
// ---------------------------------------------------------------------------

/// A recognised webhook payload could not be turned into an [`crate::Event`].
///
/// Only structural problems produce this error. Absence of the optional values
/// with defined fallbacks (commit author, pusher, merging actor) never does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedPayloadError {
    /// A field required for the event/action combination is absent or `null`.
    #[error("Missing required field '{field}'")]
    MissingField {
        /// Dotted path of the missing field, e.g. `"pull_request.head.ref"`.
        field: &'static str,
    },

    /// A required field is present but its value cannot be used.
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// The payload does not match the expected JSON shape (wrong value types).
    #[error("Payload does not match the expected schema: {message}")]
    Schema {
        /// Deserializer message describing the mismatch.
        message: String,
    },
}

impl From<serde_json::Error> for MalformedPayloadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema {
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

/// Failure reported by an [`crate::EventStore`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backing store could not be reached (e.g. lock poisoned, worker
    /// thread gone, file unavailable).
    #[error("Event store unavailable: {message}")]
    Unavailable {
        /// Description of the availability problem.
        message: String,
    },

    /// The backing store rejected the operation.
    #[error("Event store operation failed: {message}")]
    Backend {
        /// Backend-specific error text.
        message: String,
    },

    /// A persisted record could not be converted back into a valid event.
    #[error("Stored event record is corrupt: {message}")]
    CorruptRecord {
        /// Description of the invariant the record violates.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Request validation errors
// ---------------------------------------------------------------------------

/// A read request parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The `limit` parameter is not a non-negative integer.
    #[error("Invalid limit '{value}': expected a non-negative integer")]
    InvalidLimit {
        /// The raw value supplied by the client.
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Record conversion errors
// ---------------------------------------------------------------------------

/// An [`crate::EventRecord`] violates an [`crate::Event`] invariant.
///
/// Produced when deserialising events from JSON or from a store row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvalidEventRecord {
    /// Description of the violated invariant.
    pub message: String,
}

impl InvalidEventRecord {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<InvalidEventRecord> for StorageError {
    fn from(err: InvalidEventRecord) -> Self {
        Self::CorruptRecord {
            message: err.message,
        }
    }
}
