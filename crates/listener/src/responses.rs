//! JSON bodies returned by the HTTP routes.

use events::{IngestError, IngestOutcome, Timestamp};
use serde::{Deserialize, Serialize};

/// Body of every `POST /webhook` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Message returned when persistence fails. Backend details stay in the logs.
pub const STORE_FAILURE_MESSAGE: &str = "failed to store event";

impl WebhookResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }
}

impl From<&IngestOutcome> for WebhookResponse {
    fn from(outcome: &IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::Failed(IngestError::Malformed(err)) => Self::error(err.to_string()),
            IngestOutcome::Failed(IngestError::Storage(_)) => Self::error(STORE_FAILURE_MESSAGE),
            other => Self {
                status: other.status().as_str().to_string(),
                message: None,
            },
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: Timestamp,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Timestamp::now(),
        }
    }
}

/// Error body for the read API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
