//! Event persistence port.
//!
//! [`EventStore`] is implemented by infrastructure crates (see the `store`
//! crate for the SQLite and in-memory backends). The domain only needs two
//! operations: append one event, and read the most recent ones.

use async_trait::async_trait;

use crate::errors::{StorageError, ValidationError};
use crate::Event;

/// Append-only storage for canonical events.
///
/// Implementations are shared across concurrent requests behind an `Arc`, so
/// they must be `Send + Sync` and handle their own internal synchronisation.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends one event. No de-duplication is performed; repeated request
    /// identifiers are stored as separate records.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend could not persist the event.
    async fn insert(&self, event: &Event) -> Result<(), StorageError>;

    /// Returns at most `limit` events, newest first by timestamp.
    ///
    /// Events with equal timestamps are returned most recently inserted first.
    /// Must not modify stored state.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend could not be read or a stored
    /// record is corrupt.
    async fn query(&self, limit: QueryLimit) -> Result<Vec<Event>, StorageError>;
}

// ---------------------------------------------------------------------------
// Query limit
// ---------------------------------------------------------------------------

/// Maximum number of events returned by a recency query.
///
/// Zero is a valid limit and produces an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryLimit(u32);

impl QueryLimit {
    /// Limit applied when the client does not supply one.
    pub const DEFAULT: Self = Self(20);

    /// Creates a [`QueryLimit`] from a raw integer.
    pub fn new(limit: u32) -> Self {
        Self(limit)
    }

    /// Parses the raw `limit` query-string value.
    ///
    /// `None` yields [`QueryLimit::DEFAULT`]. Surrounding whitespace is
    /// tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidLimit`] for values that are not
    /// non-negative integers (negative, fractional, non-numeric, or too large).
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        let Some(raw) = raw else {
            return Ok(Self::DEFAULT);
        };
        let trimmed = raw.trim();
        // `u32::from_str` accepts a leading '+', which is not a plain integer.
        if trimmed.starts_with('+') {
            return Err(ValidationError::InvalidLimit {
                value: raw.to_string(),
            });
        }
        trimmed
            .parse::<u32>()
            .map(Self)
            .map_err(|_| ValidationError::InvalidLimit {
                value: raw.to_string(),
            })
    }

    /// Returns the limit as a `u32`.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the limit as a `usize` for slice truncation.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if no events may be returned.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Default for QueryLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for QueryLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
