//! Shared value types for the hooklog event domain.
//!
//! [`Event`] is the canonical record every recognised webhook is normalized
//! into. It is immutable: fields are private, and the per-action constructors
//! enforce that `from_branch` is present exactly when the action involves two
//! branches.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::InvalidEventRecord;
use crate::{BranchName, RequestId};

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly. Serialised as a fixed-width ISO-8601 string with microsecond
/// precision and a trailing `Z` (`2024-05-01T12:30:00.000000Z`), so the
/// lexical order of the text form matches chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_rfc3339(s).map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Event kinds and actions
// ---------------------------------------------------------------------------

/// Webhook event kinds the normalizer understands.
///
/// Parsed from the `X-GitHub-Event` header value; every other kind is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `push` — commits were pushed to a ref.
    Push,
    /// `pull_request` — a pull request changed state.
    PullRequest,
}

impl EventKind {
    /// Parses a GitHub event name, returning `None` for unsupported kinds.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "push" => Some(Self::Push),
            "pull_request" => Some(Self::PullRequest),
            _ => None,
        }
    }

    /// Returns the GitHub event name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// What happened in the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventAction {
    /// Commits were pushed to a branch.
    Push,
    /// A pull request was opened.
    PullRequest,
    /// A pull request was merged.
    Merge,
}

impl EventAction {
    /// Returns the persisted/serialised name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "PUSH",
            Self::PullRequest => "PULL_REQUEST",
            Self::Merge => "MERGE",
        }
    }

    /// Returns `true` if events with this action carry a source branch.
    pub fn has_source_branch(self) -> bool {
        !matches!(self, Self::Push)
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventAction {
    type Err = InvalidEventRecord;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUSH" => Ok(Self::Push),
            "PULL_REQUEST" => Ok(Self::PullRequest),
            "MERGE" => Ok(Self::Merge),
            other => Err(InvalidEventRecord::new(format!(
                "unknown action '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical event
// ---------------------------------------------------------------------------

/// The canonical, storage-ready record of a repository happening.
///
/// Serialises to exactly six fields: `request_id`, `author`, `action`,
/// `from_branch` (`null` for pushes), `to_branch`, and `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "EventRecord", try_from = "EventRecord")]
pub struct Event {
    request_id: RequestId,
    author: String,
    action: EventAction,
    from_branch: Option<BranchName>,
    to_branch: BranchName,
    timestamp: Timestamp,
}

impl Event {
    /// Creates a `PUSH` event stamped with the current time.
    pub fn push(request_id: RequestId, author: impl Into<String>, to_branch: BranchName) -> Self {
        Self {
            request_id,
            author: author.into(),
            action: EventAction::Push,
            from_branch: None,
            to_branch,
            timestamp: Timestamp::now(),
        }
    }

    /// Creates a `PULL_REQUEST` (opened) event stamped with the current time.
    pub fn pull_request(
        request_id: RequestId,
        author: impl Into<String>,
        from_branch: BranchName,
        to_branch: BranchName,
    ) -> Self {
        Self::between_branches(EventAction::PullRequest, request_id, author, from_branch, to_branch)
    }

    /// Creates a `MERGE` event stamped with the current time.
    pub fn merge(
        request_id: RequestId,
        author: impl Into<String>,
        from_branch: BranchName,
        to_branch: BranchName,
    ) -> Self {
        Self::between_branches(EventAction::Merge, request_id, author, from_branch, to_branch)
    }

    fn between_branches(
        action: EventAction,
        request_id: RequestId,
        author: impl Into<String>,
        from_branch: BranchName,
        to_branch: BranchName,
    ) -> Self {
        Self {
            request_id,
            author: author.into(),
            action,
            from_branch: Some(from_branch),
            to_branch,
            timestamp: Timestamp::now(),
        }
    }

    /// Returns this event with an explicitly supplied timestamp.
    #[must_use]
    pub fn at(self, timestamp: Timestamp) -> Self {
        Self { timestamp, ..self }
    }

    /// Commit short SHA for pushes, pull request number otherwise.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Login or display name of the actor, never empty.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// What happened.
    pub fn action(&self) -> EventAction {
        self.action
    }

    /// Source branch; `None` exactly when the action is [`EventAction::Push`].
    pub fn from_branch(&self) -> Option<&BranchName> {
        self.from_branch.as_ref()
    }

    /// Branch that received the push or is the pull request target.
    pub fn to_branch(&self) -> &BranchName {
        &self.to_branch
    }

    /// When the event was recorded by this service.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

// ---------------------------------------------------------------------------

/// Flat, unvalidated representation of an [`Event`].
///
/// This is the wire and storage shape. Converting back into an [`Event`]
/// re-checks every invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub request_id: String,
    pub author: String,
    pub action: String,
    pub from_branch: Option<String>,
    pub to_branch: String,
    pub timestamp: String,
}

impl From<Event> for EventRecord {
    fn from(event: Event) -> Self {
        Self {
            request_id: event.request_id.to_string(),
            author: event.author,
            action: event.action.as_str().to_string(),
            from_branch: event.from_branch.map(|b| b.to_string()),
            to_branch: event.to_branch.to_string(),
            timestamp: event.timestamp.to_string(),
        }
    }
}

impl TryFrom<EventRecord> for Event {
    type Error = InvalidEventRecord;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let action: EventAction = record.action.parse()?;

        let request_id = RequestId::new(record.request_id)
            .ok_or_else(|| InvalidEventRecord::new("request_id is empty"))?;
        if record.author.is_empty() {
            return Err(InvalidEventRecord::new("author is empty"));
        }
        let to_branch = BranchName::new(record.to_branch)
            .ok_or_else(|| InvalidEventRecord::new("to_branch is empty"))?;

        let from_branch = match (action.has_source_branch(), record.from_branch) {
            (true, Some(branch)) => Some(
                BranchName::new(branch)
                    .ok_or_else(|| InvalidEventRecord::new("from_branch is empty"))?,
            ),
            (true, None) => {
                return Err(InvalidEventRecord::new(format!(
                    "{action} event requires from_branch"
                )))
            }
            (false, Some(_)) => {
                return Err(InvalidEventRecord::new(format!(
                    "{action} event must not have from_branch"
                )))
            }
            (false, None) => None,
        };

        let timestamp: Timestamp = record.timestamp.parse().map_err(|e| {
            InvalidEventRecord::new(format!("invalid timestamp '{}': {e}", record.timestamp))
        })?;

        Ok(Self {
            request_id,
            author: record.author,
            action,
            from_branch,
            to_branch,
            timestamp,
        })
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
