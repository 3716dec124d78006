//! Typed views of the GitHub webhook payloads the normalizer reads.
//!
//! Only the fields consulted during normalization are modelled. Every field is
//! optional at the serde level so that absence is detected by the normalizer
//! and reported as a named [`MalformedPayloadError::MissingField`] rather than
//! an opaque deserializer message. Unknown fields are ignored.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::MalformedPayloadError;

/// Body of a `push` webhook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    /// Full ref that was pushed, e.g. `refs/heads/main`.
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    /// Most recent commit on the ref after the push. `null` for deletions.
    pub head_commit: Option<HeadCommit>,
    /// Actor who performed the push.
    pub pusher: Option<Pusher>,
}

/// The `head_commit` object of a push.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadCommit {
    /// Full commit SHA.
    pub id: Option<String>,
    /// Git author recorded on the commit.
    pub author: Option<CommitAuthor>,
    /// Every other member of the object (`message`, `timestamp`, ...).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl HeadCommit {
    /// Returns `true` only for a commit object with no members at all (`{}`).
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.author.is_none() && self.other.is_empty()
    }
}

/// Git author of a commit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitAuthor {
    /// Display name, which may differ from any GitHub login.
    pub name: Option<String>,
}

/// Account that performed a push.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pusher {
    /// GitHub account name of the pusher.
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------

/// Body of a `pull_request` webhook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestPayload {
    /// Lifecycle transition, e.g. `opened`, `closed`, `synchronize`.
    pub action: Option<String>,
    /// The pull request the transition applies to.
    pub pull_request: Option<PullRequest>,
}

/// The `pull_request` object of a `pull_request` webhook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequest {
    /// Repository-scoped pull request number.
    pub number: Option<u64>,
    /// Account that opened the pull request.
    pub user: Option<GitHubUser>,
    /// Source side of the pull request.
    pub head: Option<GitRef>,
    /// Target side of the pull request.
    pub base: Option<GitRef>,
    /// Set on `closed` transitions; `true` when the close was a merge.
    pub merged: Option<bool>,
    /// Account that merged the pull request. `null` until merged.
    pub merged_by: Option<GitHubUser>,
}

/// A GitHub account reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubUser {
    /// Account login, e.g. `octocat`.
    pub login: Option<String>,
}

/// One side of a pull request. `ref` is the bare branch name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitRef {
    /// Branch name.
    #[serde(rename = "ref")]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------

/// Deserializes a typed payload view from a raw JSON value.
///
/// # Errors
///
/// Returns [`MalformedPayloadError::Schema`] if the payload is not an object
/// or a modelled field has the wrong JSON type.
pub fn parse<T: DeserializeOwned>(payload: &Value) -> Result<T, MalformedPayloadError> {
    if !payload.is_object() {
        return Err(MalformedPayloadError::Schema {
            message: "payload is not a JSON object".to_string(),
        });
    }
    Ok(T::deserialize(payload)?)
}
