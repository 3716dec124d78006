//! Webhook normalization: raw GitHub notification → zero or one [`Event`].
//!
//! The normalizer is a set of pure, stateless functions. It never touches the
//! store and never defaults a structurally missing field; the only fallbacks
//! are the documented author chains.
//!
//! | Kind | Inner state | Result |
//! |------|-------------|--------|
//! | `push` | `head_commit` present | `PUSH` |
//! | `push` | `head_commit` absent/empty | ignored |
//! | `pull_request` | `opened` | `PULL_REQUEST` |
//! | `pull_request` | `closed`, merged | `MERGE` |
//! | `pull_request` | `closed`, not merged | ignored |
//! | `pull_request` | anything else | ignored |
//! | other | — | ignored |

use serde_json::Value;
use tracing::debug;

use crate::errors::MalformedPayloadError;
use crate::payload::{self, GitHubUser, GitRef, PullRequestPayload, PushPayload};
use crate::{BranchName, CommitSha, Event, EventKind, PullRequestId, RequestId};

/// Author recorded for pushes whose commit author and pusher are both unknown.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Normalizes a webhook notification identified by its GitHub event name.
///
/// Returns `Ok(None)` for unsupported kinds and for filtered states of the
/// supported ones.
///
/// # Errors
///
/// Returns [`MalformedPayloadError`] if a supported notification lacks a
/// required field or has fields of the wrong type.
pub fn process(
    event_kind: &str,
    payload: &Value,
) -> Result<Option<Event>, MalformedPayloadError> {
    match EventKind::parse(event_kind) {
        Some(kind) => process_kind(kind, payload),
        None => {
            debug!(event_kind, "Ignoring unsupported webhook event kind");
            Ok(None)
        }
    }
}

/// Normalizes a notification whose kind has already been recognised.
pub fn process_kind(
    kind: EventKind,
    payload: &Value,
) -> Result<Option<Event>, MalformedPayloadError> {
    match kind {
        EventKind::Push => {
            let push = payload::parse::<PushPayload>(payload)?;
            process_push_event(&push)
        }
        EventKind::PullRequest => {
            let pull_request = payload::parse::<PullRequestPayload>(payload)?;
            process_pull_request_event(&pull_request)
        }
    }
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

/// Normalizes a `push` notification.
///
/// # Errors
///
/// Returns [`MalformedPayloadError::MissingField`] if `ref` or the head
/// commit's `id` is missing.
pub fn process_push_event(payload: &PushPayload) -> Result<Option<Event>, MalformedPayloadError> {
    let commit = match &payload.head_commit {
        Some(commit) if !commit.is_empty() => commit,
        _ => {
            debug!("Ignoring push without a head commit");
            return Ok(None);
        }
    };

    let sha = commit
        .id
        .clone()
        .and_then(CommitSha::new)
        .ok_or(MalformedPayloadError::MissingField { field: "head_commit.id" })?;

    let author = commit
        .author
        .as_ref()
        .and_then(|a| non_empty(a.name.as_deref()))
        .or_else(|| payload.pusher.as_ref().and_then(|p| non_empty(p.name.as_deref())))
        .unwrap_or(UNKNOWN_AUTHOR);

    let git_ref = payload
        .git_ref
        .as_deref()
        .ok_or(MalformedPayloadError::MissingField { field: "ref" })?;
    let to_branch = branch_from_ref(git_ref)?;

    Ok(Some(Event::push(RequestId::from(&sha), author, to_branch)))
}

/// Strips a single leading `refs/heads/` from a pushed ref.
fn branch_from_ref(git_ref: &str) -> Result<BranchName, MalformedPayloadError> {
    let name = git_ref.strip_prefix(BRANCH_REF_PREFIX).unwrap_or(git_ref);
    BranchName::new(name).ok_or_else(|| MalformedPayloadError::InvalidField {
        field: "ref",
        reason: format!("'{git_ref}' does not name a branch"),
    })
}

// ---------------------------------------------------------------------------
// Pull request
// ---------------------------------------------------------------------------

/// Normalizes a `pull_request` notification.
///
/// Only `opened` and merged `closed` transitions produce an event.
///
/// # Errors
///
/// Returns [`MalformedPayloadError::MissingField`] if the inner `action`, the
/// `pull_request` object, or any of its number, author login, head ref, or
/// base ref is missing.
pub fn process_pull_request_event(
    payload: &PullRequestPayload,
) -> Result<Option<Event>, MalformedPayloadError> {
    let action = payload
        .action
        .as_deref()
        .ok_or(MalformedPayloadError::MissingField { field: "action" })?;
    if action != "opened" && action != "closed" {
        debug!(action, "Ignoring pull request action");
        return Ok(None);
    }

    let pr = payload
        .pull_request
        .as_ref()
        .ok_or(MalformedPayloadError::MissingField { field: "pull_request" })?;

    let number = pr
        .number
        .map(PullRequestId::new)
        .ok_or(MalformedPayloadError::MissingField { field: "pull_request.number" })?;
    let opener = login(pr.user.as_ref(), "pull_request.user.login")?;
    let from_branch = ref_name(pr.head.as_ref(), "pull_request.head.ref")?;
    let to_branch = ref_name(pr.base.as_ref(), "pull_request.base.ref")?;
    let request_id = RequestId::from(number);

    if action == "opened" {
        return Ok(Some(Event::pull_request(request_id, opener, from_branch, to_branch)));
    }

    if !pr.merged.unwrap_or(false) {
        debug!(%number, "Ignoring pull request closed without merge");
        return Ok(None);
    }

    let merger = pr
        .merged_by
        .as_ref()
        .and_then(|u| non_empty(u.login.as_deref()))
        .unwrap_or(opener);

    Ok(Some(Event::merge(request_id, merger, from_branch, to_branch)))
}

fn login<'a>(
    user: Option<&'a GitHubUser>,
    field: &'static str,
) -> Result<&'a str, MalformedPayloadError> {
    non_empty(user.and_then(|u| u.login.as_deref()))
        .ok_or(MalformedPayloadError::MissingField { field })
}

fn ref_name(
    git_ref: Option<&GitRef>,
    field: &'static str,
) -> Result<BranchName, MalformedPayloadError> {
    git_ref
        .and_then(|r| r.name.as_deref())
        .and_then(BranchName::new)
        .ok_or(MalformedPayloadError::MissingField { field })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "normalizer_tests.rs"]
mod tests;
