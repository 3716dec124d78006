//! Newtype domain identifiers.
//!
//! Every value with an identity in a canonical event is a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`BranchName`] with a [`RequestId`] even though both are strings under the
//! hood.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (GitHub-assigned integers).
// Generates: struct (Copy), new(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — GitHub-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// Identifies a GitHub Pull Request by its repository-scoped number.
    PullRequestId
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed (Git names)
// ---------------------------------------------------------------------------

string_id! {
    /// A Git branch name (e.g. `"main"`, `"feature/login"`).
    BranchName
}

string_id! {
    /// A Git commit SHA as reported by GitHub (normally 40 lowercase hex characters).
    CommitSha
}

/// Number of leading SHA characters kept in a push event's request identifier.
pub const SHORT_SHA_LEN: usize = 7;

impl CommitSha {
    /// Returns the abbreviated form of this SHA (the first
    /// [`SHORT_SHA_LEN`] characters, or the whole value if it is shorter).
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_SHA_LEN) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

string_id! {
    /// Short identifier of the change an event refers to.
    ///
    /// For a push this is the abbreviated head commit SHA; for a pull request
    /// it is the stringified pull request number.
    RequestId
}

impl From<&CommitSha> for RequestId {
    fn from(sha: &CommitSha) -> Self {
        Self(sha.short().to_string())
    }
}

impl From<PullRequestId> for RequestId {
    fn from(number: PullRequestId) -> Self {
        Self(number.to_string())
    }
}

#[cfg(test)]
#[path = "identifiers_tests.rs"]
mod tests;
