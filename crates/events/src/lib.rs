//! Core event domain for hooklog.
//!
//! This crate turns GitHub webhook notifications into canonical [`Event`]
//! records and defines the storage port those records are written to.
//! Infrastructure crates implement [`EventStore`]; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RequestId`, `BranchName`, `CommitSha`, ...) |
//! | [`types`] | `Event`, `EventAction`, `EventKind`, `Timestamp` |
//! | [`payload`] | Typed views of the `push` and `pull_request` webhook bodies |
//! | [`normalizer`] | Raw notification → optional `Event` |
//! | [`store`] | `EventStore` port and `QueryLimit` |
//! | [`handlers`] | `IngestHandler` and `QueryHandler` |
//! | [`errors`] | Domain error types |

pub mod errors;
pub mod handlers;
pub mod identifiers;
pub mod normalizer;
pub mod payload;
pub mod store;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{InvalidEventRecord, MalformedPayloadError, StorageError, ValidationError};
pub use handlers::{
    IgnoreReason, IngestError, IngestHandler, IngestOutcome, IngestStatus, QueryHandler,
};
pub use identifiers::{BranchName, CommitSha, PullRequestId, RequestId};
pub use normalizer::process;
pub use store::{EventStore, QueryLimit};
pub use types::{Event, EventAction, EventKind, EventRecord, Timestamp};
