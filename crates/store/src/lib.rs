//! hooklog event storage infrastructure.
//!
//! Implements the [`events::EventStore`] trait with two backends:
//!
//! - [`SqliteEventStore`] — one SQLite file (or in-memory database) holding an
//!   append-only `events` table. The production backend.
//! - [`MemoryEventStore`] — a process-local vector. Used for tests and for
//!   throwaway runs where nothing needs to survive a restart.
//!
//! Both order query results newest first by timestamp, breaking ties by
//! reverse insertion order.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** SQL, connection handling, and blocking-thread offload
//! all live here. The [`events`] crate sees only [`events::EventStore`].

mod memory;
mod sqlite;

pub use memory::MemoryEventStore;
pub use sqlite::SqliteEventStore;
