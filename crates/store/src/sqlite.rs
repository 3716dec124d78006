use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use events::{Event, EventRecord, EventStore, QueryLimit, StorageError};
use rusqlite::{params, Connection, ErrorCode};
use tracing::{debug, instrument};

/// [`EventStore`] backed by a single SQLite connection.
///
/// The connection is guarded by a mutex and every operation runs on the
/// blocking thread pool, so the store can be shared across async tasks.
#[derive(Clone)]
pub struct SqliteEventStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEventStore {
    /// Opens (creating if needed) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file cannot be opened or the schema
    /// cannot be created.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::Unavailable {
            message: format!("failed to open database {}: {e}", path.display()),
        })?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(storage_error)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        init_schema(&conn).map_err(storage_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking thread pool.
    async fn with_connection<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StorageError::Unavailable {
                message: "database connection lock poisoned".to_string(),
            })?;
            f(&*guard)
        })
        .await
        .map_err(|e| StorageError::Unavailable {
            message: format!("storage worker failed: {e}"),
        })?
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            request_id TEXT NOT NULL,
            author TEXT NOT NULL,
            action TEXT NOT NULL,
            from_branch TEXT,
            to_branch TEXT NOT NULL,
            timestamp TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_events_recent ON events(timestamp DESC, id DESC);
        "#,
    )
}

/// Maps a SQLite error onto the domain error, treating lock contention and
/// open failures as unavailability.
fn storage_error(err: rusqlite::Error) -> StorageError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen) => {
            StorageError::Unavailable {
                message: err.to_string(),
            }
        }
        _ => StorageError::Backend {
            message: err.to_string(),
        },
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    #[instrument(skip(self, event), fields(request_id = %event.request_id()))]
    async fn insert(&self, event: &Event) -> Result<(), StorageError> {
        let record = EventRecord::from(event.clone());
        self.with_connection(move |conn| {
            conn.execute(
                r#"
                INSERT INTO events (request_id, author, action, from_branch, to_branch, timestamp)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    record.request_id,
                    record.author,
                    record.action,
                    record.from_branch,
                    record.to_branch,
                    record.timestamp,
                ],
            )
            .map_err(storage_error)?;
            debug!(row_id = conn.last_insert_rowid(), "Inserted event row");
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn query(&self, limit: QueryLimit) -> Result<Vec<Event>, StorageError> {
        if limit.is_zero() {
            return Ok(Vec::new());
        }

        let records = self
            .with_connection(move |conn| {
                let mut stmt = conn
                    .prepare(
                        r#"
                        SELECT request_id, author, action, from_branch, to_branch, timestamp
                        FROM events
                        ORDER BY timestamp DESC, id DESC
                        LIMIT ?1
                        "#,
                    )
                    .map_err(storage_error)?;

                let rows = stmt
                    .query_map(params![i64::from(limit.as_u32())], |row| {
                        Ok(EventRecord {
                            request_id: row.get(0)?,
                            author: row.get(1)?,
                            action: row.get(2)?,
                            from_branch: row.get(3)?,
                            to_branch: row.get(4)?,
                            timestamp: row.get(5)?,
                        })
                    })
                    .map_err(storage_error)?;

                let records = rows.collect::<Result<Vec<_>, _>>().map_err(storage_error)?;
                Ok(records)
            })
            .await?;

        records
            .into_iter()
            .map(|record| Event::try_from(record).map_err(StorageError::from))
            .collect()
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
