use std::sync::Mutex;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::EventAction;

#[derive(Default)]
struct RecordingStore {
    events: Mutex<Vec<Event>>,
}

#[async_trait]
impl EventStore for RecordingStore {
    async fn insert(&self, event: &Event) -> Result<(), StorageError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn query(&self, limit: QueryLimit) -> Result<Vec<Event>, StorageError> {
        let events = self.events.lock().unwrap();
        Ok(events.iter().rev().take(limit.as_usize()).cloned().collect())
    }
}

struct FailingStore;

#[async_trait]
impl EventStore for FailingStore {
    async fn insert(&self, _event: &Event) -> Result<(), StorageError> {
        Err(StorageError::Unavailable {
            message: "disk on fire".to_string(),
        })
    }

    async fn query(&self, _limit: QueryLimit) -> Result<Vec<Event>, StorageError> {
        Err(StorageError::Backend {
            message: "no such table: events".to_string(),
        })
    }
}

fn push_payload() -> Value {
    json!({
        "head_commit": { "id": "abcdef1234567", "author": { "name": "Ann" } },
        "ref": "refs/heads/main",
    })
}

// ---------------------------------------------------------------------------
// IngestHandler
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ingest_stores_normalized_event() {
    let store = Arc::new(RecordingStore::default());
    let handler = IngestHandler::new(store.clone());

    let outcome = handler.handle(Some("push"), &push_payload()).await;

    assert_eq!(outcome.status(), IngestStatus::Success);
    let stored = store.events.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].action(), EventAction::Push);
    assert_eq!(outcome, IngestOutcome::Stored(stored[0].clone()));
}

#[tokio::test]
async fn test_ingest_without_kind_is_ignored() {
    let store = Arc::new(RecordingStore::default());
    let handler = IngestHandler::new(store.clone());

    let outcome = handler.handle(None, &push_payload()).await;

    assert_eq!(outcome, IngestOutcome::Ignored(IgnoreReason::MissingEventKind));
    assert!(store.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_ingest_unsupported_kind_is_ignored() {
    let store = Arc::new(RecordingStore::default());
    let handler = IngestHandler::new(store.clone());

    let outcome = handler.handle(Some("ping"), &json!({ "zen": "hi" })).await;

    assert_eq!(
        outcome,
        IngestOutcome::Ignored(IgnoreReason::UnsupportedKind("ping".to_string()))
    );
    assert_eq!(outcome.status().as_str(), "ignored");
}

#[tokio::test]
async fn test_ingest_filtered_pull_request_is_ignored() {
    let store = Arc::new(RecordingStore::default());
    let handler = IngestHandler::new(store.clone());
    let payload = json!({
        "action": "closed",
        "pull_request": {
            "number": 9,
            "merged": false,
            "user": { "login": "ann" },
            "head": { "ref": "feature" },
            "base": { "ref": "main" },
        },
    });

    let outcome = handler.handle(Some("pull_request"), &payload).await;

    assert_eq!(
        outcome,
        IngestOutcome::Ignored(IgnoreReason::Filtered(EventKind::PullRequest))
    );
    assert!(store.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_ingest_malformed_payload_fails_without_storing() {
    let store = Arc::new(RecordingStore::default());
    let handler = IngestHandler::new(store.clone());
    let payload = json!({ "head_commit": { "id": "abcdef1234567" } });

    let outcome = handler.handle(Some("push"), &payload).await;

    assert_eq!(
        outcome,
        IngestOutcome::Failed(IngestError::Malformed(MalformedPayloadError::MissingField {
            field: "ref"
        }))
    );
    assert_eq!(outcome.status(), IngestStatus::Error);
    assert!(store.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_ingest_storage_failure_is_reported_not_raised() {
    let handler = IngestHandler::new(Arc::new(FailingStore));

    let outcome = handler.handle(Some("push"), &push_payload()).await;

    assert!(matches!(
        outcome,
        IngestOutcome::Failed(IngestError::Storage(StorageError::Unavailable { .. }))
    ));
}

// ---------------------------------------------------------------------------
// QueryHandler
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_query_returns_store_result_verbatim() {
    let store = Arc::new(RecordingStore::default());
    let ingest = IngestHandler::new(store.clone());
    let query = QueryHandler::new(store.clone());

    for id in ["1111111aaaa", "2222222bbbb", "3333333cccc"] {
        let payload = json!({
            "head_commit": { "id": id },
            "ref": "refs/heads/main",
        });
        ingest.handle(Some("push"), &payload).await;
    }

    let events = query.recent(QueryLimit::new(2)).await.unwrap();
    let expected = store.query(QueryLimit::new(2)).await.unwrap();
    assert_eq!(events, expected);
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn test_query_propagates_storage_error() {
    let query = QueryHandler::new(Arc::new(FailingStore));

    let err = query.recent(QueryLimit::DEFAULT).await.unwrap_err();

    assert!(matches!(err, StorageError::Backend { .. }));
}
