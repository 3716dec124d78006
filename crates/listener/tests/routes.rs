//! End-to-end route behaviour against an in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use events::{Event, EventStore, QueryLimit, StorageError};
use listener::responses::{HealthResponse, WebhookResponse, STORE_FAILURE_MESSAGE};
use listener::{router, AppState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use store::MemoryEventStore;
use tower::ServiceExt;

fn app_with(store: Arc<dyn EventStore>) -> Router {
    router(AppState::new(store))
}

fn webhook(kind: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-GitHub-Delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958");
    if let Some(kind) = kind {
        builder = builder.header("X-GitHub-Event", kind);
    }
    builder.body(body.into()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn push_body(sha: &str) -> String {
    json!({
        "ref": "refs/heads/main",
        "head_commit": { "id": sha, "author": { "name": "Ann" } },
        "pusher": { "name": "ann" },
    })
    .to_string()
}

fn merged_pr_body() -> String {
    json!({
        "action": "closed",
        "number": 42,
        "pull_request": {
            "number": 42,
            "merged": true,
            "merged_by": { "login": "bob" },
            "user": { "login": "ann" },
            "head": { "ref": "feature" },
            "base": { "ref": "main" },
        },
    })
    .to_string()
}

struct BrokenStore;

#[async_trait]
impl EventStore for BrokenStore {
    async fn insert(&self, _event: &Event) -> Result<(), StorageError> {
        Err(StorageError::Backend {
            message: "disk I/O error at /var/lib/hooklog.db".to_string(),
        })
    }

    async fn query(&self, _limit: QueryLimit) -> Result<Vec<Event>, StorageError> {
        Err(StorageError::Unavailable {
            message: "database is locked".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// POST /webhook
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_push_webhook_is_stored_and_listed() {
    let app = app_with(Arc::new(MemoryEventStore::new()));

    let (status, body) = send(&app, webhook(Some("push"), push_body("abcdef1234567"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success" }));

    let (status, events) = send(&app, get("/api/events")).await;
    assert_eq!(status, StatusCode::OK);
    let event = &events[0];
    assert_eq!(event["request_id"], "abcdef1");
    assert_eq!(event["author"], "Ann");
    assert_eq!(event["action"], "PUSH");
    assert_eq!(event["from_branch"], Value::Null);
    assert_eq!(event["to_branch"], "main");
    assert!(event["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_merge_webhook_is_stored() {
    let app = app_with(Arc::new(MemoryEventStore::new()));

    let (status, body) = send(&app, webhook(Some("pull_request"), merged_pr_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success" }));

    let (_, events) = send(&app, get("/api/events")).await;
    assert_eq!(events[0]["action"], "MERGE");
    assert_eq!(events[0]["author"], "bob");
    assert_eq!(events[0]["from_branch"], "feature");
}

#[tokio::test]
async fn test_unsupported_or_missing_kind_is_ignored() {
    let store = Arc::new(MemoryEventStore::new());
    let app = app_with(store.clone());

    let (status, body) = send(&app, webhook(Some("issues"), "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ignored" }));

    let (status, body) = send(&app, webhook(None, push_body("abcdef1234567"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ignored" }));

    assert!(store.query(QueryLimit::DEFAULT).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_filtered_push_is_ignored() {
    let app = app_with(Arc::new(MemoryEventStore::new()));
    let body = json!({ "ref": "refs/tags/v1", "head_commit": null }).to_string();

    let (status, body) = send(&app, webhook(Some("push"), body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ignored" }));
}

#[tokio::test]
async fn test_malformed_payload_is_client_error_with_message() {
    let app = app_with(Arc::new(MemoryEventStore::new()));
    let body = json!({ "head_commit": { "id": "abcdef1234567" } }).to_string();

    let (status, body) = send(&app, webhook(Some("push"), body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: WebhookResponse = serde_json::from_value(body).unwrap();
    assert_eq!(response.status, "error");
    assert!(response.message.unwrap().contains("'ref'"));
}

#[tokio::test]
async fn test_invalid_json_is_client_error() {
    let app = app_with(Arc::new(MemoryEventStore::new()));

    let (status, body) = send(&app, webhook(Some("push"), "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_store_failure_is_error_without_backend_details() {
    let app = app_with(Arc::new(BrokenStore));

    let (status, body) = send(&app, webhook(Some("push"), push_body("abcdef1234567"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "status": "error", "message": STORE_FAILURE_MESSAGE })
    );
}

// ---------------------------------------------------------------------------
// GET /api/events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_events_are_listed_newest_first_and_limited() {
    let app = app_with(Arc::new(MemoryEventStore::new()));
    for sha in ["1111111aaa", "2222222bbb", "3333333ccc"] {
        send(&app, webhook(Some("push"), push_body(sha))).await;
    }

    let (status, events) = send(&app, get("/api/events?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["request_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["3333333", "2222222"]);
}

#[tokio::test]
async fn test_zero_limit_returns_empty_array() {
    let app = app_with(Arc::new(MemoryEventStore::new()));
    send(&app, webhook(Some("push"), push_body("abcdef1234567"))).await;

    let (status, body) = send(&app, get("/api/events?limit=0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_invalid_limit_is_client_error() {
    let app = app_with(Arc::new(MemoryEventStore::new()));

    for uri in ["/api/events?limit=abc", "/api/events?limit=-5"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].as_str().unwrap().contains("Invalid limit"), "{uri}");
    }
}

#[tokio::test]
async fn test_repeated_limit_is_json_client_error() {
    let app = app_with(Arc::new(MemoryEventStore::new()));

    let (status, body) = send(&app, get("/api/events?limit=1&limit=2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid query string"));
}

#[tokio::test]
async fn test_query_store_failure_is_server_error() {
    let app = app_with(Arc::new(BrokenStore));

    let (status, body) = send(&app, get("/api/events")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "failed to load events" }));
}

// ---------------------------------------------------------------------------
// GET /api/health and /
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_reports_healthy_with_timestamp() {
    let app = app_with(Arc::new(MemoryEventStore::new()));

    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn test_home_page_is_html() {
    let app = app_with(Arc::new(MemoryEventStore::new()));

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn test_cors_headers_are_present() {
    let app = app_with(Arc::new(MemoryEventStore::new()));
    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
