use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use events::{IngestOutcome, QueryLimit};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::responses::{ApiError, HealthResponse, WebhookResponse};
use crate::{AppState, DELIVERY_HEADER, EVENT_KIND_HEADER};

const HOME_PAGE: &str = include_str!("../assets/index.html");

pub(crate) async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[instrument(skip_all, fields(
    event_kind = header(&headers, EVENT_KIND_HEADER).unwrap_or(""),
    delivery_id = header(&headers, DELIVERY_HEADER).unwrap_or(""),
))]
pub(crate) async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    debug!("Received webhook");

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "Webhook body is not valid JSON");
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse::error(format!("invalid JSON body: {err}"))),
            )
                .into_response();
        }
    };

    let outcome = state
        .ingest
        .handle(header(&headers, EVENT_KIND_HEADER), &payload)
        .await;

    // Every ingest failure, including a store failure, is reported as 400.
    let status = match &outcome {
        IngestOutcome::Stored(_) | IngestOutcome::Ignored(_) => StatusCode::OK,
        IngestOutcome::Failed(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(WebhookResponse::from(&outcome))).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct EventsParams {
    limit: Option<String>,
}

#[instrument(skip(state))]
pub(crate) async fn list_events(
    State(state): State<AppState>,
    params: Result<Query<EventsParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            let message = format!("invalid query string: {}", rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(ApiError::new(message))).into_response();
        }
    };

    let limit = match QueryLimit::parse(params.limit.as_deref()) {
        Ok(limit) => limit,
        Err(err) => {
            return (StatusCode::BAD_REQUEST, Json(ApiError::new(err.to_string()))).into_response()
        }
    };

    match state.query.recent(limit).await {
        Ok(events) => Json(events).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new("failed to load events")),
        )
            .into_response(),
    }
}
