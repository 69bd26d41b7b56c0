//! Webhook dispatch handler.
//!
//! Runs behind the signature middleware, so the body bytes it receives are
//! exactly the bytes that were authenticated. Parses them into message
//! events and dispatches each in arrival order: text events are echoed
//! back, file events are persisted to object storage before the
//! confirmation reply, and anything else is recorded as unsupported.
//!
//! One event's failure never aborts its siblings and never changes the
//! HTTP status: reply tokens are single-use, so letting the platform retry
//! a partially failed batch cannot succeed and only burns tokens.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use kotori_core::{
    DispatchOutcome, DispatchSummary, FileEvent, HandlerError, MessageEvent, TextEvent,
};
use kotori_line::client::MessagingApi;
use kotori_line::webhook::parse_events;
use kotori_store::{object_key, ObjectStore};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::server::AppState;

/// Error response with code and message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Stable error code
    pub code: String,
    /// Human-readable error description
    pub message: String,
}

/// Dispatches a verified webhook call.
///
/// # Errors
///
/// Returns appropriate HTTP status codes:
/// - 400: Body parsed as signed but is not a valid event payload
/// - 401: Credentials became unavailable (fail closed)
/// - 200: Everything else, including per-event handler failures; the
///   response body carries the per-event outcomes
#[instrument(name = "handle_webhook", skip(state, body), fields(body_len = body.len()))]
pub async fn handle_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let events = match parse_events(&body) {
        Ok(events) => events,
        Err(e) => {
            warn!(code = e.code(), error = %e, "Rejecting unparseable webhook body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: ErrorDetail { code: e.code().to_string(), message: e.to_string() },
                }),
            )
                .into_response();
        },
    };

    // The middleware already warmed the cache; a failure here means the
    // store broke between the two reads, and the policy is still to deny.
    let credentials = match state.credentials.get().await {
        Ok(credentials) => credentials,
        Err(e) => {
            warn!(code = e.code(), error = %e, "Credentials unavailable after authorization");
            return StatusCode::UNAUTHORIZED.into_response();
        },
    };
    let access_token = credentials.access_token.clone();

    let mut summary = DispatchSummary::new();
    for event in events {
        let kind = event.kind_name().to_string();
        let outcome = dispatch_event(&state, &access_token, event).await;
        if let DispatchOutcome::Failed { kind: error_kind } = &outcome {
            warn!(event_kind = %kind, failure = ?error_kind, "Event dispatch failed");
        }
        summary.push(outcome);
    }

    info!(
        received = summary.received(),
        failed = summary.failed(),
        "Webhook dispatch completed"
    );

    (StatusCode::OK, Json(summary)).into_response()
}

/// Dispatches one event to its handler and maps the result to an outcome.
async fn dispatch_event(
    state: &AppState,
    access_token: &str,
    event: MessageEvent,
) -> DispatchOutcome {
    let result = match event {
        MessageEvent::Text(text) => respond_echo(state, access_token, &text).await,
        MessageEvent::File(file) => {
            return match persist_file(state, access_token, &file).await {
                Ok(key) => DispatchOutcome::Stored { object_key: key },
                Err(e) => DispatchOutcome::Failed { kind: e.kind() },
            };
        },
        MessageEvent::Unsupported { kind } => Err(HandlerError::UnsupportedEventType(kind)),
    };

    match result {
        Ok(()) => DispatchOutcome::Replied,
        Err(e) => DispatchOutcome::Failed { kind: e.kind() },
    }
}

/// Echoes the user's text back on the event's reply token.
async fn respond_echo(
    state: &AppState,
    access_token: &str,
    event: &TextEvent,
) -> Result<(), HandlerError> {
    let reply = format!("You said: {}", event.text);
    state
        .messaging
        .reply(access_token, &event.reply_token, &reply)
        .await
        .map_err(|e| HandlerError::ReplyApi(e.to_string()))
}

/// Fetches uploaded media, writes it to object storage, then confirms.
///
/// The confirmation reply is sent only after the write succeeds, so a
/// confirmed upload is always durable. A reply failure after a successful
/// write leaves the object in place and records the failure.
async fn persist_file(
    state: &AppState,
    access_token: &str,
    event: &FileEvent,
) -> Result<String, HandlerError> {
    let content = state
        .messaging
        .fetch_content(access_token, &event.media_id)
        .await
        .map_err(|e| HandlerError::MediaFetch(e.to_string()))?;

    let key = object_key(&event.media_id, &event.file_name);
    state
        .store
        .put(&key, &content.content_type, content.body)
        .await
        .map_err(|e| HandlerError::StorageWrite(e.to_string()))?;

    let confirmation = format!("Saved {}", event.file_name);
    state
        .messaging
        .reply(access_token, &event.reply_token, &confirmation)
        .await
        .map_err(|e| HandlerError::ReplyApi(e.to_string()))?;

    Ok(key)
}
