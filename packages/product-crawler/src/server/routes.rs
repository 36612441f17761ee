use axum::{body::Bytes, extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use tracing::{debug, warn};

use super::AppState;
use crate::messaging::{ControlResponse, MessageEnvelope, NewUrlRequest, NEW_URL_TOPIC};
use crate::supervisor::Ack;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    active_sessions: usize,
}

pub async fn health_handler(Extension(state): Extension<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            active_sessions: state.supervisor.active_sessions(),
        }),
    )
}

/// Control endpoint. Always answers 200; every outcome is acknowledgment-level.
pub async fn messages_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> (StatusCode, Json<ControlResponse>) {
    let response = match serde_json::from_slice::<MessageEnvelope>(&body) {
        Ok(envelope) => handle_control_message(&state, &envelope).await,
        Err(e) => {
            warn!(error = %e, "Malformed control envelope");
            ControlResponse::bare()
        }
    };
    (StatusCode::OK, Json(response))
}

/// Dispatch one control message by topic.
pub async fn handle_control_message(state: &AppState, envelope: &MessageEnvelope) -> ControlResponse {
    if envelope.topic != NEW_URL_TOPIC {
        debug!(topic = %envelope.topic, sender = %envelope.sender, "Ignoring control message");
        return ControlResponse::bare();
    }

    let request: NewUrlRequest = match serde_json::from_str(&envelope.content) {
        Ok(request) => request,
        Err(e) => {
            warn!(sender = %envelope.sender, error = %e, "Malformed start-crawl content");
            return ControlResponse::bare();
        }
    };

    let ack = state
        .supervisor
        .on_start_crawl_request(&request.url, &envelope.sender, request.dborigin)
        .await;

    let message = match &ack {
        Ack::Accepted { .. } => "Scrape started",
        Ack::AlreadyRunning { .. } => "Scrape already in progress",
        Ack::Fresh { .. } => "Domain scraped recently",
        Ack::Rejected { .. } => return ControlResponse::bare(),
    };

    ControlResponse::begin_scrape(message, ack.seed()).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to encode begin-scrape response");
        ControlResponse::bare()
    })
}
