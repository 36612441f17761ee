//! HTTP control endpoint.

pub mod routes;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::supervisor::SessionSupervisor;

pub use routes::handle_control_message;

/// Shared state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub supervisor: Arc<SessionSupervisor>,
}

pub fn build_app(supervisor: Arc<SessionSupervisor>) -> Router {
    let state = AppState { supervisor };

    Router::new()
        .route("/messages", post(routes::messages_handler))
        .route("/health", get(routes::health_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}
