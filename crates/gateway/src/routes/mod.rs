//! Route handlers for the webhook gateway.

pub mod health;
pub mod webhook;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // GitHub deliveries
        .route("/webhook", post(webhook::receive))
        // Probes
        .route("/check/liveness", get(health::liveness))
        .route("/check/readiness", get(health::readiness))
        .layer(TraceLayer::new_for_http())
}
