//! GitHub webhook ingress.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use github_client::WebhookEvent;
use tracing::{debug, info};

use crate::error::{GatewayError, Result};
use crate::signature::{self, SIGNATURE_HEADER};
use crate::state::AppState;

/// Header naming the event type.
pub const EVENT_HEADER: &str = "X-GitHub-Event";

/// Verify, classify and dispatch one delivery.
///
/// The signature is checked against the exact received bytes before any
/// parsing. Once the event parses the response is 200, whatever the modules
/// later make of it.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    signature::verify(&state.webhook_secret, signature, &body)?;

    let event_type = headers
        .get(EVENT_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| GatewayError::BadRequest(format!("missing {} header", EVENT_HEADER)))?;

    let event = WebhookEvent::parse(event_type, &body)
        .map_err(|e| GatewayError::BadRequest(format!("could not parse event: {}", e)))?;

    let delivery = headers
        .get("X-GitHub-Delivery")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");
    info!(event = %event_type, delivery = %delivery, "Received webhook");

    let modules = state.dispatcher.dispatch(event, body.to_vec());
    debug!(modules, "Dispatched webhook");

    Ok(StatusCode::OK)
}
