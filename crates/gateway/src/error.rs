//! Error types for the webhook gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors returned to the webhook sender.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Signature missing or wrong.
    #[error("invalid signature")]
    Unauthorized,

    /// Body unreadable or not a valid event.
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::Unauthorized => {
                tracing::warn!("Rejected webhook with invalid signature");
                StatusCode::UNAUTHORIZED
            }
            GatewayError::BadRequest(msg) => {
                tracing::warn!("Rejected webhook: {}", msg);
                StatusCode::BAD_REQUEST
            }
        };

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for gateway handlers.
pub type Result<T> = std::result::Result<T, GatewayError>;
