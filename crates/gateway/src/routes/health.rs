//! Liveness and readiness probes.

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// How long readiness waits for the database.
const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'static str>,
}

impl Health {
    fn up() -> Self {
        Self {
            status: "UP",
            details: None,
        }
    }
}

/// Up while the process is serving.
pub async fn liveness() -> Json<Health> {
    Json(Health::up())
}

/// Up when the database answers a ping within [`PING_TIMEOUT`].
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    match tokio::time::timeout(PING_TIMEOUT, state.db.ping()).await {
        Ok(Ok(())) => (StatusCode::OK, Json(Health::up())),
        Ok(Err(e)) => {
            tracing::warn!("Readiness check failed: {}", e);
            down()
        }
        Err(_) => {
            tracing::warn!("Readiness check timed out after {:?}", PING_TIMEOUT);
            down()
        }
    }
}

fn down() -> (StatusCode, Json<Health>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(Health {
            status: "DOWN",
            details: Some("Database connection failed"),
        }),
    )
}
