//! Pager webhook gateway.
//!
//! Receives signed GitHub webhook deliveries, verifies them, and hands them
//! to every registered feature module. Also serves liveness and readiness
//! probes.
//!
//! # Endpoints
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `POST` | `/webhook` | 200 dispatched, 400 unreadable or unparseable, 401 bad signature |
//! | `GET` | `/check/liveness` | `{"status":"UP"}` |
//! | `GET` | `/check/readiness` | `{"status":"UP"}`, or 503 when the database is unreachable |

pub mod config;
pub mod error;
pub mod routes;
pub mod signature;
pub mod state;

use axum::Router;

pub use config::{Config, ConfigError};
pub use error::GatewayError;
pub use state::AppState;

/// Build the application with its state attached.
pub fn app(state: AppState) -> Router {
    routes::router().with_state(state)
}
