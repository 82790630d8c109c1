//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use module_core::Dispatcher;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection, pinged by the readiness probe.
    pub db: Database,
    /// Hands verified events to the registered modules.
    pub dispatcher: Dispatcher,
    /// Webhook HMAC secret.
    pub webhook_secret: Arc<[u8]>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, dispatcher: Dispatcher, webhook_secret: impl AsRef<[u8]>) -> Self {
        Self {
            db,
            dispatcher,
            webhook_secret: Arc::from(webhook_secret.as_ref()),
        }
    }
}
