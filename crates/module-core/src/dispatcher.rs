//! Fire-and-forget event dispatch.
//!
//! Each delivery is handed to every registered module as an independent task.
//! The caller never waits for handlers, and a failing handler neither affects
//! the caller nor cancels its siblings. There is no delivery guarantee: a
//! handler that errors or is still running when the process exits does not
//! see the event again.

use std::sync::Arc;
use std::time::Duration;

use github_client::WebhookEvent;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

use crate::registry::ModuleRegistry;

/// Fans webhook events out to registered modules.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ModuleRegistry>,
    tracker: TaskTracker,
}

impl Dispatcher {
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self {
            registry,
            tracker: TaskTracker::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Spawn one handler task per registered module and return immediately.
    ///
    /// Returns the number of tasks spawned.
    pub fn dispatch(&self, event: WebhookEvent, raw: Vec<u8>) -> usize {
        let modules = self.registry.list();
        let event = Arc::new(event);
        let raw: Arc<[u8]> = raw.into();

        for module in &modules {
            let module = Arc::clone(module);
            let event = Arc::clone(&event);
            let raw = Arc::clone(&raw);

            self.tracker.spawn(async move {
                debug!(module = %module.name(), event = %event.event_type(), "Dispatching event");
                if let Err(e) = module.handle_event(&event, &raw).await {
                    error!(
                        module = %module.name(),
                        event = %event.event_type(),
                        "Module failed to handle event: {}",
                        e
                    );
                }
            });
        }

        modules.len()
    }

    /// Number of handler tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for in-flight handlers to finish, up to `timeout`.
    ///
    /// Only used at shutdown. Returns false if handlers were still running
    /// when the timeout expired.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    remaining = self.tracker.len(),
                    "Timed out waiting for module handlers"
                );
                false
            }
        }
    }
}
