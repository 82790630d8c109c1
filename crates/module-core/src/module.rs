//! The Module trait definition.

use async_trait::async_trait;
use github_client::WebhookEvent;

use crate::error::ModuleError;

/// A named feature handler for webhook events.
///
/// This trait is object-safe and is stored as `Arc<dyn Module>`.
#[async_trait]
pub trait Module: Send + Sync {
    /// Unique registry key for this module.
    fn name(&self) -> &str;

    /// React to one webhook delivery.
    ///
    /// # Arguments
    ///
    /// * `event` - The classified event. Modules ignore types they do not handle.
    /// * `raw` - The exact body the signature was checked against.
    async fn handle_event(&self, event: &WebhookEvent, raw: &[u8]) -> Result<(), ModuleError>;

    /// Prepare the module before the first event (check storage, start timers).
    ///
    /// Default implementation does nothing.
    async fn initialize(&self) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Stop background work.
    ///
    /// Default implementation does nothing.
    async fn shutdown(&self) -> Result<(), ModuleError> {
        Ok(())
    }
}
