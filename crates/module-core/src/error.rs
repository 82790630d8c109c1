//! Module error types.

use thiserror::Error;

/// Errors a module reports back to the dispatcher or the process lifecycle.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Module could not start.
    #[error("module {module} failed to initialize: {message}")]
    Initialize { module: String, message: String },

    /// Module did not stop cleanly.
    #[error("module {module} failed to shut down: {message}")]
    Shutdown { module: String, message: String },

    /// Event handling failed inside the module.
    #[error(transparent)]
    Handler(Box<dyn std::error::Error + Send + Sync>),
}

impl ModuleError {
    /// Wrap a module's own error type.
    pub fn handler(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        ModuleError::Handler(Box::new(err))
    }
}
