//! On-call error types.

use database::DatabaseError;
use module_core::ModuleError;
use thiserror::Error;

/// Errors raised while handling a command or sweeping.
#[derive(Debug, Error)]
pub enum OnCallError {
    /// Persistence failed; the command was abandoned.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<OnCallError> for ModuleError {
    fn from(err: OnCallError) -> Self {
        ModuleError::handler(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_handler_error() {
        let err = OnCallError::from(DatabaseError::SchemaMissing("escalations"));
        let module_err = ModuleError::from(err);
        assert!(matches!(module_err, ModuleError::Handler(_)));
        assert!(module_err.to_string().contains("missing table escalations"));
    }
}
