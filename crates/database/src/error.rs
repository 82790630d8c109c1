//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, pool, transaction control)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Query failed while operating on a specific record
    #[error("{op} {entity} {id} failed: {source}")]
    Query {
        op: &'static str,
        entity: &'static str,
        id: String,
        #[source]
        source: sqlx::Error,
    },

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// A required table is missing; migrations have not been applied
    #[error("schema not ready: missing table {0}")]
    SchemaMissing(&'static str),
}

impl DatabaseError {
    /// Wrap a query failure with the operation and record it concerned.
    pub(crate) fn query(
        op: &'static str,
        entity: &'static str,
        id: impl Into<String>,
        source: sqlx::Error,
    ) -> Self {
        DatabaseError::Query {
            op,
            entity,
            id: id.into(),
            source,
        }
    }

    /// Like [`DatabaseError::query`], but unique violations become `AlreadyExists`.
    pub(crate) fn write(
        op: &'static str,
        entity: &'static str,
        id: impl Into<String>,
        source: sqlx::Error,
    ) -> Self {
        if let sqlx::Error::Database(ref db_err) = source {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity,
                    id: id.into(),
                };
            }
        }
        Self::query(op, entity, id, source)
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
