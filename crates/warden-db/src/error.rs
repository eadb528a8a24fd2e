//! Database-specific error types and conversions.

use warden_core::error::WardenError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with code {code}")]
    NotFound { entity: String, code: String },

    #[error("Record already exists: {entity} with code {code}")]
    AlreadyExists { entity: String, code: String },
}

impl From<DbError> for WardenError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, code } => WardenError::NotFound { entity, code },
            DbError::AlreadyExists { entity, code } => WardenError::AlreadyExists { entity, code },
            other => WardenError::Database(other.to_string()),
        }
    }
}
