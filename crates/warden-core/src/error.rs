//! Error types for the Warden system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WardenError {
    #[error("{entity} not found: {code}")]
    NotFound { entity: String, code: String },

    #[error("{entity} already exists: {code}")]
    AlreadyExists { entity: String, code: String },

    #[error("invalid state: {message}")]
    InvalidState { message: String },

    #[error("permission denied: {permission} in domain {domain}")]
    PermissionDenied { domain: String, permission: String },

    #[error("ability denied: {ability} in domain {domain}")]
    AbilityDenied { domain: String, ability: String },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl WardenError {
    /// Shorthand for a `NotFound` referencing a catalog entity by code.
    pub fn not_found(entity: &str, code: &str) -> Self {
        Self::NotFound {
            entity: entity.into(),
            code: code.into(),
        }
    }
}

pub type WardenResult<T> = Result<T, WardenError>;
