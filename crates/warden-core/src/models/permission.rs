//! Permission model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{WardenError, WardenResult};

/// The universal-match permission code.
///
/// Holding `*` passes every permission check in a domain. It is never
/// expanded into the set of known permissions; the predicate layer
/// matches it directly.
pub const WILDCARD: &str = "*";

/// An atomic, non-composable grant unit.
///
/// Codes follow the `resource:action` format (e.g., `orders:refund`),
/// with [`WILDCARD`] as the single exception.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub resource: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a new permission.
///
/// `resource` and `action` are derived from the code via
/// [`split_code`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub code: String,
    pub name: String,
}

/// Splits a permission code into its `(resource, action)` parts.
///
/// The wildcard decomposes into `("*", "*")`. Any other code must
/// contain exactly one `:` separator with non-empty parts.
pub fn split_code(code: &str) -> WardenResult<(String, String)> {
    if code == WILDCARD {
        return Ok((WILDCARD.into(), WILDCARD.into()));
    }
    match code.split_once(':') {
        Some((resource, action)) if !resource.is_empty() && !action.is_empty() => {
            Ok((resource.into(), action.into()))
        }
        _ => Err(WardenError::Validation {
            message: format!("malformed permission code: {code}"),
        }),
    }
}
