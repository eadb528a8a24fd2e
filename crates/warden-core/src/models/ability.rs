//! Ability (role bundle) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The distinguished ability whose bundle contains the wildcard
/// permission. Subject to the self-lockout guard on revocation.
pub const SUPER_ADMIN: &str = "super-admin";

/// A named, mutable bundle of permissions.
///
/// Grants reference an ability by `code` and resolution reads the
/// bundle at check time, so editing `permissions` retroactively
/// changes what every grantee can do. This is the point: role
/// definitions stay centralized in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ability {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    /// Permission codes bundled by this ability.
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a new ability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAbility {
    pub code: String,
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}
