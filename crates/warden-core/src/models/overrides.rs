//! Permission override model — per-user, per-domain exceptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (user, domain, permission) exception record.
///
/// Overrides are applied after ability resolution and dominate it in
/// both directions: `granted = true` adds the permission, `granted =
/// false` removes it even when an ability bundle would grant it.
/// Uniqueness, upsert, and audit semantics match [`AbilityGrant`].
///
/// [`AbilityGrant`]: crate::models::grant::AbilityGrant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionOverride {
    pub id: Uuid,
    pub user_id: Uuid,
    pub domain_code: String,
    pub permission_code: String,
    pub granted: bool,
    pub granted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for the atomic override upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertOverride {
    pub user_id: Uuid,
    pub domain_code: String,
    pub permission_code: String,
    pub granted: bool,
    pub granted_by: Option<Uuid>,
}
