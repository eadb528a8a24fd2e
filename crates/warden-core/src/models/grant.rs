//! Ability grant model — a user's role membership in one domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (user, domain, ability) membership record.
///
/// At most one row exists per (user_id, domain_code, ability_code);
/// re-granting updates the row in place. `granted = false` is a soft
/// revocation marker, never a deletion — together with `granted_by`
/// and `created_at` this keeps a full audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityGrant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub domain_code: String,
    pub ability_code: String,
    pub granted: bool,
    /// The actor whose mutation last touched this row.
    pub granted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for the atomic grant upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertGrant {
    pub user_id: Uuid,
    pub domain_code: String,
    pub ability_code: String,
    pub granted: bool,
    pub granted_by: Option<Uuid>,
}
