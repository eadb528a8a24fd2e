//! Domain (tenant) model.
//!
//! A domain is a tenant boundary. All grants, overrides, and
//! resolution are scoped to a single domain. Grants reference the
//! domain by `code`, not by record identity, so renaming the
//! human-readable `name` never breaks existing grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: Uuid,
    /// Globally unique, immutable scoping key (e.g., `main-store`).
    pub code: String,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a new domain. New domains start active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDomain {
    pub code: String,
    pub name: String,
    pub description: String,
}
