//! SurrealDB implementation of [`OverrideRepository`].
//!
//! Same record-identity scheme as the grant store: the record ID is a
//! UUIDv5 of the (user, domain, permission) natural key, making the
//! `UPSERT` a single-record atomic insert-or-update.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::overrides::{PermissionOverride, UpsertOverride};
use warden_core::repository::OverrideRepository;

use crate::error::DbError;

/// Deterministic record ID for an override's natural key.
pub(crate) fn override_record_id(user_id: Uuid, domain_code: &str, permission_code: &str) -> Uuid {
    let key = format!("permission_override|{user_id}|{domain_code}|{permission_code}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}

#[derive(Debug, SurrealValue)]
struct OverrideRow {
    user_id: String,
    domain_code: String,
    permission_code: String,
    granted: bool,
    granted_by: Option<String>,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OverrideRowWithId {
    record_id: String,
    user_id: String,
    domain_code: String,
    permission_code: String,
    granted: bool,
    granted_by: Option<String>,
    created_at: DateTime<Utc>,
}

fn parse_granted_by(raw: Option<String>) -> Result<Option<Uuid>, DbError> {
    raw.map(|s| {
        Uuid::parse_str(&s).map_err(|e| DbError::Migration(format!("invalid actor UUID: {e}")))
    })
    .transpose()
}

impl OverrideRow {
    fn try_into_override(self, id: Uuid) -> Result<PermissionOverride, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(PermissionOverride {
            id,
            user_id,
            domain_code: self.domain_code,
            permission_code: self.permission_code,
            granted: self.granted,
            granted_by: parse_granted_by(self.granted_by)?,
            created_at: self.created_at,
        })
    }
}

impl OverrideRowWithId {
    fn try_into_override(self) -> Result<PermissionOverride, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(PermissionOverride {
            id,
            user_id,
            domain_code: self.domain_code,
            permission_code: self.permission_code,
            granted: self.granted,
            granted_by: parse_granted_by(self.granted_by)?,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the permission override store.
#[derive(Clone)]
pub struct SurrealOverrideRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOverrideRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OverrideRepository for SurrealOverrideRepository<C> {
    async fn upsert(&self, input: UpsertOverride) -> WardenResult<PermissionOverride> {
        let id = override_record_id(input.user_id, &input.domain_code, &input.permission_code);
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPSERT type::record('permission_override', $id) SET \
                 user_id = $user_id, domain_code = $domain_code, \
                 permission_code = $permission_code, \
                 granted = $granted, granted_by = $granted_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("domain_code", input.domain_code))
            .bind(("permission_code", input.permission_code))
            .bind(("granted", input.granted))
            .bind(("granted_by", input.granted_by.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<OverrideRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission override".into(),
            code: id_str,
        })?;

        row.try_into_override(id).map_err(Into::into)
    }

    async fn find(
        &self,
        user_id: Uuid,
        domain_code: &str,
        permission_code: &str,
    ) -> WardenResult<Option<PermissionOverride>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM permission_override \
                 WHERE user_id = $user_id \
                 AND domain_code = $domain_code \
                 AND permission_code = $permission_code",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("domain_code", domain_code.to_string()))
            .bind(("permission_code", permission_code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OverrideRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .next()
            .map(|row| row.try_into_override())
            .transpose()
            .map_err(Into::into)
    }

    async fn find_for_user(
        &self,
        user_id: Uuid,
        domain_code: &str,
    ) -> WardenResult<Vec<PermissionOverride>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM permission_override \
                 WHERE user_id = $user_id \
                 AND domain_code = $domain_code \
                 ORDER BY permission_code ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("domain_code", domain_code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OverrideRowWithId> = result.take(0).map_err(DbError::from)?;

        let overrides = rows
            .into_iter()
            .map(|row| row.try_into_override())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(overrides)
    }
}
