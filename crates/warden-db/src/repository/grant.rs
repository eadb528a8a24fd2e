//! SurrealDB implementation of [`GrantRepository`].
//!
//! Grant rows use a record ID derived deterministically (UUIDv5) from
//! the (user, domain, ability) natural key, so the `UPSERT` targets a
//! single record and concurrent first-time grants race to the same ID
//! instead of duplicating rows. The unique index on the natural key
//! is the backstop.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::grant::{AbilityGrant, UpsertGrant};
use warden_core::repository::GrantRepository;

use crate::error::DbError;

/// Deterministic record ID for a grant's natural key.
pub(crate) fn grant_record_id(user_id: Uuid, domain_code: &str, ability_code: &str) -> Uuid {
    let key = format!("ability_grant|{user_id}|{domain_code}|{ability_code}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}

#[derive(Debug, SurrealValue)]
struct GrantRow {
    user_id: String,
    domain_code: String,
    ability_code: String,
    granted: bool,
    granted_by: Option<String>,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct GrantRowWithId {
    record_id: String,
    user_id: String,
    domain_code: String,
    ability_code: String,
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

impl GrantRow {
    fn try_into_grant(self, id: Uuid) -> Result<AbilityGrant, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(AbilityGrant {
            id,
            user_id,
            domain_code: self.domain_code,
            ability_code: self.ability_code,
            granted: self.granted,
            granted_by: parse_granted_by(self.granted_by)?,
            created_at: self.created_at,
        })
    }
}

impl GrantRowWithId {
    fn try_into_grant(self) -> Result<AbilityGrant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(AbilityGrant {
            id,
            user_id,
            domain_code: self.domain_code,
            ability_code: self.ability_code,
            granted: self.granted,
            granted_by: parse_granted_by(self.granted_by)?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the ability grant store.
#[derive(Clone)]
pub struct SurrealGrantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGrantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> GrantRepository for SurrealGrantRepository<C> {
    async fn upsert(&self, input: UpsertGrant) -> WardenResult<AbilityGrant> {
        let id = grant_record_id(input.user_id, &input.domain_code, &input.ability_code);
        let id_str = id.to_string();

        // created_at comes from the schema default and is never
        // rewritten, so the row keeps its original timestamp across
        // re-grants and revocations.
        let result = self
            .db
            .query(
                "UPSERT type::record('ability_grant', $id) SET \
                 user_id = $user_id, domain_code = $domain_code, \
                 ability_code = $ability_code, granted = $granted, \
                 granted_by = $granted_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("domain_code", input.domain_code))
            .bind(("ability_code", input.ability_code))
            .bind(("granted", input.granted))
            .bind(("granted_by", input.granted_by.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<GrantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ability grant".into(),
            code: id_str,
        })?;

        row.try_into_grant(id).map_err(Into::into)
    }

    async fn find(
        &self,
        user_id: Uuid,
        domain_code: &str,
        ability_code: &str,
    ) -> WardenResult<Option<AbilityGrant>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM ability_grant \
                 WHERE user_id = $user_id \
                 AND domain_code = $domain_code \
                 AND ability_code = $ability_code",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("domain_code", domain_code.to_string()))
            .bind(("ability_code", ability_code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GrantRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .next()
            .map(|row| row.try_into_grant())
            .transpose()
            .map_err(Into::into)
    }

    async fn find_granted(
        &self,
        user_id: Uuid,
        domain_code: &str,
    ) -> WardenResult<Vec<AbilityGrant>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM ability_grant \
                 WHERE user_id = $user_id \
                 AND domain_code = $domain_code \
                 AND granted = true \
                 ORDER BY ability_code ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("domain_code", domain_code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GrantRowWithId> = result.take(0).map_err(DbError::from)?;

        let grants = rows
            .into_iter()
            .map(|row| row.try_into_grant())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(grants)
    }

    async fn find_granted_for_user(&self, user_id: Uuid) -> WardenResult<Vec<AbilityGrant>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM ability_grant \
                 WHERE user_id = $user_id AND granted = true \
                 ORDER BY domain_code ASC, ability_code ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GrantRowWithId> = result.take(0).map_err(DbError::from)?;

        let grants = rows
            .into_iter()
            .map(|row| row.try_into_grant())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(grants)
    }

    async fn count_granted(&self, domain_code: &str, ability_code: &str) -> WardenResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM ability_grant \
                 WHERE domain_code = $domain_code \
                 AND ability_code = $ability_code \
                 AND granted = true \
                 GROUP ALL",
            )
            .bind(("domain_code", domain_code.to_string()))
            .bind(("ability_code", ability_code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
