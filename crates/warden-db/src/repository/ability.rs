//! SurrealDB implementation of [`AbilityRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::ability::{Ability, CreateAbility};
use warden_core::repository::AbilityRepository;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AbilityRow {
    code: String,
    name: String,
    description: String,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AbilityRowWithId {
    record_id: String,
    code: String,
    name: String,
    description: String,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
}

impl AbilityRowWithId {
    fn try_into_ability(self) -> Result<Ability, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Ability {
            id,
            code: self.code,
            name: self.name,
            description: self.description,
            permissions: self.permissions,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Ability repository.
#[derive(Clone)]
pub struct SurrealAbilityRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAbilityRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<AbilityRowWithId>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM ability \
                 WHERE code = $code",
            )
            .bind(("code", code.to_string()))
            .await?;

        let rows: Vec<AbilityRowWithId> = result.take(0)?;
        Ok(rows.into_iter().next())
    }
}

impl<C: Connection> AbilityRepository for SurrealAbilityRepository<C> {
    async fn create(&self, input: CreateAbility) -> WardenResult<Ability> {
        if self.find_by_code(&input.code).await?.is_some() {
            return Err(DbError::AlreadyExists {
                entity: "ability".into(),
                code: input.code,
            }
            .into());
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('ability', $id) SET \
                 code = $code, name = $name, \
                 description = $description, \
                 permissions = $permissions",
            )
            .bind(("id", id_str.clone()))
            .bind(("code", input.code))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("permissions", input.permissions))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AbilityRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ability".into(),
            code: id_str,
        })?;

        Ok(Ability {
            id,
            code: row.code,
            name: row.name,
            description: row.description,
            permissions: row.permissions,
            created_at: row.created_at,
        })
    }

    async fn get_by_code(&self, code: &str) -> WardenResult<Ability> {
        let row = self
            .find_by_code(code)
            .await?
            .ok_or_else(|| DbError::NotFound {
                entity: "ability".into(),
                code: code.into(),
            })?;

        row.try_into_ability().map_err(Into::into)
    }

    async fn list(&self) -> WardenResult<Vec<Ability>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM ability \
                 ORDER BY code ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AbilityRowWithId> = result.take(0).map_err(DbError::from)?;

        let abilities = rows
            .into_iter()
            .map(|row| row.try_into_ability())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(abilities)
    }

    async fn set_permissions(&self, code: &str, permissions: Vec<String>) -> WardenResult<Ability> {
        let mut result = self
            .db
            .query(
                "UPDATE ability SET permissions = $permissions \
                 WHERE code = $code \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("code", code.to_string()))
            .bind(("permissions", permissions))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AbilityRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ability".into(),
            code: code.into(),
        })?;

        row.try_into_ability().map_err(Into::into)
    }
}
