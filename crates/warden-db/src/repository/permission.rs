//! SurrealDB implementation of [`PermissionRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::permission::{self, CreatePermission, Permission};
use warden_core::repository::PermissionRepository;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PermissionRow {
    code: String,
    name: String,
    resource: String,
    action: String,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct PermissionRowWithId {
    record_id: String,
    code: String,
    name: String,
    resource: String,
    action: String,
    created_at: DateTime<Utc>,
}

impl PermissionRowWithId {
    fn try_into_permission(self) -> Result<Permission, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Permission {
            id,
            code: self.code,
            name: self.name,
            resource: self.resource,
            action: self.action,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<PermissionRowWithId>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE code = $code",
            )
            .bind(("code", code.to_string()))
            .await?;

        let rows: Vec<PermissionRowWithId> = result.take(0)?;
        Ok(rows.into_iter().next())
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn create(&self, input: CreatePermission) -> WardenResult<Permission> {
        // Malformed codes are rejected before anything is written.
        let (resource, action) = permission::split_code(&input.code)?;

        if self.find_by_code(&input.code).await?.is_some() {
            return Err(DbError::AlreadyExists {
                entity: "permission".into(),
                code: input.code,
            }
            .into());
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('permission', $id) SET \
                 code = $code, name = $name, \
                 resource = $resource, action = $action",
            )
            .bind(("id", id_str.clone()))
            .bind(("code", input.code))
            .bind(("name", input.name))
            .bind(("resource", resource))
            .bind(("action", action))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            code: id_str,
        })?;

        Ok(Permission {
            id,
            code: row.code,
            name: row.name,
            resource: row.resource,
            action: row.action,
            created_at: row.created_at,
        })
    }

    async fn get_by_code(&self, code: &str) -> WardenResult<Permission> {
        let row = self
            .find_by_code(code)
            .await?
            .ok_or_else(|| DbError::NotFound {
                entity: "permission".into(),
                code: code.into(),
            })?;

        row.try_into_permission().map_err(Into::into)
    }

    async fn list(&self) -> WardenResult<Vec<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 ORDER BY code ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let permissions = rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(permissions)
    }
}
