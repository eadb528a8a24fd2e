//! SurrealDB implementation of [`DomainRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::domain::{CreateDomain, Domain};
use warden_core::repository::DomainRepository;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DomainRow {
    code: String,
    name: String,
    description: String,
    active: bool,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct DomainRowWithId {
    record_id: String,
    code: String,
    name: String,
    description: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl DomainRowWithId {
    fn try_into_domain(self) -> Result<Domain, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Domain {
            id,
            code: self.code,
            name: self.name,
            description: self.description,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Domain repository.
#[derive(Clone)]
pub struct SurrealDomainRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDomainRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<DomainRowWithId>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM domain \
                 WHERE code = $code",
            )
            .bind(("code", code.to_string()))
            .await?;

        let rows: Vec<DomainRowWithId> = result.take(0)?;
        Ok(rows.into_iter().next())
    }
}

impl<C: Connection> DomainRepository for SurrealDomainRepository<C> {
    async fn create(&self, input: CreateDomain) -> WardenResult<Domain> {
        if self.find_by_code(&input.code).await?.is_some() {
            return Err(DbError::AlreadyExists {
                entity: "domain".into(),
                code: input.code,
            }
            .into());
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('domain', $id) SET \
                 code = $code, name = $name, \
                 description = $description, active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("code", input.code))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<DomainRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "domain".into(),
            code: id_str,
        })?;

        Ok(Domain {
            id,
            code: row.code,
            name: row.name,
            description: row.description,
            active: row.active,
            created_at: row.created_at,
        })
    }

    async fn get_by_code(&self, code: &str) -> WardenResult<Domain> {
        let row = self
            .find_by_code(code)
            .await?
            .ok_or_else(|| DbError::NotFound {
                entity: "domain".into(),
                code: code.into(),
            })?;

        row.try_into_domain().map_err(Into::into)
    }

    async fn list(&self) -> WardenResult<Vec<Domain>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM domain \
                 ORDER BY code ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DomainRowWithId> = result.take(0).map_err(DbError::from)?;

        let domains = rows
            .into_iter()
            .map(|row| row.try_into_domain())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(domains)
    }

    async fn set_active(&self, code: &str, active: bool) -> WardenResult<Domain> {
        let mut result = self
            .db
            .query(
                "UPDATE domain SET active = $active WHERE code = $code \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("code", code.to_string()))
            .bind(("active", active))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DomainRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "domain".into(),
            code: code.into(),
        })?;

        row.try_into_domain().map_err(Into::into)
    }
}
