//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Every natural key carries a UNIQUE
//! index; grant and override rows additionally get a lookup index on
//! the hot resolution query shape.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "authorization_tables",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Domains (tenant boundaries)
-- =======================================================================
DEFINE TABLE domain SCHEMAFULL;
DEFINE FIELD code ON TABLE domain TYPE string;
DEFINE FIELD name ON TABLE domain TYPE string;
DEFINE FIELD description ON TABLE domain TYPE string;
DEFINE FIELD active ON TABLE domain TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE domain TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_domain_code ON TABLE domain COLUMNS code UNIQUE;

-- =======================================================================
-- Permission catalog
-- =======================================================================
DEFINE TABLE permission SCHEMAFULL;
DEFINE FIELD code ON TABLE permission TYPE string;
DEFINE FIELD name ON TABLE permission TYPE string;
DEFINE FIELD resource ON TABLE permission TYPE string;
DEFINE FIELD action ON TABLE permission TYPE string;
DEFINE FIELD created_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permission_code ON TABLE permission \
    COLUMNS code UNIQUE;

-- =======================================================================
-- Ability catalog (role bundles)
-- =======================================================================
DEFINE TABLE ability SCHEMAFULL;
DEFINE FIELD code ON TABLE ability TYPE string;
DEFINE FIELD name ON TABLE ability TYPE string;
DEFINE FIELD description ON TABLE ability TYPE string;
DEFINE FIELD permissions ON TABLE ability TYPE array;
DEFINE FIELD permissions.* ON TABLE ability TYPE string;
DEFINE FIELD created_at ON TABLE ability TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_ability_code ON TABLE ability COLUMNS code UNIQUE;

-- =======================================================================
-- Ability grants (user membership, soft-revoked, never deleted)
-- =======================================================================
DEFINE TABLE ability_grant SCHEMAFULL;
DEFINE FIELD user_id ON TABLE ability_grant TYPE string;
DEFINE FIELD domain_code ON TABLE ability_grant TYPE string;
DEFINE FIELD ability_code ON TABLE ability_grant TYPE string;
DEFINE FIELD granted ON TABLE ability_grant TYPE bool DEFAULT true;
DEFINE FIELD granted_by ON TABLE ability_grant TYPE option<string>;
DEFINE FIELD created_at ON TABLE ability_grant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_grant_natural_key ON TABLE ability_grant \
    COLUMNS user_id, domain_code, ability_code UNIQUE;
DEFINE INDEX idx_grant_lookup ON TABLE ability_grant \
    COLUMNS user_id, domain_code, granted;

-- =======================================================================
-- Permission overrides (per-user exceptions, soft state, never deleted)
-- =======================================================================
DEFINE TABLE permission_override SCHEMAFULL;
DEFINE FIELD user_id ON TABLE permission_override TYPE string;
DEFINE FIELD domain_code ON TABLE permission_override TYPE string;
DEFINE FIELD permission_code ON TABLE permission_override TYPE string;
DEFINE FIELD granted ON TABLE permission_override TYPE bool;
DEFINE FIELD granted_by ON TABLE permission_override \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE permission_override TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_override_natural_key ON TABLE permission_override \
    COLUMNS user_id, domain_code, permission_code UNIQUE;
DEFINE INDEX idx_override_lookup ON TABLE permission_override \
    COLUMNS user_id, domain_code;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Brings the authorization schema up to the latest version.
///
/// The `_migration` table records what has been applied; everything
/// past the recorded version runs in order. Every statement uses
/// idempotent DDL, so running this on each server start is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let applied = applied_version(db).await?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        info!(
            version = migration.version,
            name = migration.name,
            "applying schema migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "schema v{} ({}) did not apply: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "could not record schema v{}: {}",
                    migration.version, e,
                ))
            })?;
    }

    Ok(())
}

/// Highest recorded migration version, 0 on a fresh database.
async fn applied_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map(|m| m.version).unwrap_or(0))
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
