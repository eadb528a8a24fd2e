//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    warden_db::run_migrations(&db).await.unwrap();

    // Verify that all tables exist by querying INFO FOR DB.
    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("domain"), "missing domain table");
    assert!(info_str.contains("permission"), "missing permission table");
    assert!(info_str.contains("ability"), "missing ability table");
    assert!(
        info_str.contains("ability_grant"),
        "missing ability_grant table"
    );
    assert!(
        info_str.contains("permission_override"),
        "missing permission_override table"
    );
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    warden_db::run_migrations(&db).await.unwrap();
    // Second run must be a no-op, not an error.
    warden_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn schema_v1_defines_natural_key_indexes() {
    let ddl = warden_db::schema_v1();
    assert!(ddl.contains("idx_grant_natural_key"));
    assert!(ddl.contains("idx_override_natural_key"));
}
