//! Integration tests for catalog seeding against in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use warden_authz::SeedData;
use warden_core::repository::{AbilityRepository, DomainRepository, PermissionRepository};
use warden_db::repository::{
    SurrealAbilityRepository, SurrealDomainRepository, SurrealPermissionRepository,
};

type Db = surrealdb::engine::local::Db;

struct Catalogs {
    domains: SurrealDomainRepository<Db>,
    permissions: SurrealPermissionRepository<Db>,
    abilities: SurrealAbilityRepository<Db>,
}

async fn setup() -> Catalogs {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();

    Catalogs {
        domains: SurrealDomainRepository::new(db.clone()),
        permissions: SurrealPermissionRepository::new(db.clone()),
        abilities: SurrealAbilityRepository::new(db),
    }
}

#[tokio::test]
async fn reapplying_the_seed_changes_nothing() {
    let c = setup().await;
    let seed = SeedData::commerce_backoffice();

    seed.apply(&c.domains, &c.permissions, &c.abilities)
        .await
        .unwrap();

    let domains = c.domains.list().await.unwrap();
    let permissions = c.permissions.list().await.unwrap();
    let abilities = c.abilities.list().await.unwrap();

    seed.apply(&c.domains, &c.permissions, &c.abilities)
        .await
        .unwrap();

    // No duplicates, no new rows.
    assert_eq!(c.domains.list().await.unwrap().len(), domains.len());
    assert_eq!(c.permissions.list().await.unwrap().len(), permissions.len());
    assert_eq!(c.abilities.list().await.unwrap().len(), abilities.len());
}

#[tokio::test]
async fn reapplying_the_seed_preserves_catalog_edits() {
    let c = setup().await;
    let seed = SeedData::commerce_backoffice();

    seed.apply(&c.domains, &c.permissions, &c.abilities)
        .await
        .unwrap();

    // An administrator trims the bundle after the initial seed.
    let trimmed = vec!["orders:list".to_string()];
    c.abilities
        .set_permissions("manage-orders", trimmed.clone())
        .await
        .unwrap();

    seed.apply(&c.domains, &c.permissions, &c.abilities)
        .await
        .unwrap();

    // Existing rows are left as they are, not reset to the seed.
    let ability = c.abilities.get_by_code("manage-orders").await.unwrap();
    assert_eq!(ability.permissions, trimmed);
}
