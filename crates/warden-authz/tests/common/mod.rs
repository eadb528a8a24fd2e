//! Shared test harness: in-memory SurrealDB, real repositories, and a
//! seeded two-domain catalog.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use warden_authz::{AssignmentService, AuthorizationEngine, SeedData};
use warden_core::models::ability::{CreateAbility, SUPER_ADMIN};
use warden_core::models::domain::CreateDomain;
use warden_core::models::permission::{CreatePermission, WILDCARD};
use warden_db::repository::{
    SurrealAbilityRepository, SurrealDomainRepository, SurrealGrantRepository,
    SurrealOverrideRepository, SurrealPermissionRepository,
};

pub type Db = surrealdb::engine::local::Db;

pub type Engine = AuthorizationEngine<
    SurrealGrantRepository<Db>,
    SurrealOverrideRepository<Db>,
    SurrealAbilityRepository<Db>,
>;

pub type Service = AssignmentService<
    SurrealDomainRepository<Db>,
    SurrealAbilityRepository<Db>,
    SurrealPermissionRepository<Db>,
    SurrealGrantRepository<Db>,
    SurrealOverrideRepository<Db>,
>;

pub struct Harness {
    pub engine: Engine,
    pub service: Service,
    pub abilities: SurrealAbilityRepository<Db>,
}

/// Two domains, a handful of permissions, and three abilities:
/// `manage-orders`, `manage-customers`, and `super-admin` (wildcard).
fn seed() -> SeedData {
    let domain = |code: &str, name: &str| CreateDomain {
        code: code.into(),
        name: name.into(),
        description: String::new(),
    };
    let permission = |code: &str| CreatePermission {
        code: code.into(),
        name: code.into(),
    };
    let ability = |code: &str, perms: &[&str]| CreateAbility {
        code: code.into(),
        name: code.into(),
        description: String::new(),
        permissions: perms.iter().map(|p| (*p).into()).collect(),
    };

    SeedData {
        domains: vec![domain("store-a", "Store A"), domain("store-b", "Store B")],
        permissions: vec![
            permission(WILDCARD),
            permission("orders:list"),
            permission("orders:refund"),
            permission("customers:list"),
        ],
        abilities: vec![
            ability("manage-orders", &["orders:list", "orders:refund"]),
            ability("manage-customers", &["customers:list"]),
            ability(SUPER_ADMIN, &[WILDCARD]),
        ],
    }
}

/// Spin up in-memory DB, run migrations, and apply the test seed.
pub async fn setup() -> Harness {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();

    let domains = SurrealDomainRepository::new(db.clone());
    let permissions = SurrealPermissionRepository::new(db.clone());
    let abilities = SurrealAbilityRepository::new(db.clone());
    let grants = SurrealGrantRepository::new(db.clone());
    let overrides = SurrealOverrideRepository::new(db.clone());

    seed()
        .apply(&domains, &permissions, &abilities)
        .await
        .unwrap();

    Harness {
        engine: AuthorizationEngine::new(grants.clone(), overrides.clone(), abilities.clone()),
        service: AssignmentService::new(
            domains,
            abilities.clone(),
            permissions,
            grants,
            overrides,
        ),
        abilities,
    }
}
