//! Idempotent reference-data seeding.
//!
//! The engine must work correctly given any well-formed seed; this
//! module only guarantees that applying a seed is safe to repeat:
//! each catalog row is created when missing by code and left
//! untouched when present.

use tracing::info;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::ability::{CreateAbility, SUPER_ADMIN};
use warden_core::models::domain::CreateDomain;
use warden_core::models::permission::{CreatePermission, WILDCARD};
use warden_core::repository::{AbilityRepository, DomainRepository, PermissionRepository};

/// A well-formed catalog seed: domains, permissions, and abilities
/// whose bundles reference the seeded permission codes.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub domains: Vec<CreateDomain>,
    pub permissions: Vec<CreatePermission>,
    pub abilities: Vec<CreateAbility>,
}

impl SeedData {
    /// The reference catalog for a commerce backoffice: storefront
    /// domains, `resource:action` permissions, role bundles, and the
    /// `super-admin` ability holding the wildcard.
    pub fn commerce_backoffice() -> Self {
        let permission = |code: &str, name: &str| CreatePermission {
            code: code.into(),
            name: name.into(),
        };

        let mut permissions = vec![permission(WILDCARD, "All permissions")];
        for code in [
            "products:list",
            "products:read",
            "products:create",
            "products:update",
            "products:delete",
            "orders:list",
            "orders:read",
            "orders:update-status",
            "orders:cancel",
            "orders:refund",
            "customers:list",
            "customers:read",
            "customers:update",
            "customers:disable",
            "users:list",
            "users:read",
            "users:assign-ability",
            "users:revoke-ability",
            "users:override-permission",
            "reports:sales",
            "reports:export",
            "settings:view",
            "settings:update",
            "audit:view",
        ] {
            permissions.push(permission(code, code));
        }

        let ability = |code: &str, name: &str, perms: &[&str]| CreateAbility {
            code: code.into(),
            name: name.into(),
            description: format!("{name} role"),
            permissions: perms.iter().map(|p| (*p).into()).collect(),
        };

        Self {
            domains: vec![CreateDomain {
                code: "main-store".into(),
                name: "Main Store".into(),
                description: "Primary storefront".into(),
            }],
            permissions,
            abilities: vec![
                ability(SUPER_ADMIN, "Super Administrator", &[WILDCARD]),
                ability(
                    "manage-catalog",
                    "Catalog Manager",
                    &[
                        "products:list",
                        "products:read",
                        "products:create",
                        "products:update",
                        "products:delete",
                    ],
                ),
                ability(
                    "manage-orders",
                    "Order Manager",
                    &[
                        "orders:list",
                        "orders:read",
                        "orders:update-status",
                        "orders:cancel",
                        "orders:refund",
                    ],
                ),
                ability(
                    "manage-customers",
                    "Customer Manager",
                    &[
                        "customers:list",
                        "customers:read",
                        "customers:update",
                        "customers:disable",
                    ],
                ),
            ],
        }
    }

    /// Applies the seed, creating whatever is missing. Safe to run on
    /// every startup.
    pub async fn apply<D, P, A>(&self, domains: &D, permissions: &P, abilities: &A) -> WardenResult<()>
    where
        D: DomainRepository,
        P: PermissionRepository,
        A: AbilityRepository,
    {
        for input in &self.domains {
            match domains.get_by_code(&input.code).await {
                Ok(_) => {}
                Err(WardenError::NotFound { .. }) => {
                    domains.create(input.clone()).await?;
                    info!(code = %input.code, "seeded domain");
                }
                Err(e) => return Err(e),
            }
        }

        for input in &self.permissions {
            match permissions.get_by_code(&input.code).await {
                Ok(_) => {}
                Err(WardenError::NotFound { .. }) => {
                    permissions.create(input.clone()).await?;
                }
                Err(e) => return Err(e),
            }
        }

        for input in &self.abilities {
            match abilities.get_by_code(&input.code).await {
                Ok(_) => {}
                Err(WardenError::NotFound { .. }) => {
                    abilities.create(input.clone()).await?;
                    info!(code = %input.code, "seeded ability");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}
