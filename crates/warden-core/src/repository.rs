//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Grant and override lookups
//! are keyed on domain `code` (never record identity) to enforce the
//! code-scoped isolation model.

use uuid::Uuid;

use crate::error::WardenResult;
use crate::models::{
    ability::{Ability, CreateAbility},
    domain::{CreateDomain, Domain},
    grant::{AbilityGrant, UpsertGrant},
    overrides::{PermissionOverride, UpsertOverride},
    permission::{CreatePermission, Permission},
};

// ---------------------------------------------------------------------------
// Reference catalogs
// ---------------------------------------------------------------------------

pub trait DomainRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the code is taken.
    fn create(&self, input: CreateDomain) -> impl Future<Output = WardenResult<Domain>> + Send;
    fn get_by_code(&self, code: &str) -> impl Future<Output = WardenResult<Domain>> + Send;
    fn list(&self) -> impl Future<Output = WardenResult<Vec<Domain>>> + Send;
    fn set_active(
        &self,
        code: &str,
        active: bool,
    ) -> impl Future<Output = WardenResult<Domain>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the code is taken.
    fn create(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = WardenResult<Permission>> + Send;
    fn get_by_code(&self, code: &str) -> impl Future<Output = WardenResult<Permission>> + Send;
    fn list(&self) -> impl Future<Output = WardenResult<Vec<Permission>>> + Send;
}

pub trait AbilityRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the code is taken.
    fn create(&self, input: CreateAbility) -> impl Future<Output = WardenResult<Ability>> + Send;
    fn get_by_code(&self, code: &str) -> impl Future<Output = WardenResult<Ability>> + Send;
    fn list(&self) -> impl Future<Output = WardenResult<Vec<Ability>>> + Send;
    /// Replaces the ability's permission bundle. Takes effect on the
    /// next resolution for every existing grantee.
    fn set_permissions(
        &self,
        code: &str,
        permissions: Vec<String>,
    ) -> impl Future<Output = WardenResult<Ability>> + Send;
}

// ---------------------------------------------------------------------------
// Grant and override stores
// ---------------------------------------------------------------------------

pub trait GrantRepository: Send + Sync {
    /// Atomic insert-or-update on the (user, domain, ability) natural
    /// key. `created_at` is preserved across updates.
    fn upsert(&self, input: UpsertGrant) -> impl Future<Output = WardenResult<AbilityGrant>> + Send;

    fn find(
        &self,
        user_id: Uuid,
        domain_code: &str,
        ability_code: &str,
    ) -> impl Future<Output = WardenResult<Option<AbilityGrant>>> + Send;

    /// All `granted = true` rows for the user in one domain.
    fn find_granted(
        &self,
        user_id: Uuid,
        domain_code: &str,
    ) -> impl Future<Output = WardenResult<Vec<AbilityGrant>>> + Send;

    /// All `granted = true` rows for the user across every domain.
    fn find_granted_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = WardenResult<Vec<AbilityGrant>>> + Send;

    /// Granted rows for one ability across ALL users in a domain.
    /// Backs the self-lockout guard: revoking is refused when this
    /// would drop to zero.
    fn count_granted(
        &self,
        domain_code: &str,
        ability_code: &str,
    ) -> impl Future<Output = WardenResult<u64>> + Send;
}

pub trait OverrideRepository: Send + Sync {
    /// Atomic insert-or-update on the (user, domain, permission)
    /// natural key. `created_at` is preserved across updates.
    fn upsert(
        &self,
        input: UpsertOverride,
    ) -> impl Future<Output = WardenResult<PermissionOverride>> + Send;

    fn find(
        &self,
        user_id: Uuid,
        domain_code: &str,
        permission_code: &str,
    ) -> impl Future<Output = WardenResult<Option<PermissionOverride>>> + Send;

    /// Every override row (allow and deny) for the user in one domain.
    fn find_for_user(
        &self,
        user_id: Uuid,
        domain_code: &str,
    ) -> impl Future<Output = WardenResult<Vec<PermissionOverride>>> + Send;
}
