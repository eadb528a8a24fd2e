//! Assignment service — mutates the grant and override stores under
//! write invariants.
//!
//! Every mutation takes an `actor_user_id` for audit attribution.
//! Writes are serialized through a per-domain async lock, so
//! read-then-write sequences such as
//! [`set_single_role`](AssignmentService::set_single_role) and the
//! self-lockout count cannot interleave with a concurrent mutation in
//! the same domain.
//!
//! This service is mechanism, not policy: it performs no
//! authorization check of its own. Callers must verify the actor may
//! perform an assignment (see [`guard`](crate::guard)) before calling
//! in.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::ability::SUPER_ADMIN;
use warden_core::models::grant::UpsertGrant;
use warden_core::models::overrides::UpsertOverride;
use warden_core::repository::{
    AbilityRepository, DomainRepository, GrantRepository, OverrideRepository,
    PermissionRepository,
};

pub struct AssignmentService<D, A, P, G, O> {
    domains: D,
    abilities: A,
    permissions: P,
    grants: G,
    overrides: O,
    /// Per-domain write locks.
    write_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<D, A, P, G, O> AssignmentService<D, A, P, G, O>
where
    D: DomainRepository,
    A: AbilityRepository,
    P: PermissionRepository,
    G: GrantRepository,
    O: OverrideRepository,
{
    pub fn new(domains: D, abilities: A, permissions: P, grants: G, overrides: O) -> Self {
        Self {
            domains,
            abilities,
            permissions,
            grants,
            overrides,
            write_locks: DashMap::new(),
        }
    }

    async fn lock_domain(&self, domain_code: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .write_locks
            .entry(domain_code.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        mutex.lock_owned().await
    }

    /// Grants an ability to a user in a domain.
    ///
    /// Validates that the domain and ability exist, then upserts the
    /// grant row with `granted = true`. Re-granting an existing
    /// triple updates the row in place, so the operation is
    /// idempotent and never duplicates rows.
    pub async fn assign_ability(
        &self,
        actor_user_id: Uuid,
        target_user_id: Uuid,
        domain_code: &str,
        ability_code: &str,
    ) -> WardenResult<()> {
        self.domains.get_by_code(domain_code).await?;
        self.abilities.get_by_code(ability_code).await?;

        let _guard = self.lock_domain(domain_code).await;
        self.grant(actor_user_id, target_user_id, domain_code, ability_code)
            .await
    }

    /// Upserts a granted row; callers hold the domain lock.
    async fn grant(
        &self,
        actor_user_id: Uuid,
        target_user_id: Uuid,
        domain_code: &str,
        ability_code: &str,
    ) -> WardenResult<()> {
        self.grants
            .upsert(UpsertGrant {
                user_id: target_user_id,
                domain_code: domain_code.into(),
                ability_code: ability_code.into(),
                granted: true,
                granted_by: Some(actor_user_id),
            })
            .await?;

        info!(
            actor = %actor_user_id,
            target = %target_user_id,
            domain = domain_code,
            ability = ability_code,
            "ability granted"
        );
        Ok(())
    }

    /// Makes the given ability the user's only active role in the
    /// domain: every other granted ability is revoked (attributed to
    /// the actor), then the requested one is granted. The whole
    /// sequence runs under the domain lock so a concurrent assignment
    /// cannot leave two roles simultaneously active.
    pub async fn set_single_role(
        &self,
        actor_user_id: Uuid,
        target_user_id: Uuid,
        domain_code: &str,
        ability_code: &str,
    ) -> WardenResult<()> {
        self.domains.get_by_code(domain_code).await?;
        self.abilities.get_by_code(ability_code).await?;

        let _guard = self.lock_domain(domain_code).await;

        for grant in self.grants.find_granted(target_user_id, domain_code).await? {
            if grant.ability_code != ability_code {
                self.grants
                    .upsert(UpsertGrant {
                        user_id: target_user_id,
                        domain_code: domain_code.into(),
                        ability_code: grant.ability_code,
                        granted: false,
                        granted_by: Some(actor_user_id),
                    })
                    .await?;
            }
        }

        self.grant(actor_user_id, target_user_id, domain_code, ability_code)
            .await
    }

    /// Revokes an ability by flipping its grant row to `granted =
    /// false`. Fails with `NotFound` when no row exists for the
    /// triple.
    ///
    /// Self-lockout guard: a user revoking their own currently-active
    /// `super-admin` grant is refused with `InvalidState` when it is
    /// the last granted `super-admin` in the domain. The count runs
    /// under the same domain lock as the revoke, so two concurrent
    /// revocations cannot both pass the check and jointly strip the
    /// domain's last super-admin.
    pub async fn revoke_ability(
        &self,
        actor_user_id: Uuid,
        target_user_id: Uuid,
        domain_code: &str,
        ability_code: &str,
    ) -> WardenResult<()> {
        let _guard = self.lock_domain(domain_code).await;

        let grant = self
            .grants
            .find(target_user_id, domain_code, ability_code)
            .await?
            .ok_or_else(|| WardenError::not_found("ability grant", ability_code))?;

        if actor_user_id == target_user_id && ability_code == SUPER_ADMIN && grant.granted {
            let active = self.grants.count_granted(domain_code, SUPER_ADMIN).await?;
            if active <= 1 {
                return Err(WardenError::InvalidState {
                    message: "cannot revoke your own last super-admin ability".into(),
                });
            }
        }

        self.grants
            .upsert(UpsertGrant {
                user_id: target_user_id,
                domain_code: domain_code.into(),
                ability_code: ability_code.into(),
                granted: false,
                granted_by: Some(actor_user_id),
            })
            .await?;

        info!(
            actor = %actor_user_id,
            target = %target_user_id,
            domain = domain_code,
            ability = ability_code,
            "ability revoked"
        );
        Ok(())
    }

    /// Codes of the user's currently granted abilities in a domain.
    pub async fn list_ability_codes(
        &self,
        user_id: Uuid,
        domain_code: &str,
    ) -> WardenResult<BTreeSet<String>> {
        let grants = self.grants.find_granted(user_id, domain_code).await?;
        Ok(grants.into_iter().map(|g| g.ability_code).collect())
    }

    /// Flips every granted row for the user, across all domains, to
    /// `granted = false`. Used when deactivating an account entirely;
    /// deliberately domain-unscoped, unlike every other operation
    /// here. Each row keeps its original `granted_by` attribution.
    ///
    /// The initial read only picks the domains to visit; each
    /// domain's grants are re-read under that domain's lock, so a
    /// grant committed there after the snapshot is still caught.
    pub async fn revoke_all_abilities_for_user(&self, user_id: Uuid) -> WardenResult<()> {
        let domains: BTreeSet<String> = self
            .grants
            .find_granted_for_user(user_id)
            .await?
            .into_iter()
            .map(|g| g.domain_code)
            .collect();

        for domain_code in domains {
            let _guard = self.lock_domain(&domain_code).await;
            for grant in self.grants.find_granted(user_id, &domain_code).await? {
                self.grants
                    .upsert(UpsertGrant {
                        user_id,
                        domain_code: domain_code.clone(),
                        ability_code: grant.ability_code,
                        granted: false,
                        granted_by: grant.granted_by,
                    })
                    .await?;
            }
        }

        info!(user = %user_id, "all abilities revoked across domains");
        Ok(())
    }

    /// Upserts a per-user permission exception. `granted = true` adds
    /// the permission on top of ability resolution, `granted = false`
    /// subtracts it; either direction dominates the ability-derived
    /// outcome.
    pub async fn assign_permission_override(
        &self,
        actor_user_id: Uuid,
        target_user_id: Uuid,
        domain_code: &str,
        permission_code: &str,
        granted: bool,
    ) -> WardenResult<()> {
        self.domains.get_by_code(domain_code).await?;
        self.permissions.get_by_code(permission_code).await?;

        let _guard = self.lock_domain(domain_code).await;
        self.overrides
            .upsert(UpsertOverride {
                user_id: target_user_id,
                domain_code: domain_code.into(),
                permission_code: permission_code.into(),
                granted,
                granted_by: Some(actor_user_id),
            })
            .await?;

        info!(
            actor = %actor_user_id,
            target = %target_user_id,
            domain = domain_code,
            permission = permission_code,
            granted,
            "permission override set"
        );
        Ok(())
    }
}
