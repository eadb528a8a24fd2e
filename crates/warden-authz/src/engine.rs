//! Authorization engine — resolves a user's effective permission set
//! in one domain.
//!
//! Resolution is a pure function of current grant and override state:
//! ability bundles are re-read from the catalog on every call, and no
//! state is cached between calls, so catalog edits and revocations
//! take effect on the next check.

use std::collections::BTreeSet;

use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::permission::WILDCARD;
use warden_core::repository::{AbilityRepository, GrantRepository, OverrideRepository};

/// Read-side authorization queries.
///
/// All operations are total over well-formed input: an unknown user
/// or domain yields an empty set or `false`, never an error.
#[derive(Clone)]
pub struct AuthorizationEngine<G, O, A> {
    grants: G,
    overrides: O,
    abilities: A,
}

impl<G, O, A> AuthorizationEngine<G, O, A>
where
    G: GrantRepository,
    O: OverrideRepository,
    A: AbilityRepository,
{
    pub fn new(grants: G, overrides: O, abilities: A) -> Self {
        Self {
            grants,
            overrides,
            abilities,
        }
    }

    /// Computes the effective permission set for a user in a domain.
    ///
    /// Unions the current bundle of every granted ability, then
    /// applies overrides last: an allow-override inserts the
    /// permission, a deny-override removes it even when a bundle
    /// grants it. The wildcard is an ordinary set member here; only
    /// [`has_permission`](Self::has_permission) treats it specially.
    pub async fn get_permissions(
        &self,
        user_id: Uuid,
        domain_code: &str,
    ) -> WardenResult<BTreeSet<String>> {
        let mut resolved = BTreeSet::new();

        for grant in self.grants.find_granted(user_id, domain_code).await? {
            match self.abilities.get_by_code(&grant.ability_code).await {
                Ok(ability) => resolved.extend(ability.permissions),
                // A grant pointing at a code missing from the catalog
                // contributes nothing.
                Err(WardenError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        for ov in self.overrides.find_for_user(user_id, domain_code).await? {
            if ov.granted {
                resolved.insert(ov.permission_code);
            } else {
                resolved.remove(&ov.permission_code);
            }
        }

        Ok(resolved)
    }

    /// `true` iff the effective set contains the wildcard or the exact
    /// permission code.
    pub async fn has_permission(
        &self,
        user_id: Uuid,
        domain_code: &str,
        permission_code: &str,
    ) -> WardenResult<bool> {
        let permissions = self.get_permissions(user_id, domain_code).await?;
        Ok(permissions.contains(WILDCARD) || permissions.contains(permission_code))
    }

    /// `true` iff a `granted = true` grant row exists for the triple.
    /// Overrides never affect ability membership, only the derived
    /// permission set.
    pub async fn has_ability(
        &self,
        user_id: Uuid,
        domain_code: &str,
        ability_code: &str,
    ) -> WardenResult<bool> {
        let grant = self.grants.find(user_id, domain_code, ability_code).await?;
        Ok(grant.map(|g| g.granted).unwrap_or(false))
    }

    /// `true` iff the user is known to the domain at all: at least one
    /// granted ability, or at least one override row in either
    /// direction. Distinct from whether any specific action is
    /// allowed.
    pub async fn has_domain_access(&self, user_id: Uuid, domain_code: &str) -> WardenResult<bool> {
        if !self
            .grants
            .find_granted(user_id, domain_code)
            .await?
            .is_empty()
        {
            return Ok(true);
        }

        Ok(!self
            .overrides
            .find_for_user(user_id, domain_code)
            .await?
            .is_empty())
    }
}
