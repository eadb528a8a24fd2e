//! Enforcement guard — the cross-cutting check in front of protected
//! operations.
//!
//! Call sites declare a required permission or ability; the guard
//! resolves the acting identity and the domain from the call context
//! and asks the engine for a yes/no before the operation body runs.
//! There is no caching across calls: every check re-reads current
//! grant and override state, so authorization changes take effect on
//! the very next call.

use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::repository::{AbilityRepository, GrantRepository, OverrideRepository};

use crate::engine::AuthorizationEngine;

/// Routing parameter carrying the domain scope of a call.
pub const DOMAIN_CODE_PARAM: &str = "domain_code";

/// Seam for the external token-verification layer: turns an opaque
/// credential into a stable user id, or `None` for anonymous callers.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, token: &str) -> impl Future<Output = WardenResult<Option<Uuid>>> + Send;
}

/// The acting identity, resolved upstream.
#[derive(Debug, Clone, Copy)]
pub struct Subject {
    /// `None` means the caller is anonymous and fails every check.
    pub user_id: Option<Uuid>,
}

impl Subject {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

/// The declared requirement on a protected operation.
#[derive(Debug, Clone)]
pub enum AccessRequirement {
    Permission(String),
    Ability(String),
}

/// Call context handed to the guard: who is calling, plus the routing
/// parameters the domain code is extracted from.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub subject: Subject,
    pub params: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// The domain scope of this call. Missing parameter is a caller
    /// error, reported at this boundary rather than inside the
    /// engine.
    pub fn domain_code(&self) -> WardenResult<&str> {
        self.params
            .get(DOMAIN_CODE_PARAM)
            .map(String::as_str)
            .ok_or_else(|| WardenError::Validation {
                message: format!("{DOMAIN_CODE_PARAM} parameter is required"),
            })
    }
}

pub struct AccessGuard<G, O, A> {
    engine: AuthorizationEngine<G, O, A>,
}

impl<G, O, A> AccessGuard<G, O, A>
where
    G: GrantRepository,
    O: OverrideRepository,
    A: AbilityRepository,
{
    pub fn new(engine: AuthorizationEngine<G, O, A>) -> Self {
        Self { engine }
    }

    /// Lets the call proceed (`Ok`) or refuses it with
    /// `PermissionDenied`/`AbilityDenied`. Refusals are terminal for
    /// the request — never retried, never downgraded to allow.
    pub async fn authorize(
        &self,
        subject: &Subject,
        domain_code: &str,
        requirement: &AccessRequirement,
    ) -> WardenResult<()> {
        let Some(user_id) = subject.user_id else {
            warn!(domain = domain_code, "denied anonymous caller");
            return Err(Self::denial(domain_code, requirement));
        };

        let allowed = match requirement {
            AccessRequirement::Permission(code) => {
                self.engine.has_permission(user_id, domain_code, code).await?
            }
            AccessRequirement::Ability(code) => {
                self.engine.has_ability(user_id, domain_code, code).await?
            }
        };

        if allowed {
            Ok(())
        } else {
            warn!(
                user = %user_id,
                domain = domain_code,
                requirement = ?requirement,
                "access denied"
            );
            Err(Self::denial(domain_code, requirement))
        }
    }

    /// Resolves an opaque credential through the given resolver and
    /// authorizes the resulting subject. Unresolvable credentials are
    /// treated as anonymous.
    pub async fn authorize_token<R: IdentityResolver>(
        &self,
        resolver: &R,
        token: &str,
        domain_code: &str,
        requirement: &AccessRequirement,
    ) -> WardenResult<()> {
        let subject = match resolver.resolve(token).await? {
            Some(user_id) => Subject::user(user_id),
            None => Subject::anonymous(),
        };
        self.authorize(&subject, domain_code, requirement).await
    }

    /// Extracts the domain code from the context's routing parameters
    /// and authorizes against it.
    pub async fn authorize_call(
        &self,
        ctx: &RequestContext,
        requirement: &AccessRequirement,
    ) -> WardenResult<()> {
        let domain_code = ctx.domain_code()?;
        self.authorize(&ctx.subject, domain_code, requirement).await
    }

    fn denial(domain_code: &str, requirement: &AccessRequirement) -> WardenError {
        match requirement {
            AccessRequirement::Permission(code) => WardenError::PermissionDenied {
                domain: domain_code.into(),
                permission: code.clone(),
            },
            AccessRequirement::Ability(code) => WardenError::AbilityDenied {
                domain: domain_code.into(),
                ability: code.clone(),
            },
        }
    }
}
