//! SurrealDB repository implementations for the `warden-core` traits.

mod ability;
mod domain;
mod grant;
mod overrides;
mod permission;

pub use ability::SurrealAbilityRepository;
pub use domain::SurrealDomainRepository;
pub use grant::SurrealGrantRepository;
pub use overrides::SurrealOverrideRepository;
pub use permission::SurrealPermissionRepository;
