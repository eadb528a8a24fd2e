//! Warden Authz — effective-permission resolution, ability
//! assignment under write invariants, and enforcement guards.
//!
//! Everything here is generic over the `warden-core` repository
//! traits, so this crate has no dependency on the database crate.

pub mod assignment;
pub mod engine;
pub mod guard;
pub mod seed;

pub use assignment::AssignmentService;
pub use engine::AuthorizationEngine;
pub use guard::{AccessGuard, AccessRequirement, RequestContext, Subject};
pub use seed::SeedData;
