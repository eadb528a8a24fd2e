//! Domain models for Warden.
//!
//! These are the core types shared across all crates. Every entity is
//! identified externally by a stable string `code`; record UUIDs exist
//! for storage but are never used as scoping keys.

pub mod ability;
pub mod domain;
pub mod grant;
pub mod overrides;
pub mod permission;
