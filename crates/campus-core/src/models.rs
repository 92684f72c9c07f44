//! Domain models for the campus access-control core.
//!
//! These are the types shared across all crates. Tenants are carried as
//! denormalized string identifiers throughout — this core does not own a
//! tenant collection and enforces no cross-collection foreign keys.

pub mod audit;
pub mod principal;
pub mod user;
