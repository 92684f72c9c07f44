//! Campus Core — domain models, role hierarchy, permission catalog, and
//! repository contracts shared across the access-control and audit crates.
//!
//! Everything in this crate is pure: no I/O, no global state. The role
//! catalog and default permission grants are fixed tables loaded once; the
//! repository traits are the seam the storage crate implements.

pub mod error;
pub mod models;
pub mod rbac;
pub mod repository;

pub use error::{CampusError, CampusResult};
