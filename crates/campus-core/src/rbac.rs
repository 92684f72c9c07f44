//! Role-based access control primitives.
//!
//! The hierarchy and the default permission catalog are fixed tables —
//! roles are catalog entries, never created at runtime.

pub mod catalog;
pub mod hierarchy;

pub use catalog::{
    ActionKind, Permission, PermissionConditions, PermissionScope, ResourceKind,
    default_permissions,
};
pub use hierarchy::{
    Role, can_manage, compare, creatable_roles, is_protected_tier, level_for, validate_transition,
};
