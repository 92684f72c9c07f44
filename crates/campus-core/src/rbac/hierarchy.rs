//! Role hierarchy — ordered privilege levels and transition rules.
//!
//! All functions here are pure and total. `can_manage` is the single
//! privilege-comparison rule used everywhere; the two hard-coded
//! exceptions (lateral propagation of `super_admin`/`manager`, and the
//! literal-`super_admin` requirement for assigning protected tiers) are
//! the only places the level arithmetic is overridden.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CampusError;

/// An enumerated role label. Levels are a partial order: `Student` and
/// `Parent` share the lowest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Parent,
    Teacher,
    Admin,
    TenantAdmin,
    Manager,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Student,
        Role::Parent,
        Role::Teacher,
        Role::Admin,
        Role::TenantAdmin,
        Role::Manager,
        Role::SuperAdmin,
    ];

    /// Privilege level. Fixed table, never fails.
    pub const fn level(self) -> u8 {
        match self {
            Role::Student | Role::Parent => 0,
            Role::Teacher => 1,
            Role::Admin => 2,
            Role::TenantAdmin => 3,
            Role::Manager => 4,
            Role::SuperAdmin => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
            Role::TenantAdmin => "tenant_admin",
            Role::Manager => "manager",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        match name {
            "student" => Some(Role::Student),
            "parent" => Some(Role::Parent),
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            "tenant_admin" => Some(Role::TenantAdmin),
            "manager" => Some(Role::Manager),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    /// Parse an externally supplied role name, falling back to the
    /// lowest-privilege role for anything unrecognized. A bad role string
    /// must never gain privilege.
    pub fn parse_lenient(name: &str) -> Role {
        Role::from_name(name).unwrap_or(Role::Student)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Privilege level for a raw role name; unknown names map to level 0.
pub fn level_for(name: &str) -> u8 {
    Role::from_name(name).map(Role::level).unwrap_or(0)
}

/// Compare two roles by level.
pub fn compare(a: Role, b: Role) -> Ordering {
    a.level().cmp(&b.level())
}

/// The single privilege-comparison rule: a role manages any role at or
/// below its own level, including itself.
pub fn can_manage(manager: Role, target: Role) -> bool {
    manager.level() >= target.level()
}

/// Whether a role sits in the protected top tiers that only a literal
/// `super_admin` may assign.
pub const fn is_protected_tier(role: Role) -> bool {
    matches!(role, Role::SuperAdmin | Role::Manager)
}

/// Roles a creator may assign to a newly created user.
///
/// Level-equality alone would let a `super_admin` mint another
/// `super_admin` and a `manager` another `manager`; both are excluded to
/// stop lateral propagation of the two most powerful tiers.
pub fn creatable_roles(creator: Role) -> Vec<Role> {
    Role::ALL
        .into_iter()
        .filter(|&r| can_manage(creator, r))
        .filter(|&r| !(r == creator && is_protected_tier(creator)))
        .collect()
}

/// Validate a role change on an existing user.
///
/// The updater must be able to manage both the current and the new role,
/// and the protected tiers may only be assigned by a literal
/// `super_admin`, regardless of level arithmetic.
pub fn validate_transition(updater: Role, current: Role, new: Role) -> Result<(), CampusError> {
    if !can_manage(updater, current) {
        return Err(CampusError::RoleTransitionInvalid {
            reason: format!("{updater} cannot manage users holding {current}"),
        });
    }
    if !can_manage(updater, new) {
        return Err(CampusError::RoleTransitionInvalid {
            reason: format!("{updater} cannot assign {new}"),
        });
    }
    if is_protected_tier(new) && updater != Role::SuperAdmin {
        return Err(CampusError::RoleTransitionInvalid {
            reason: format!("only super_admin may assign {new}"),
        });
    }
    Ok(())
}
