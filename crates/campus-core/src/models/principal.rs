//! Identity principal — the resolved, authenticated caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::audit::ActorRef;
use crate::models::user::User;
use crate::rbac::{ActionKind, Permission, PermissionScope, ResourceKind, Role, default_permissions};

/// Breadth of tenants a principal may act upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    /// Unrestricted; `managed_tenants` is ignored.
    Global,
    /// Restricted to `managed_tenants` plus the home tenant.
    Limited,
    /// Restricted to exactly the home tenant.
    Tenant,
}

impl RoleScope {
    pub const fn as_str(self) -> &'static str {
        match self {
            RoleScope::Global => "global",
            RoleScope::Limited => "limited",
            RoleScope::Tenant => "tenant",
        }
    }

    pub fn from_name(name: &str) -> Option<RoleScope> {
        match name {
            "global" => Some(RoleScope::Global),
            "limited" => Some(RoleScope::Limited),
            "tenant" => Some(RoleScope::Tenant),
            _ => None,
        }
    }
}

impl fmt::Display for RoleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The per-request authenticated identity.
///
/// Built fresh on every request from the durable [`User`] record plus the
/// verified token claims, and discarded when the request ends. Never
/// persisted, never cached across requests — role and tenant changes take
/// effect on the very next request after commit.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub role_level: u8,
    pub home_tenant: String,
    pub managed_tenants: Vec<String>,
    pub role_scope: RoleScope,
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// Materialize a principal from a freshly loaded user record,
    /// resolving the default permission catalog for its role.
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            role_level: user.role.level(),
            home_tenant: user.tenant.clone(),
            managed_tenants: user.managed_tenants.clone(),
            role_scope: user.role_scope,
            permissions: default_permissions(user.role),
        }
    }

    /// Whether any resolved grant covers `(resource, action, scope)`.
    pub fn has_permission(
        &self,
        resource: ResourceKind,
        action: ActionKind,
        scope: Option<PermissionScope>,
    ) -> bool {
        self.permissions
            .iter()
            .any(|p| p.allows(resource, action, scope))
    }

    /// Weak reference for audit writes, with display fields captured now
    /// so the log survives later account deletion.
    pub fn actor_ref(&self) -> ActorRef {
        ActorRef {
            id: self.id,
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
        }
    }
}
