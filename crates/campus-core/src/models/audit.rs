//! Audit log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::rbac::{ActionKind, ResourceKind, Role};

/// Four-point severity classification, computed at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn from_name(name: &str) -> Option<Severity> {
        match name {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed enumeration of auditable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    Logout,
    PasswordChange,
    AccountLocked,
    CreateUser,
    UpdateUser,
    DeleteUser,
    UpdateRole,
    RemoveRole,
    PermissionDenied,
    TenantAccessViolation,
    DataExport,
    SecurityEvent,
}

impl AuditAction {
    pub const ALL: [AuditAction; 13] = [
        AuditAction::Login,
        AuditAction::Logout,
        AuditAction::PasswordChange,
        AuditAction::AccountLocked,
        AuditAction::CreateUser,
        AuditAction::UpdateUser,
        AuditAction::DeleteUser,
        AuditAction::UpdateRole,
        AuditAction::RemoveRole,
        AuditAction::PermissionDenied,
        AuditAction::TenantAccessViolation,
        AuditAction::DataExport,
        AuditAction::SecurityEvent,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::PasswordChange => "password_change",
            AuditAction::AccountLocked => "account_locked",
            AuditAction::CreateUser => "create_user",
            AuditAction::UpdateUser => "update_user",
            AuditAction::DeleteUser => "delete_user",
            AuditAction::UpdateRole => "update_role",
            AuditAction::RemoveRole => "remove_role",
            AuditAction::PermissionDenied => "permission_denied",
            AuditAction::TenantAccessViolation => "tenant_access_violation",
            AuditAction::DataExport => "data_export",
            AuditAction::SecurityEvent => "security_event",
        }
    }

    pub fn from_name(name: &str) -> Option<AuditAction> {
        AuditAction::ALL.into_iter().find(|a| a.as_str() == name)
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured per-action payload — a closed union instead of a free-form
/// map, so severity classification can pattern-match rather than probe
/// keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditDetails {
    RoleChange {
        old_role: Role,
        new_role: Role,
    },
    PermissionDenied {
        resource: Option<ResourceKind>,
        action: Option<ActionKind>,
        reason: String,
    },
    /// A blocked attempt to grant a role at or above a protected tier.
    Escalation {
        attempted_role: Role,
        reason: String,
    },
    TenantAccess {
        requested_tenant: String,
    },
    UserLifecycle {
        target_role: Option<Role>,
    },
    /// Ad hoc events may carry a caller-supplied severity; it defaults to
    /// low when absent.
    Custom {
        info: serde_json::Value,
        severity: Option<Severity>,
    },
    None,
}

/// Weak reference to a user: id plus display fields cached at write time.
/// The referenced account may later be deleted without touching the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ActorRef {
    pub fn bare(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            email: None,
        }
    }

    pub fn new(id: Uuid, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }
}

/// An audit entry, immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor: Uuid,
    pub actor_name: Option<String>,
    pub actor_email: Option<String>,
    pub action: AuditAction,
    pub target: Option<Uuid>,
    pub target_name: Option<String>,
    pub target_email: Option<String>,
    pub resource: Option<ResourceKind>,
    pub details: AuditDetails,
    pub tenant: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
}

/// Write-side input. Severity is never supplied here — the trail computes
/// it from `(action, details)`; only the `Custom` details variant may
/// carry one for ad hoc events.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor: ActorRef,
    pub action: AuditAction,
    pub target: Option<ActorRef>,
    pub resource: Option<ResourceKind>,
    pub details: AuditDetails,
    pub tenant: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl NewAuditEntry {
    pub fn new(actor: ActorRef, action: AuditAction, tenant: impl Into<String>) -> Self {
        Self {
            actor,
            action,
            target: None,
            resource: None,
            details: AuditDetails::None,
            tenant: tenant.into(),
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn details(mut self, details: AuditDetails) -> Self {
        self.details = details;
        self
    }

    pub fn target(mut self, target: ActorRef) -> Self {
        self.target = Some(target);
        self
    }

    pub fn resource(mut self, resource: ResourceKind) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_round_trip() {
        for action in AuditAction::ALL {
            assert_eq!(AuditAction::from_name(action.as_str()), Some(action));
        }
        assert_eq!(AuditAction::from_name("reboot"), None);
    }

    #[test]
    fn severity_is_totally_ordered() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn details_serialize_with_kind_tag() {
        let details = AuditDetails::RoleChange {
            old_role: Role::Teacher,
            new_role: Role::SuperAdmin,
        };
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["kind"], "role_change");
        assert_eq!(value["old_role"], "teacher");
        assert_eq!(value["new_role"], "super_admin");

        let back: AuditDetails = serde_json::from_value(value).unwrap();
        assert_eq!(back, details);
    }
}
