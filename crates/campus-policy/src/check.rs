//! Composable authorization checks.

use campus_core::error::CampusError;
use campus_core::models::audit::{AuditAction, AuditDetails, NewAuditEntry};
use campus_core::models::principal::{Principal, RoleScope};
use campus_core::rbac::{ActionKind, PermissionScope, ResourceKind, Role};

/// Request-side context a check needs to describe a denial: the
/// effective tenant and the client identity for the audit write.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub tenant: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(tenant: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            ip_address: None,
            user_agent: None,
        }
    }
}

/// The outcome of a check: allow, or deny with the error to return and
/// the audit event describing the attempt.
#[derive(Debug)]
pub enum Decision {
    Allow,
    Deny {
        error: CampusError,
        event: NewAuditEntry,
    },
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub(crate) fn deny(
        principal: &Principal,
        ctx: &RequestContext,
        error: CampusError,
        action: AuditAction,
        details: AuditDetails,
    ) -> Self {
        Decision::Deny {
            error,
            event: NewAuditEntry::new(principal.actor_ref(), action, ctx.tenant.clone())
                .details(details)
                .client(ctx.ip_address.clone(), ctx.user_agent.clone()),
        }
    }
}

/// A stateless, total authorization predicate.
pub trait PolicyCheck: Send + Sync {
    fn evaluate(&self, principal: &Principal, ctx: &RequestContext) -> Decision;
}

/// Require a minimum role level, optionally pinned to a tenant-scope
/// class.
#[derive(Debug, Clone)]
pub struct RequireRole {
    pub min_role: Role,
    pub scope: Option<RoleScope>,
}

impl RequireRole {
    pub fn new(min_role: Role) -> Self {
        Self {
            min_role,
            scope: None,
        }
    }

    pub fn with_scope(min_role: Role, scope: RoleScope) -> Self {
        Self {
            min_role,
            scope: Some(scope),
        }
    }
}

impl PolicyCheck for RequireRole {
    fn evaluate(&self, principal: &Principal, ctx: &RequestContext) -> Decision {
        if principal.role_level < self.min_role.level() {
            let reason = format!(
                "requires role {} or above, principal holds {}",
                self.min_role, principal.role
            );
            return Decision::deny(
                principal,
                ctx,
                CampusError::InsufficientRole {
                    required: self.min_role.to_string(),
                    actual: principal.role.to_string(),
                },
                AuditAction::PermissionDenied,
                AuditDetails::PermissionDenied {
                    resource: None,
                    action: None,
                    reason,
                },
            );
        }

        if let Some(required_scope) = self.scope
            && principal.role_scope != required_scope
        {
            let reason = format!(
                "requires {required_scope} scope, principal has {}",
                principal.role_scope
            );
            return Decision::deny(
                principal,
                ctx,
                CampusError::PermissionDenied {
                    reason: reason.clone(),
                },
                AuditAction::PermissionDenied,
                AuditDetails::PermissionDenied {
                    resource: None,
                    action: None,
                    reason,
                },
            );
        }

        Decision::Allow
    }
}

/// Require a resolved permission grant covering `(resource, action)` at
/// an optional scope.
#[derive(Debug, Clone)]
pub struct RequirePermission {
    pub resource: ResourceKind,
    pub action: ActionKind,
    pub scope: Option<PermissionScope>,
}

impl RequirePermission {
    pub fn new(resource: ResourceKind, action: ActionKind) -> Self {
        Self {
            resource,
            action,
            scope: None,
        }
    }

    pub fn scoped(resource: ResourceKind, action: ActionKind, scope: PermissionScope) -> Self {
        Self {
            resource,
            action,
            scope: Some(scope),
        }
    }
}

impl PolicyCheck for RequirePermission {
    fn evaluate(&self, principal: &Principal, ctx: &RequestContext) -> Decision {
        if principal.has_permission(self.resource, self.action, self.scope) {
            return Decision::Allow;
        }

        let reason = format!(
            "{} has no {} grant on {}",
            principal.role, self.action, self.resource
        );
        Decision::deny(
            principal,
            ctx,
            CampusError::PermissionDenied {
                reason: reason.clone(),
            },
            AuditAction::PermissionDenied,
            AuditDetails::PermissionDenied {
                resource: Some(self.resource),
                action: Some(self.action),
                reason,
            },
        )
    }
}
