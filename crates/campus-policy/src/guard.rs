//! Role-assignment guards.
//!
//! These run before a user is created or has its role changed; they are
//! the escalation-blocking rules, stricter than level comparison alone.

use campus_core::error::CampusError;
use campus_core::models::audit::{ActorRef, AuditAction, AuditDetails, NewAuditEntry};
use campus_core::models::principal::{Principal, RoleScope};
use campus_core::models::user::User;
use campus_core::rbac::{Role, creatable_roles, is_protected_tier, validate_transition};

use crate::check::{Decision, RequestContext};

/// Gate a user-creation request carrying role `new_role`.
///
/// The creator must hold the role in its creatable set, and the
/// protected tiers are hard-blocked for anyone but a literal
/// `super_admin` — which still cannot mint another `super_admin`.
pub fn creation_guard(creator: &Principal, new_role: Role, ctx: &RequestContext) -> Decision {
    let allowed = creatable_roles(creator.role).contains(&new_role)
        && !(is_protected_tier(new_role) && creator.role != Role::SuperAdmin);
    if allowed {
        return Decision::Allow;
    }

    let reason = format!("{} may not create a {new_role} user", creator.role);
    Decision::deny(
        creator,
        ctx,
        CampusError::PermissionDenied {
            reason: reason.clone(),
        },
        AuditAction::PermissionDenied,
        AuditDetails::Escalation {
            attempted_role: new_role,
            reason,
        },
    )
}

/// Gate a role change on an existing user.
///
/// Tenant compatibility is checked first: a tenant-scoped updater may not
/// modify a user outside its home tenant, and a limited-scope updater is
/// bounded by its managed set. Then the role transition itself must pass
/// [`validate_transition`].
pub fn update_guard(
    updater: &Principal,
    target: &User,
    new_role: Role,
    ctx: &RequestContext,
) -> Decision {
    let tenant_ok = match updater.role_scope {
        RoleScope::Global => true,
        RoleScope::Limited => {
            target.tenant == updater.home_tenant
                || updater.managed_tenants.iter().any(|t| *t == target.tenant)
        }
        RoleScope::Tenant => target.tenant == updater.home_tenant,
    };
    if !tenant_ok {
        return Decision::Deny {
            error: CampusError::TenantAccessDenied {
                requested: target.tenant.clone(),
            },
            event: NewAuditEntry::new(
                updater.actor_ref(),
                AuditAction::TenantAccessViolation,
                ctx.tenant.clone(),
            )
            .target(ActorRef::new(target.id, target.name.clone(), target.email.clone()))
            .details(AuditDetails::TenantAccess {
                requested_tenant: target.tenant.clone(),
            })
            .client(ctx.ip_address.clone(), ctx.user_agent.clone()),
        };
    }

    match validate_transition(updater.role, target.role, new_role) {
        Ok(()) => Decision::Allow,
        Err(error) => {
            let reason = error.to_string();
            Decision::Deny {
                error,
                event: NewAuditEntry::new(
                    updater.actor_ref(),
                    AuditAction::PermissionDenied,
                    ctx.tenant.clone(),
                )
                .target(ActorRef::new(
                    target.id,
                    target.name.clone(),
                    target.email.clone(),
                ))
                .details(AuditDetails::Escalation {
                    attempted_role: new_role,
                    reason,
                })
                .client(ctx.ip_address.clone(), ctx.user_agent.clone()),
            }
        }
    }
}
