//! Tenant-scope resolution.
//!
//! Given the principal and an optionally requested target tenant, decide
//! the effective tenant for the request or fail with
//! `TenantAccessDenied`. Pure; callers pair the failure with a
//! `tenant_access_violation` audit entry.

use campus_core::error::CampusError;
use campus_core::models::principal::{Principal, RoleScope};
use campus_core::rbac::Role;

/// Resolve the effective tenant for a request.
///
/// - `super_admin` or global scope: any requested tenant, defaulting to
///   the home tenant.
/// - limited scope: the requested tenant must be managed (or the home
///   tenant); unspecified defaults to the first managed tenant.
/// - tenant scope: exactly the home tenant.
pub fn resolve_tenant(
    principal: &Principal,
    requested: Option<&str>,
) -> Result<String, CampusError> {
    if principal.role == Role::SuperAdmin || principal.role_scope == RoleScope::Global {
        return Ok(requested
            .map(str::to_owned)
            .unwrap_or_else(|| principal.home_tenant.clone()));
    }

    match principal.role_scope {
        RoleScope::Limited => match requested {
            None => Ok(principal
                .managed_tenants
                .first()
                .cloned()
                .unwrap_or_else(|| principal.home_tenant.clone())),
            Some(t)
                if t == principal.home_tenant
                    || principal.managed_tenants.iter().any(|m| m == t) =>
            {
                Ok(t.to_owned())
            }
            Some(t) => Err(CampusError::TenantAccessDenied {
                requested: t.to_owned(),
            }),
        },
        RoleScope::Tenant | RoleScope::Global => match requested {
            None => Ok(principal.home_tenant.clone()),
            Some(t) if t == principal.home_tenant => Ok(t.to_owned()),
            Some(t) => Err(CampusError::TenantAccessDenied {
                requested: t.to_owned(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role, scope: RoleScope, managed: &[&str]) -> Principal {
        Principal {
            id: uuid::Uuid::new_v4(),
            name: "Test User".into(),
            email: "test@example.com".into(),
            role,
            role_level: role.level(),
            home_tenant: "home".into(),
            managed_tenants: managed.iter().map(|s| s.to_string()).collect(),
            role_scope: scope,
            permissions: campus_core::rbac::default_permissions(role),
        }
    }

    #[test]
    fn super_admin_reaches_any_tenant() {
        let p = principal(Role::SuperAdmin, RoleScope::Global, &[]);
        assert_eq!(resolve_tenant(&p, Some("school-z")).unwrap(), "school-z");
        assert_eq!(resolve_tenant(&p, None).unwrap(), "home");
    }

    #[test]
    fn limited_scope_is_bounded_by_managed_set() {
        let p = principal(Role::TenantAdmin, RoleScope::Limited, &["t1", "t2"]);
        assert_eq!(resolve_tenant(&p, Some("t1")).unwrap(), "t1");
        assert_eq!(resolve_tenant(&p, Some("t2")).unwrap(), "t2");
        let err = resolve_tenant(&p, Some("t3")).unwrap_err();
        assert!(matches!(err, CampusError::TenantAccessDenied { .. }));
    }

    #[test]
    fn limited_scope_defaults_to_first_managed_tenant() {
        let p = principal(Role::TenantAdmin, RoleScope::Limited, &["t1", "t2"]);
        assert_eq!(resolve_tenant(&p, None).unwrap(), "t1");
    }

    #[test]
    fn limited_scope_includes_home_tenant() {
        let p = principal(Role::TenantAdmin, RoleScope::Limited, &["t1"]);
        assert_eq!(resolve_tenant(&p, Some("home")).unwrap(), "home");
    }

    #[test]
    fn tenant_scope_is_home_only() {
        let p = principal(Role::Admin, RoleScope::Tenant, &[]);
        assert_eq!(resolve_tenant(&p, None).unwrap(), "home");
        assert_eq!(resolve_tenant(&p, Some("home")).unwrap(), "home");
        assert!(resolve_tenant(&p, Some("other")).is_err());
    }

    #[test]
    fn global_scope_without_super_admin_role_is_unrestricted() {
        let p = principal(Role::Manager, RoleScope::Global, &[]);
        assert_eq!(resolve_tenant(&p, Some("anywhere")).unwrap(), "anywhere");
    }
}
