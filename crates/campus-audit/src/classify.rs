//! Deterministic severity classification.
//!
//! Keyed on `(action, details)`. Callers never set severity directly for
//! standard events; ad hoc `SecurityEvent`s may carry one in their
//! `Custom` details and default to low.

use campus_core::models::audit::{AuditAction, AuditDetails, Severity};
use campus_core::rbac::{Role, is_protected_tier};

fn admin_tier(role: Role) -> bool {
    matches!(role, Role::Admin | Role::TenantAdmin)
}

/// Compute the severity of an audit event.
pub fn classify(action: AuditAction, details: &AuditDetails) -> Severity {
    use AuditAction::*;

    match (action, details) {
        // Assigning or removing a protected-tier role is always critical,
        // in either direction of the change.
        (UpdateRole | RemoveRole, AuditDetails::RoleChange { old_role, new_role })
            if is_protected_tier(*old_role) || is_protected_tier(*new_role) =>
        {
            Severity::Critical
        }
        (UpdateRole | RemoveRole, AuditDetails::RoleChange { new_role, .. })
            if admin_tier(*new_role) =>
        {
            Severity::High
        }
        (UpdateRole | RemoveRole, _) => Severity::Medium,

        (TenantAccessViolation, _) => Severity::Critical,

        (DeleteUser, _) => Severity::High,

        // A denied escalation attempt is never below high: reaching for a
        // protected tier is critical, anything else still trips a guard.
        (PermissionDenied, AuditDetails::Escalation { attempted_role, .. }) => {
            if is_protected_tier(*attempted_role) {
                Severity::Critical
            } else {
                Severity::High
            }
        }
        (PermissionDenied, _) => Severity::Medium,

        (Login | AccountLocked | PasswordChange, _) => Severity::Medium,

        (SecurityEvent, AuditDetails::Custom {
            severity: Some(severity),
            ..
        }) => *severity,

        _ => Severity::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn protected_tier_role_change_is_critical() {
        let details = AuditDetails::RoleChange {
            old_role: Role::Teacher,
            new_role: Role::SuperAdmin,
        };
        assert_eq!(
            classify(AuditAction::UpdateRole, &details),
            Severity::Critical
        );

        // Removal of a protected role is just as sensitive.
        let details = AuditDetails::RoleChange {
            old_role: Role::Manager,
            new_role: Role::Teacher,
        };
        assert_eq!(
            classify(AuditAction::RemoveRole, &details),
            Severity::Critical
        );
    }

    #[test]
    fn admin_tier_assignment_is_high() {
        let details = AuditDetails::RoleChange {
            old_role: Role::Teacher,
            new_role: Role::TenantAdmin,
        };
        assert_eq!(classify(AuditAction::UpdateRole, &details), Severity::High);
    }

    #[test]
    fn routine_role_change_is_medium() {
        let details = AuditDetails::RoleChange {
            old_role: Role::Student,
            new_role: Role::Teacher,
        };
        assert_eq!(
            classify(AuditAction::UpdateRole, &details),
            Severity::Medium
        );
    }

    #[test]
    fn tenant_violation_is_critical() {
        let details = AuditDetails::TenantAccess {
            requested_tenant: "school-b".into(),
        };
        assert_eq!(
            classify(AuditAction::TenantAccessViolation, &details),
            Severity::Critical
        );
    }

    #[test]
    fn escalation_denial_graded_by_attempted_role() {
        let critical = AuditDetails::Escalation {
            attempted_role: Role::Manager,
            reason: "blocked".into(),
        };
        assert_eq!(
            classify(AuditAction::PermissionDenied, &critical),
            Severity::Critical
        );

        let high = AuditDetails::Escalation {
            attempted_role: Role::Admin,
            reason: "blocked".into(),
        };
        assert_eq!(
            classify(AuditAction::PermissionDenied, &high),
            Severity::High
        );

        // Even a guard trip over an ordinary role is never below high.
        let floor = AuditDetails::Escalation {
            attempted_role: Role::Teacher,
            reason: "blocked".into(),
        };
        assert_eq!(
            classify(AuditAction::PermissionDenied, &floor),
            Severity::High
        );
    }

    #[test]
    fn login_and_lockout_are_medium() {
        assert_eq!(
            classify(AuditAction::Login, &AuditDetails::None),
            Severity::Medium
        );
        assert_eq!(
            classify(AuditAction::AccountLocked, &AuditDetails::None),
            Severity::Medium
        );
    }

    #[test]
    fn custom_events_default_to_low() {
        let without = AuditDetails::Custom {
            info: json!({"note": "manual entry"}),
            severity: None,
        };
        assert_eq!(
            classify(AuditAction::SecurityEvent, &without),
            Severity::Low
        );

        let with = AuditDetails::Custom {
            info: json!({"note": "incident"}),
            severity: Some(Severity::High),
        };
        assert_eq!(classify(AuditAction::SecurityEvent, &with), Severity::High);
    }

    #[test]
    fn everything_else_is_low() {
        assert_eq!(
            classify(AuditAction::Logout, &AuditDetails::None),
            Severity::Low
        );
        assert_eq!(
            classify(AuditAction::DataExport, &AuditDetails::None),
            Severity::Low
        );
    }
}
