//! The authentication gate.
//!
//! Verifies a bearer token, re-reads the current user record (a token
//! must not outlive account deactivation or a credential change), builds
//! the per-request principal, and resolves the effective tenant. No
//! state is cached across requests, so role and tenant changes take
//! effect on the very next request.
//!
//! Authentication failures are not audited here; a tenant-scope denial
//! is an authorization failure and writes a critical audit entry.

use chrono::DateTime;
use uuid::Uuid;

use campus_audit::AuditTrail;
use campus_core::error::{CampusError, CampusResult};
use campus_core::models::audit::{AuditAction, AuditDetails, NewAuditEntry};
use campus_core::models::principal::Principal;
use campus_core::repository::{AuditLogRepository, UserRepository};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::tenant::resolve_tenant;
use crate::token;

/// The gate's successful output: a materialized principal and the
/// resolved effective tenant for the request. Handlers trust these and
/// must not re-derive scope.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    pub principal: Principal,
    pub tenant: String,
}

/// Authentication gate, generic over the repositories so the auth layer
/// has no dependency on the database crate.
pub struct AuthGate<U: UserRepository, A: AuditLogRepository> {
    users: U,
    audit: AuditTrail<A>,
    config: AuthConfig,
}

impl<U: UserRepository, A: AuditLogRepository> AuthGate<U, A> {
    pub fn new(users: U, audit: AuditTrail<A>, config: AuthConfig) -> Self {
        Self {
            users,
            audit,
            config,
        }
    }

    /// Authenticate a request from its `Authorization` header value and
    /// an optionally requested target tenant.
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        requested_tenant: Option<&str>,
    ) -> CampusResult<AuthenticatedRequest> {
        let raw = extract_bearer(authorization)?;
        let claims = token::validate_access_token(raw, &self.config)
            .map_err(CampusError::from)?
            .0;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::TokenInvalid("malformed subject".into()))?;

        // Re-fetch the current record: the token's snapshot must never
        // outlive deactivation or a role change.
        let user = match self.users.get_by_id(user_id).await {
            Ok(user) => user,
            Err(CampusError::NotFound { .. }) => {
                return Err(AuthError::AccountDeactivated.into());
            }
            // A store timeout during authentication is transient and
            // safe to retry.
            Err(CampusError::Database(msg)) => {
                return Err(CampusError::ServiceUnavailable(msg));
            }
            Err(e) => return Err(e),
        };

        if !user.is_active {
            return Err(AuthError::AccountDeactivated.into());
        }

        // Reject tokens issued before the last credential change.
        if let Some(changed_at) = user.password_changed_at {
            let issued_at = DateTime::from_timestamp(claims.iat, 0)
                .ok_or_else(|| AuthError::TokenInvalid("malformed iat".into()))?;
            if changed_at > issued_at {
                return Err(AuthError::TokenStale.into());
            }
        }

        let principal = Principal::from_user(&user);
        let tenant = match resolve_tenant(&principal, requested_tenant) {
            Ok(tenant) => tenant,
            Err(e) => {
                // Every tenant-scope denial leaves a critical trail entry.
                // The write is best-effort: the request is already denied.
                let requested = requested_tenant.unwrap_or(&principal.home_tenant);
                self.audit
                    .record_best_effort(
                        NewAuditEntry::new(
                            principal.actor_ref(),
                            AuditAction::TenantAccessViolation,
                            principal.home_tenant.clone(),
                        )
                        .details(AuditDetails::TenantAccess {
                            requested_tenant: requested.to_string(),
                        }),
                    )
                    .await;
                return Err(e);
            }
        };

        Ok(AuthenticatedRequest { principal, tenant })
    }
}

/// Pull the raw token out of an `Authorization: Bearer <token>` value.
fn extract_bearer(authorization: Option<&str>) -> Result<&str, AuthError> {
    let header = authorization.ok_or(AuthError::MissingToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::TokenInvalid("expected Bearer scheme".into()))?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert!(matches!(
            extract_bearer(None),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            extract_bearer(Some("Basic dXNlcjpwdw==")),
            Err(AuthError::TokenInvalid(_))
        ));
        assert!(matches!(
            extract_bearer(Some("Bearer ")),
            Err(AuthError::MissingToken)
        ));
    }
}
