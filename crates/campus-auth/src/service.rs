//! Authentication service — login and credential-change orchestration.

use campus_audit::AuditTrail;
use campus_core::error::{CampusError, CampusResult};
use campus_core::models::audit::{ActorRef, AuditAction, NewAuditEntry};
use campus_core::repository::{AuditLogRepository, UserRepository};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub tenant: String,
    pub email: String,
    pub password: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    pub user_id: Uuid,
}

/// Authentication service, generic over repository implementations so it
/// carries no dependency on the database crate.
pub struct AuthService<U: UserRepository, A: AuditLogRepository> {
    users: U,
    audit: AuditTrail<A>,
    config: AuthConfig,
}

impl<U: UserRepository, A: AuditLogRepository> AuthService<U, A> {
    pub fn new(users: U, audit: AuditTrail<A>, config: AuthConfig) -> Self {
        Self {
            users,
            audit,
            config,
        }
    }

    /// Authenticate with email + password within a tenant and issue an
    /// access token. The login audit write is best-effort: an audit-store
    /// outage must never block authentication.
    pub async fn login(&self, input: LoginInput) -> CampusResult<LoginOutput> {
        let user = self
            .users
            .get_by_email(&input.tenant, &input.email)
            .await
            .map_err(|e| match e {
                CampusError::NotFound { .. } => AuthError::InvalidCredentials.into(),
                other => other,
            })?;

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(CampusError::from)?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.is_active {
            return Err(AuthError::AccountDeactivated.into());
        }

        let access_token = token::issue_access_token(&user, &self.config)?;

        self.audit
            .record_best_effort(
                NewAuditEntry::new(
                    ActorRef::new(user.id, user.name.clone(), user.email.clone()),
                    AuditAction::Login,
                    user.tenant.clone(),
                )
                .client(input.ip_address, input.user_agent),
            )
            .await;

        Ok(LoginOutput {
            access_token,
            expires_in: self.config.access_token_lifetime_secs,
            user_id: user.id,
        })
    }

    /// Change a user's password after verifying the current one.
    ///
    /// Bumps `password_changed_at`, which invalidates every previously
    /// issued token on its next presentation. The audit write here is
    /// must-succeed: a credential change that cannot be recorded is
    /// surfaced to the caller.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> CampusResult<()> {
        if new_password.len() < self.config.min_password_length {
            return Err(AuthError::PasswordTooShort(self.config.min_password_length).into());
        }

        let user = self.users.get_by_id(user_id).await?;

        let valid = password::verify_password(
            current_password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(CampusError::from)?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        let hash = password::hash_password(new_password, self.config.pepper.as_deref())
            .map_err(CampusError::from)?;
        self.users.set_password(user.id, hash).await?;

        self.audit
            .record(NewAuditEntry::new(
                ActorRef::new(user.id, user.name.clone(), user.email.clone()),
                AuditAction::PasswordChange,
                user.tenant.clone(),
            ))
            .await?;

        Ok(())
    }
}
