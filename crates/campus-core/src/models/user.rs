//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::principal::RoleScope;
use crate::rbac::Role;

/// The durable user record.
///
/// Read fresh on every authenticated request; the authentication gate
/// rejects tokens issued before `password_changed_at` and tokens for
/// deactivated accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Home tenant — denormalized identifier, no foreign-key enforcement.
    pub tenant: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub role_scope: RoleScope,
    /// Extra tenants a `Limited`-scope user may administer.
    pub managed_tenants: Vec<String>,
    /// Argon2id PHC-format hash.
    pub password_hash: String,
    pub is_active: bool,
    /// Bumped whenever credentials change; tokens issued before this
    /// instant are stale.
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new user. The password arrives already
/// hashed — hashing policy lives in the auth crate, not the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub tenant: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub role_scope: RoleScope,
    pub managed_tenants: Vec<String>,
    pub password_hash: String,
}

/// Fields that can be updated on an existing user. Role changes go
/// through the dedicated role-update path so the transition guards apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub role_scope: Option<RoleScope>,
    pub managed_tenants: Option<Vec<String>>,
}
