//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The user repository is the one
//! read the authentication gate performs per request; the audit log
//! repository is append-only with query/aggregate/retention operations.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::CampusResult;
use crate::models::audit::{AuditAction, AuditEntry, Severity};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::rbac::{ResourceKind, Role};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = CampusResult<User>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CampusResult<User>> + Send;

    fn get_by_email(
        &self,
        tenant: &str,
        email: &str,
    ) -> impl Future<Output = CampusResult<User>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = CampusResult<User>> + Send;

    /// Change the user's role. Callers must have passed the transition
    /// guards before reaching this.
    fn update_role(&self, id: Uuid, role: Role)
    -> impl Future<Output = CampusResult<User>> + Send;

    /// Replace the password hash and bump `password_changed_at`, which
    /// invalidates all previously issued tokens.
    fn set_password(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> impl Future<Output = CampusResult<()>> + Send;

    /// Soft-delete: clears `is_active`.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = CampusResult<()>> + Send;

    fn list(
        &self,
        tenant: &str,
        pagination: Pagination,
    ) -> impl Future<Output = CampusResult<PaginatedResult<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Audit log (append-only)
// ---------------------------------------------------------------------------

/// Query filters for audit entries. Tenant scoping is the caller's
/// responsibility — the repository applies exactly what it is given.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub tenant: Option<String>,
    pub actor: Option<Uuid>,
    pub action: Option<AuditAction>,
    pub resource: Option<ResourceKind>,
    pub severity: Option<Severity>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// One row of the top-actors aggregate.
#[derive(Debug, Clone)]
pub struct ActorCount {
    pub actor: Uuid,
    pub actor_name: Option<String>,
    pub count: u64,
}

pub trait AuditLogRepository: Send + Sync {
    /// Append a new entry. Entries are immutable; no update path exists.
    fn append(&self, entry: AuditEntry) -> impl Future<Output = CampusResult<()>> + Send;

    /// Page through matching entries, newest first.
    fn list(
        &self,
        filter: AuditFilter,
        pagination: Pagination,
    ) -> impl Future<Output = CampusResult<PaginatedResult<AuditEntry>>> + Send;

    fn count(&self, filter: AuditFilter) -> impl Future<Output = CampusResult<u64>> + Send;

    fn action_counts(
        &self,
        filter: AuditFilter,
    ) -> impl Future<Output = CampusResult<Vec<(AuditAction, u64)>>> + Send;

    fn severity_counts(
        &self,
        filter: AuditFilter,
    ) -> impl Future<Output = CampusResult<Vec<(Severity, u64)>>> + Send;

    fn top_actors(
        &self,
        filter: AuditFilter,
        limit: u64,
    ) -> impl Future<Output = CampusResult<Vec<ActorCount>>> + Send;

    fn recent_critical(
        &self,
        tenant: Option<String>,
        limit: u64,
    ) -> impl Future<Output = CampusResult<Vec<AuditEntry>>> + Send;

    /// Retention cleanup: delete entries older than `cutoff` whose
    /// severity is low or medium. High and critical entries are exempt so
    /// the durable security record survives. Returns the deleted count.
    fn delete_low_severity_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = CampusResult<u64>> + Send;
}
