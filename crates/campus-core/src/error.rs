//! Error types for the campus system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CampusError {
    #[error("Authentication required: {reason}")]
    Unauthenticated { reason: String },

    #[error("Insufficient role: requires {required} or above, principal has {actual}")]
    InsufficientRole { required: String, actual: String },

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("Tenant access denied: {requested}")]
    TenantAccessDenied { requested: String },

    #[error("Invalid role transition: {reason}")]
    RoleTransitionInvalid { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Audit write failed: {0}")]
    AuditWriteFailed(String),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CampusError {
    /// HTTP status this error maps to at the API boundary.
    ///
    /// Authentication failures are always 401; every authorization failure
    /// (role, permission, tenant, transition) is 403.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthenticated { .. } => 401,
            Self::InsufficientRole { .. }
            | Self::PermissionDenied { .. }
            | Self::TenantAccessDenied { .. }
            | Self::RoleTransitionInvalid { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Validation { .. } => 400,
            Self::ServiceUnavailable(_) => 503,
            Self::AuditWriteFailed(_)
            | Self::Database(_)
            | Self::Crypto(_)
            | Self::Internal(_) => 500,
        }
    }
}

pub type CampusResult<T> = Result<T, CampusError>;
