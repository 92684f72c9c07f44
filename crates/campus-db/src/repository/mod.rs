//! SurrealDB repository implementations.

mod audit;
mod user;

pub use audit::SurrealAuditLogRepository;
pub use user::SurrealUserRepository;
