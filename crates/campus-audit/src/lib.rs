//! Campus Audit — the append-only, severity-classified security log.
//!
//! The trail computes severity deterministically at write time, offers
//! filtered queries and aggregate statistics, exports CSV, and performs
//! time-based retention cleanup that never touches high or critical
//! entries.

pub mod classify;
pub mod export;
pub mod trail;

pub use classify::classify;
pub use trail::{AuditConfig, AuditStats, AuditTrail};
