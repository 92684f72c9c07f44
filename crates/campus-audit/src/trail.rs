//! The audit trail service.
//!
//! Two write classes exist on purpose: [`AuditTrail::record`] propagates
//! failure (role changes, deletions, explicit security events must not be
//! silently unaudited), while [`AuditTrail::record_best_effort`] absorbs
//! failure so an audit-store outage never blocks login or the
//! permission-denied path. Neither class retries — writes are
//! at-most-once.

use campus_core::error::{CampusError, CampusResult};
use campus_core::models::audit::{AuditAction, AuditEntry, NewAuditEntry, Severity};
use campus_core::repository::{
    ActorCount, AuditFilter, AuditLogRepository, PaginatedResult, Pagination,
};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::classify::classify;

/// Trail configuration.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Entries older than this many days are eligible for cleanup
    /// (default: 730 = two years).
    pub retention_days: u32,
    /// Hard cap on CSV export rows to bound memory (default: 10,000).
    pub export_max_rows: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            retention_days: 730,
            export_max_rows: 10_000,
        }
    }
}

/// Aggregate statistics over the trail.
#[derive(Debug, Clone)]
pub struct AuditStats {
    pub total_events: u64,
    pub events_by_action: Vec<(AuditAction, u64)>,
    pub events_by_severity: Vec<(Severity, u64)>,
    /// Most recent critical entries, capped at 10.
    pub recent_critical: Vec<AuditEntry>,
    /// Most active actors, capped at 10.
    pub top_actors: Vec<ActorCount>,
}

const STATS_RECENT_CRITICAL_LIMIT: u64 = 10;
const STATS_TOP_ACTORS_LIMIT: u64 = 10;

/// Append-only audit trail over a log repository.
pub struct AuditTrail<R: AuditLogRepository> {
    repo: R,
    config: AuditConfig,
}

impl<R: AuditLogRepository> AuditTrail<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            config: AuditConfig::default(),
        }
    }

    pub fn with_config(repo: R, config: AuditConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    fn build_entry(&self, event: NewAuditEntry) -> AuditEntry {
        let severity = classify(event.action, &event.details);
        let (target, target_name, target_email) = match event.target {
            Some(t) => (Some(t.id), t.name, t.email),
            None => (None, None, None),
        };
        AuditEntry {
            id: Uuid::new_v4(),
            actor: event.actor.id,
            actor_name: event.actor.name,
            actor_email: event.actor.email,
            action: event.action,
            target,
            target_name,
            target_email,
            resource: event.resource,
            details: event.details,
            tenant: event.tenant,
            ip_address: event.ip_address,
            user_agent: event.user_agent,
            timestamp: Utc::now(),
            severity,
        }
    }

    /// Must-succeed write. A failure here means the paired business
    /// mutation is not durably audited, and the caller should treat it as
    /// unsafe to report as fully successful.
    pub async fn record(&self, event: NewAuditEntry) -> CampusResult<AuditEntry> {
        let entry = self.build_entry(event);
        self.repo
            .append(entry.clone())
            .await
            .map_err(|e| CampusError::AuditWriteFailed(e.to_string()))?;
        Ok(entry)
    }

    /// Best-effort write. Failures are logged and fully absorbed so the
    /// primary flow stays available; returns the entry on success.
    pub async fn record_best_effort(&self, event: NewAuditEntry) -> Option<AuditEntry> {
        let entry = self.build_entry(event);
        match self.repo.append(entry.clone()).await {
            Ok(()) => Some(entry),
            Err(e) => {
                tracing::warn!(
                    action = %entry.action,
                    tenant = %entry.tenant,
                    error = %e,
                    "best-effort audit write failed"
                );
                None
            }
        }
    }

    /// Page through matching entries, newest first.
    ///
    /// Tenant scoping must be applied by the caller before invoking this;
    /// the trail does not re-derive principal scope.
    pub async fn query(
        &self,
        filter: AuditFilter,
        pagination: Pagination,
    ) -> CampusResult<PaginatedResult<AuditEntry>> {
        self.repo.list(filter, pagination).await
    }

    /// Aggregate statistics, optionally restricted to a tenant and a
    /// time window.
    pub async fn stats(
        &self,
        tenant: Option<String>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> CampusResult<AuditStats> {
        let filter = AuditFilter {
            tenant: tenant.clone(),
            from,
            to,
            ..Default::default()
        };

        let total_events = self.repo.count(filter.clone()).await?;
        let events_by_action = self.repo.action_counts(filter.clone()).await?;
        let events_by_severity = self.repo.severity_counts(filter.clone()).await?;
        let top_actors = self.repo.top_actors(filter, STATS_TOP_ACTORS_LIMIT).await?;
        let recent_critical = self
            .repo
            .recent_critical(tenant, STATS_RECENT_CRITICAL_LIMIT)
            .await?;

        Ok(AuditStats {
            total_events,
            events_by_action,
            events_by_severity,
            recent_critical,
            top_actors,
        })
    }

    /// Retention cleanup: delete low/medium entries older than the cutoff.
    /// High and critical entries are never deleted by this path. Returns
    /// the number of rows removed.
    pub async fn cleanup(&self, older_than_days: Option<u32>) -> CampusResult<u64> {
        let days = older_than_days.unwrap_or(self.config.retention_days);
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        let deleted = self.repo.delete_low_severity_before(cutoff).await?;
        if deleted > 0 {
            tracing::info!(deleted, days, "audit retention cleanup removed entries");
        }
        Ok(deleted)
    }
}
