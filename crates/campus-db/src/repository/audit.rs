//! SurrealDB implementation of [`AuditLogRepository`].
//!
//! The `audit_log` table is append-only: the schema forbids updates and
//! the only delete path is the retention cleanup, which spares high and
//! critical entries. Structured details are stored as a FLEXIBLE object
//! and round-trip through `serde_json::Value`.

use campus_core::error::CampusResult;
use campus_core::models::audit::{AuditAction, AuditDetails, AuditEntry, Severity};
use campus_core::rbac::ResourceKind;
use campus_core::repository::{
    ActorCount, AuditFilter, AuditLogRepository, PaginatedResult, Pagination,
};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AuditRowWithId {
    record_id: String,
    actor: String,
    actor_name: Option<String>,
    actor_email: Option<String>,
    action: String,
    target: Option<String>,
    target_name: Option<String>,
    target_email: Option<String>,
    resource: Option<String>,
    details: serde_json::Value,
    tenant: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    timestamp: DateTime<Utc>,
    severity: String,
}

impl AuditRowWithId {
    fn try_into_entry(self) -> Result<AuditEntry, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let actor = Uuid::parse_str(&self.actor)
            .map_err(|e| DbError::Decode(format!("invalid actor UUID: {e}")))?;
        let target = self
            .target
            .map(|t| Uuid::parse_str(&t))
            .transpose()
            .map_err(|e| DbError::Decode(format!("invalid target UUID: {e}")))?;
        let resource = self
            .resource
            .map(|r| {
                ResourceKind::from_name(&r)
                    .ok_or_else(|| DbError::Decode(format!("unknown resource: {r}")))
            })
            .transpose()?;
        let details: AuditDetails = serde_json::from_value(self.details)
            .map_err(|e| DbError::Decode(format!("invalid details payload: {e}")))?;

        Ok(AuditEntry {
            id,
            actor,
            actor_name: self.actor_name,
            actor_email: self.actor_email,
            action: parse_action(&self.action)?,
            target,
            target_name: self.target_name,
            target_email: self.target_email,
            resource,
            details,
            tenant: self.tenant,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            timestamp: self.timestamp,
            severity: parse_severity(&self.severity)?,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Row struct for per-action aggregates.
#[derive(Debug, SurrealValue)]
struct ActionCountRow {
    action: String,
    total: u64,
}

/// Row struct for per-severity aggregates.
#[derive(Debug, SurrealValue)]
struct SeverityCountRow {
    severity: String,
    total: u64,
}

/// Row struct for the top-actors aggregate.
#[derive(Debug, SurrealValue)]
struct ActorCountRow {
    actor: String,
    actor_name: Option<String>,
    total: u64,
}

fn parse_action(s: &str) -> Result<AuditAction, DbError> {
    AuditAction::from_name(s).ok_or_else(|| DbError::Decode(format!("unknown action: {s}")))
}

fn parse_severity(s: &str) -> Result<Severity, DbError> {
    Severity::from_name(s).ok_or_else(|| DbError::Decode(format!("unknown severity: {s}")))
}

/// Assemble a WHERE clause for the filter. Bind values are attached by
/// [`bind_filter`] in the same order; the two must stay in sync.
fn filter_clause(filter: &AuditFilter) -> String {
    let mut conds = Vec::new();
    if filter.tenant.is_some() {
        conds.push("tenant = $tenant");
    }
    if filter.actor.is_some() {
        conds.push("actor = $actor");
    }
    if filter.action.is_some() {
        conds.push("action = $action");
    }
    if filter.resource.is_some() {
        conds.push("resource = $resource");
    }
    if filter.severity.is_some() {
        conds.push("severity = $severity");
    }
    if filter.from.is_some() {
        conds.push("timestamp >= $from");
    }
    if filter.to.is_some() {
        conds.push("timestamp <= $to");
    }
    if conds.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conds.join(" AND "))
    }
}

/// SurrealDB implementation of the audit log repository.
#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

// The conditional binds below mirror filter_clause condition-for-condition.
macro_rules! bind_filter {
    ($builder:expr, $filter:expr) => {{
        let mut builder = $builder;
        if let Some(tenant) = $filter.tenant {
            builder = builder.bind(("tenant", tenant));
        }
        if let Some(actor) = $filter.actor {
            builder = builder.bind(("actor", actor.to_string()));
        }
        if let Some(action) = $filter.action {
            builder = builder.bind(("action", action.as_str().to_string()));
        }
        if let Some(resource) = $filter.resource {
            builder = builder.bind(("resource", resource.as_str().to_string()));
        }
        if let Some(severity) = $filter.severity {
            builder = builder.bind(("severity", severity.as_str().to_string()));
        }
        if let Some(from) = $filter.from {
            builder = builder.bind(("from", from));
        }
        if let Some(to) = $filter.to {
            builder = builder.bind(("to", to));
        }
        builder
    }};
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    async fn append(&self, entry: AuditEntry) -> CampusResult<()> {
        let id_str = entry.id.to_string();
        let details = serde_json::to_value(&entry.details)
            .map_err(|e| DbError::Decode(format!("details serialization failed: {e}")))?;

        let result = self
            .db
            .query(
                "CREATE type::record('audit_log', $id) SET \
                 actor = $actor, \
                 actor_name = $actor_name, actor_email = $actor_email, \
                 action = $action, \
                 target = $target, \
                 target_name = $target_name, target_email = $target_email, \
                 resource = $resource, \
                 details = $details, \
                 tenant = $tenant, \
                 ip_address = $ip_address, user_agent = $user_agent, \
                 timestamp = $timestamp, \
                 severity = $severity",
            )
            .bind(("id", id_str))
            .bind(("actor", entry.actor.to_string()))
            .bind(("actor_name", entry.actor_name))
            .bind(("actor_email", entry.actor_email))
            .bind(("action", entry.action.as_str().to_string()))
            .bind(("target", entry.target.map(|t| t.to_string())))
            .bind(("target_name", entry.target_name))
            .bind(("target_email", entry.target_email))
            .bind(("resource", entry.resource.map(|r| r.as_str().to_string())))
            .bind(("details", details))
            .bind(("tenant", entry.tenant))
            .bind(("ip_address", entry.ip_address))
            .bind(("user_agent", entry.user_agent))
            .bind(("timestamp", entry.timestamp))
            .bind(("severity", entry.severity.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }

    async fn list(
        &self,
        filter: AuditFilter,
        pagination: Pagination,
    ) -> CampusResult<PaginatedResult<AuditEntry>> {
        let clause = filter_clause(&filter);

        let count_query = format!("SELECT count() AS total FROM audit_log{clause} GROUP ALL");
        let builder = self.db.query(&count_query);
        let mut count_result = bind_filter!(builder, filter.clone())
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM audit_log{clause} \
             ORDER BY timestamp DESC \
             LIMIT $limit START $offset"
        );
        let builder = self
            .db
            .query(&query)
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        let mut result = bind_filter!(builder, filter).await.map_err(DbError::from)?;

        let rows: Vec<AuditRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn count(&self, filter: AuditFilter) -> CampusResult<u64> {
        let clause = filter_clause(&filter);
        let query = format!("SELECT count() AS total FROM audit_log{clause} GROUP ALL");

        let builder = self.db.query(&query);
        let mut result = bind_filter!(builder, filter).await.map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn action_counts(&self, filter: AuditFilter) -> CampusResult<Vec<(AuditAction, u64)>> {
        let clause = filter_clause(&filter);
        let query = format!(
            "SELECT action, count() AS total FROM audit_log{clause} GROUP BY action"
        );

        let builder = self.db.query(&query);
        let mut result = bind_filter!(builder, filter).await.map_err(DbError::from)?;
        let rows: Vec<ActionCountRow> = result.take(0).map_err(DbError::from)?;

        let mut counts = rows
            .into_iter()
            .map(|row| Ok((parse_action(&row.action)?, row.total)))
            .collect::<Result<Vec<_>, DbError>>()?;
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(counts)
    }

    async fn severity_counts(&self, filter: AuditFilter) -> CampusResult<Vec<(Severity, u64)>> {
        let clause = filter_clause(&filter);
        let query = format!(
            "SELECT severity, count() AS total FROM audit_log{clause} GROUP BY severity"
        );

        let builder = self.db.query(&query);
        let mut result = bind_filter!(builder, filter).await.map_err(DbError::from)?;
        let rows: Vec<SeverityCountRow> = result.take(0).map_err(DbError::from)?;

        let mut counts = rows
            .into_iter()
            .map(|row| Ok((parse_severity(&row.severity)?, row.total)))
            .collect::<Result<Vec<_>, DbError>>()?;
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(counts)
    }

    async fn top_actors(&self, filter: AuditFilter, limit: u64) -> CampusResult<Vec<ActorCount>> {
        let clause = filter_clause(&filter);
        // Ordering and the cutoff both stay in the query so only the top
        // groups cross the wire.
        let query = format!(
            "SELECT actor, actor_name, count() AS total FROM audit_log{clause} \
             GROUP BY actor, actor_name ORDER BY total DESC LIMIT $limit"
        );

        let builder = self.db.query(&query).bind(("limit", limit));
        let mut result = bind_filter!(builder, filter).await.map_err(DbError::from)?;
        let rows: Vec<ActorCountRow> = result.take(0).map_err(DbError::from)?;

        let actors = rows
            .into_iter()
            .map(|row| {
                let actor = Uuid::parse_str(&row.actor)
                    .map_err(|e| DbError::Decode(format!("invalid actor UUID: {e}")))?;
                Ok(ActorCount {
                    actor,
                    actor_name: row.actor_name,
                    count: row.total,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(actors)
    }

    async fn recent_critical(
        &self,
        tenant: Option<String>,
        limit: u64,
    ) -> CampusResult<Vec<AuditEntry>> {
        let query = if tenant.is_some() {
            "SELECT meta::id(id) AS record_id, * FROM audit_log \
             WHERE severity = 'critical' AND tenant = $tenant \
             ORDER BY timestamp DESC LIMIT $limit"
        } else {
            "SELECT meta::id(id) AS record_id, * FROM audit_log \
             WHERE severity = 'critical' \
             ORDER BY timestamp DESC LIMIT $limit"
        };

        let mut builder = self.db.query(query).bind(("limit", limit));
        if let Some(tenant) = tenant {
            builder = builder.bind(("tenant", tenant));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<AuditRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn delete_low_severity_before(&self, cutoff: DateTime<Utc>) -> CampusResult<u64> {
        // Count first, then delete. High and critical entries are never
        // touched so the durable security record survives retention.
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM audit_log \
                 WHERE severity IN ['low', 'medium'] AND timestamp < $cutoff \
                 GROUP ALL; \
                 DELETE FROM audit_log \
                 WHERE severity IN ['low', 'medium'] AND timestamp < $cutoff",
            )
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
