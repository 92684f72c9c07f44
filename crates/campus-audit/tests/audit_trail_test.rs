//! Integration tests for the audit trail over a real store, using
//! in-memory SurrealDB.

use campus_audit::{AuditConfig, AuditTrail};
use campus_core::models::audit::{
    ActorRef, AuditAction, AuditDetails, AuditEntry, NewAuditEntry, Severity,
};
use campus_core::rbac::{ResourceKind, Role};
use campus_core::repository::{AuditFilter, AuditLogRepository, Pagination};
use campus_db::repository::SurrealAuditLogRepository;
use chrono::{Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> (AuditTrail<SurrealAuditLogRepository<Db>>, SurrealAuditLogRepository<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    campus_db::run_migrations(&db).await.unwrap();
    let repo = SurrealAuditLogRepository::new(db.clone());
    (AuditTrail::new(repo.clone()), repo)
}

fn actor() -> ActorRef {
    ActorRef::new(Uuid::new_v4(), "Maria Keller", "maria@school-a.example")
}

#[tokio::test]
async fn record_classifies_and_round_trips() {
    let (trail, _) = setup().await;

    let promoted = ActorRef::new(Uuid::new_v4(), "New Head", "head@school-a.example");
    let entry = trail
        .record(
            NewAuditEntry::new(actor(), AuditAction::UpdateRole, "school-a")
                .target(promoted.clone())
                .resource(ResourceKind::User)
                .details(AuditDetails::RoleChange {
                    old_role: Role::Teacher,
                    new_role: Role::SuperAdmin,
                }),
        )
        .await
        .unwrap();
    assert_eq!(entry.severity, Severity::Critical);

    let page = trail
        .query(AuditFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0], entry);
    assert_eq!(page.items[0].target, Some(promoted.id));
}

#[tokio::test]
async fn stats_aggregate_per_tenant() {
    let (trail, _) = setup().await;
    let alice = actor();

    for _ in 0..3 {
        trail
            .record(NewAuditEntry::new(alice.clone(), AuditAction::Login, "school-a"))
            .await
            .unwrap();
    }
    trail
        .record(
            NewAuditEntry::new(alice.clone(), AuditAction::TenantAccessViolation, "school-a")
                .details(AuditDetails::TenantAccess {
                    requested_tenant: "school-b".into(),
                }),
        )
        .await
        .unwrap();
    trail
        .record(NewAuditEntry::new(actor(), AuditAction::Login, "school-b"))
        .await
        .unwrap();

    let stats = trail.stats(Some("school-a".into()), None, None).await.unwrap();
    assert_eq!(stats.total_events, 4);
    assert_eq!(stats.events_by_action[0], (AuditAction::Login, 3));
    assert_eq!(stats.events_by_severity[0], (Severity::Medium, 3));
    assert_eq!(stats.recent_critical.len(), 1);
    assert_eq!(stats.recent_critical[0].action, AuditAction::TenantAccessViolation);
    assert_eq!(stats.top_actors[0].actor, alice.id);
    assert_eq!(stats.top_actors[0].count, 4);
}

#[tokio::test]
async fn cleanup_spares_high_severity_and_is_idempotent() {
    let (trail, repo) = setup().await;
    let cutoff_days = trail.config().retention_days;
    let ancient = Utc::now() - Duration::days(i64::from(cutoff_days) + 30);

    // Backdated entries go straight through the repository; the trail
    // itself always stamps "now".
    for (severity, action) in [
        (Severity::Low, AuditAction::Logout),
        (Severity::Medium, AuditAction::Login),
        (Severity::High, AuditAction::DeleteUser),
        (Severity::Critical, AuditAction::TenantAccessViolation),
    ] {
        repo.append(AuditEntry {
            id: Uuid::new_v4(),
            actor: Uuid::new_v4(),
            actor_name: None,
            actor_email: None,
            action,
            target: None,
            target_name: None,
            target_email: None,
            resource: None,
            details: AuditDetails::None,
            tenant: "school-a".into(),
            ip_address: None,
            user_agent: None,
            timestamp: ancient,
            severity,
        })
        .await
        .unwrap();
    }
    // Fresh low-severity entry, inside the retention window.
    trail
        .record(NewAuditEntry::new(actor(), AuditAction::Logout, "school-a"))
        .await
        .unwrap();

    let deleted = trail.cleanup(None).await.unwrap();
    assert_eq!(deleted, 2);

    let remaining = trail
        .query(AuditFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(remaining.total, 3);

    // A second pass finds nothing left to remove.
    assert_eq!(trail.cleanup(None).await.unwrap(), 0);
}

#[tokio::test]
async fn export_csv_shape_and_escaping() {
    let (trail, _) = setup().await;

    trail
        .record(
            NewAuditEntry::new(
                ActorRef::new(Uuid::new_v4(), "Keller, Maria", "maria@school-a.example"),
                AuditAction::DataExport,
                "school-a",
            )
            .resource(ResourceKind::Report)
            .client(Some("192.0.2.7".into()), None),
        )
        .await
        .unwrap();

    let csv = trail.export_csv(AuditFilter::default()).await.unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Timestamp,Actor,Action,Target,Resource,Severity,Details,Tenant,IP Address"
    );

    let row = lines.next().unwrap();
    // The comma in the display name forces quoting.
    assert!(row.contains("\"Keller, Maria (maria@school-a.example)\""));
    assert!(row.contains("data_export"));
    assert!(row.contains("N/A")); // no target
    assert!(row.contains("report"));
    assert!(row.contains("school-a"));
    assert!(row.contains("192.0.2.7"));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn export_respects_row_cap_and_ordering() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    campus_db::run_migrations(&db).await.unwrap();
    let trail = AuditTrail::with_config(
        SurrealAuditLogRepository::new(db),
        AuditConfig {
            export_max_rows: 3,
            ..Default::default()
        },
    );

    let alice = actor();
    for n in 1..=5 {
        trail
            .record(
                NewAuditEntry::new(alice.clone(), AuditAction::Login, "school-a")
                    .client(Some(format!("192.0.2.{n}")), None),
            )
            .await
            .unwrap();
    }

    let csv = trail.export_csv(AuditFilter::default()).await.unwrap();
    // Header plus exactly the capped number of rows.
    assert_eq!(csv.lines().count(), 4);

    // The cap keeps the newest entries: rows come back newest first.
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert!(rows[0].contains("192.0.2.5"));
    assert!(rows[1].contains("192.0.2.4"));
    assert!(rows[2].contains("192.0.2.3"));
}

#[tokio::test]
async fn best_effort_write_succeeds_against_healthy_store() {
    let (trail, repo) = setup().await;

    let entry = trail
        .record_best_effort(NewAuditEntry::new(actor(), AuditAction::Login, "school-a"))
        .await;
    assert!(entry.is_some());
    assert_eq!(repo.count(AuditFilter::default()).await.unwrap(), 1);
}
