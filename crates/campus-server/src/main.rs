//! Campus Server — application entry point.
//!
//! Connects to SurrealDB, applies migrations, and runs the daily audit
//! retention sweep until shutdown.

use std::time::Duration;

use campus_audit::AuditTrail;
use campus_db::repository::SurrealAuditLogRepository;
use campus_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("campus=info".parse()?),
        )
        .json()
        .init();

    tracing::info!("Starting campus server...");

    let db_config = DbConfig::from_env();
    let manager = DbManager::connect(&db_config).await?;
    campus_db::run_migrations(manager.client()).await?;

    // Daily retention sweep. High and critical entries are exempt, so
    // this never erodes the durable security record.
    let trail = AuditTrail::new(SurrealAuditLogRepository::new(manager.client().clone()));
    let sweeper = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(24 * 60 * 60));
        loop {
            interval.tick().await;
            match trail.cleanup(None).await {
                Ok(deleted) => {
                    tracing::info!(deleted, "audit retention sweep complete");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "audit retention sweep failed");
                }
            }
        }
    });

    tracing::info!("Campus server ready");
    tokio::signal::ctrl_c().await?;

    sweeper.abort();
    tracing::info!("Campus server stopped.");
    Ok(())
}
