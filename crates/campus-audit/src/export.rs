//! CSV export of audit entries.
//!
//! Fixed column order for interop: Timestamp, Actor, Action, Target,
//! Resource, Severity, Details (JSON-encoded), Tenant, IP Address.
//! Actor and target render as `Name (email)` or `N/A`.

use campus_core::error::CampusResult;
use campus_core::models::audit::AuditEntry;
use campus_core::repository::{AuditFilter, AuditLogRepository, Pagination};

use crate::trail::AuditTrail;

const CSV_HEADER: &str =
    "Timestamp,Actor,Action,Target,Resource,Severity,Details,Tenant,IP Address";

impl<R: AuditLogRepository> AuditTrail<R> {
    /// Export matching entries as CSV, newest first, capped at the
    /// configured row limit (default 10,000) to bound memory.
    pub async fn export_csv(&self, filter: AuditFilter) -> CampusResult<String> {
        let page = self
            .query(
                filter,
                Pagination {
                    offset: 0,
                    limit: self.config().export_max_rows,
                },
            )
            .await?;

        let mut out = String::with_capacity(128 * (page.items.len() + 1));
        out.push_str(CSV_HEADER);
        out.push('\n');
        for entry in &page.items {
            out.push_str(&render_row(entry));
            out.push('\n');
        }
        Ok(out)
    }
}

fn render_row(entry: &AuditEntry) -> String {
    let details_json =
        serde_json::to_string(&entry.details).unwrap_or_else(|_| "{}".to_string());
    let fields = [
        entry.timestamp.to_rfc3339(),
        render_user(entry.actor_name.as_deref(), entry.actor_email.as_deref()),
        entry.action.to_string(),
        match entry.target {
            Some(_) => render_user(entry.target_name.as_deref(), entry.target_email.as_deref()),
            None => "N/A".to_string(),
        },
        entry.resource.map(|r| r.to_string()).unwrap_or_default(),
        entry.severity.to_string(),
        details_json,
        entry.tenant.clone(),
        entry.ip_address.clone().unwrap_or_default(),
    ];
    fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render a weak user reference as `Name (email)`, falling back to
/// whichever display field survived, or `N/A`.
fn render_user(name: Option<&str>, email: Option<&str>) -> String {
    match (name, email) {
        (Some(n), Some(e)) => format!("{n} ({e})"),
        (Some(n), None) => n.to_string(),
        (None, Some(e)) => e.to_string(),
        (None, None) => "N/A".to_string(),
    }
}

/// RFC 4180-style quoting: fields containing commas, quotes, or newlines
/// are wrapped in double quotes with inner quotes doubled.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::models::audit::{AuditAction, AuditDetails, Severity};
    use campus_core::rbac::ResourceKind;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_entry() -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            actor: Uuid::new_v4(),
            actor_name: Some("Priya Nair".into()),
            actor_email: Some("priya@school-a.example".into()),
            action: AuditAction::PermissionDenied,
            target: None,
            target_name: None,
            target_email: None,
            resource: Some(ResourceKind::Fee),
            details: AuditDetails::PermissionDenied {
                resource: Some(ResourceKind::Fee),
                action: None,
                reason: "no grant, said \"denied\"".into(),
            },
            tenant: "school-a".into(),
            ip_address: Some("10.0.0.7".into()),
            user_agent: None,
            timestamp: Utc::now(),
            severity: Severity::Medium,
        }
    }

    #[test]
    fn header_has_the_contract_columns() {
        assert_eq!(
            CSV_HEADER,
            "Timestamp,Actor,Action,Target,Resource,Severity,Details,Tenant,IP Address"
        );
    }

    #[test]
    fn row_renders_actor_and_na_target() {
        let row = render_row(&sample_entry());
        assert!(row.contains("Priya Nair (priya@school-a.example)"));
        assert!(row.contains(",N/A,"));
        assert!(row.contains(",fee,"));
        assert!(row.contains(",medium,"));
        assert!(row.ends_with("school-a,10.0.0.7"));
    }

    #[test]
    fn details_json_is_quoted_and_escaped() {
        let row = render_row(&sample_entry());
        // The JSON payload contains commas and quotes, so it must arrive
        // as a single quoted CSV field with doubled inner quotes.
        assert!(row.contains("\"{\"\"kind\"\""));
        // Unquoting restores valid JSON.
        let quoted_start = row.find("\"{").unwrap();
        let quoted_end = row.rfind("}\"").unwrap() + 1;
        let unquoted = row[quoted_start + 1..quoted_end].replace("\"\"", "\"");
        let value: serde_json::Value = serde_json::from_str(&unquoted).unwrap();
        assert_eq!(value["kind"], "permission_denied");
    }

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(escape_field("school-a"), "school-a");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn missing_display_fields_render_na() {
        assert_eq!(render_user(None, None), "N/A");
        assert_eq!(render_user(Some("Ana"), None), "Ana");
        assert_eq!(
            render_user(None, Some("ana@example.com")),
            "ana@example.com"
        );
    }
}
