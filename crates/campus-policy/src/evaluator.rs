//! The policy evaluator: composes checks and writes denial audits.

use campus_audit::AuditTrail;
use campus_core::error::CampusResult;
use campus_core::models::principal::Principal;
use campus_core::repository::AuditLogRepository;

use crate::check::{Decision, PolicyCheck, RequestContext};

/// Runs an ordered list of checks against a principal, short-circuiting
/// on the first denial. The denial's audit event is written best-effort
/// (a permission-denied notice must never fail the request for a second
/// reason) before the error is returned.
pub struct PolicyEvaluator<'a, R: AuditLogRepository> {
    trail: &'a AuditTrail<R>,
}

impl<'a, R: AuditLogRepository> PolicyEvaluator<'a, R> {
    pub fn new(trail: &'a AuditTrail<R>) -> Self {
        Self { trail }
    }

    /// Evaluate checks in order; the first deny wins.
    pub async fn enforce(
        &self,
        checks: &[&dyn PolicyCheck],
        principal: &Principal,
        ctx: &RequestContext,
    ) -> CampusResult<()> {
        for check in checks {
            self.apply(check.evaluate(principal, ctx)).await?;
        }
        Ok(())
    }

    /// Resolve a single pre-computed decision, auditing on denial. Used
    /// for the creation and update guards, which need extra inputs beyond
    /// the `PolicyCheck` shape.
    pub async fn apply(&self, decision: Decision) -> CampusResult<()> {
        match decision {
            Decision::Allow => Ok(()),
            Decision::Deny { error, event } => {
                self.trail.record_best_effort(event).await;
                Err(error)
            }
        }
    }
}
