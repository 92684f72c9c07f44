//! Campus Policy — the authorization policy evaluator.
//!
//! Checks are independent, stateless predicate objects: given identical
//! inputs they always return the same allow/deny-with-reason result. A
//! handler composes exactly the subset it needs; there is no implicit
//! global chain. Every denial carries a pre-built audit event that the
//! evaluator writes before returning the error.

pub mod check;
pub mod evaluator;
pub mod guard;

pub use check::{Decision, PolicyCheck, RequestContext, RequirePermission, RequireRole};
pub use evaluator::PolicyEvaluator;
pub use guard::{creation_guard, update_guard};
