//! Errors returned by the routing engine.

use haulplan_core::ScheduleError;
use thiserror::Error;

use crate::{PlanRequestValidationError, RerouteValidationError};

/// Errors from [`RoutingEngine`](crate::RoutingEngine) operations.
///
/// Validation failures leave the plan store untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// The planning request was malformed.
    #[error("invalid plan request: {0}")]
    InvalidPlanRequest(#[from] PlanRequestValidationError),
    /// The re-route request was malformed.
    #[error("invalid re-route request: {0}")]
    InvalidRerouteRequest(#[from] RerouteValidationError),
    /// No cached plan has the requested id.
    #[error("plan {plan_id} not found")]
    PlanNotFound {
        /// Requested plan id.
        plan_id: String,
    },
    /// Simulated times left the representable range.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
