//! Re-route requests and bounded perturbation of cached routes.

use haulplan_core::schedule::add_minutes;
use haulplan_core::{Route, Variability};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{RoutingConfig, RoutingError};

/// Largest accepted change budget.
pub const MAX_CHANGE_LIMIT: f64 = 0.6;
/// Accepted range of locked leading stops.
pub const LOCK_HOPS_RANGE: std::ops::RangeInclusive<u8> = 1..=3;

/// Which routes a re-route may alter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerouteScope {
    /// Every route in the plan.
    #[default]
    Global,
    /// Only the route of [`RerouteRequest::truck_id`].
    Truck,
}

/// Why a re-route was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerouteReason {
    /// A road or site incident.
    Incident,
    /// Deliveries at risk of missing their window.
    EtaRisk,
    /// A stock shortfall.
    Stock,
    /// Operator decision.
    Manual,
    /// Anything else.
    Other,
}

/// Request to perturb a cached plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerouteRequest {
    /// Plan to alter.
    pub plan_id: String,
    /// Routes in scope.
    #[serde(default)]
    pub scope: RerouteScope,
    /// Truck to alter when `scope` is [`RerouteScope::Truck`].
    #[serde(default)]
    pub truck_id: Option<String>,
    /// Share of each in-scope route's deliveries that may change, in `[0, 0.6]`.
    pub change_limit: f64,
    /// Leading deliveries that must stay untouched, in `1..=3`.
    pub lock_hops: u8,
    /// Optional reason, echoed in the outcome.
    #[serde(default)]
    pub reason: Option<RerouteReason>,
}

/// Reasons a [`RerouteRequest`] is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RerouteValidationError {
    /// Truck scope without a truck id.
    #[error("scope=truck requires a truck_id")]
    MissingTruckId,
    /// Change budget outside `[0, 0.6]`.
    #[error("change_limit {value} is outside [0, {MAX_CHANGE_LIMIT}]")]
    ChangeLimitOutOfRange {
        /// Rejected value.
        value: f64,
    },
    /// Locked stop count outside `1..=3`.
    #[error("lock_hops {value} is outside 1..=3")]
    LockHopsOutOfRange {
        /// Rejected value.
        value: u8,
    },
}

impl RerouteRequest {
    /// Re-route of the whole plan.
    #[must_use]
    pub fn global(plan_id: impl Into<String>, change_limit: f64, lock_hops: u8) -> Self {
        Self {
            plan_id: plan_id.into(),
            scope: RerouteScope::Global,
            truck_id: None,
            change_limit,
            lock_hops,
            reason: None,
        }
    }

    /// Re-route restricted to one truck.
    #[must_use]
    pub fn for_truck(
        plan_id: impl Into<String>,
        truck_id: impl Into<String>,
        change_limit: f64,
        lock_hops: u8,
    ) -> Self {
        Self {
            scope: RerouteScope::Truck,
            truck_id: Some(truck_id.into()),
            ..Self::global(plan_id, change_limit, lock_hops)
        }
    }

    /// Attach a reason.
    #[must_use]
    pub fn with_reason(mut self, reason: RerouteReason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Check scope, budget and lock bounds.
    ///
    /// # Errors
    ///
    /// Returns the first [`RerouteValidationError`] found.
    pub fn validate(&self) -> Result<(), RerouteValidationError> {
        if self.scope == RerouteScope::Truck && self.truck_id.is_none() {
            return Err(RerouteValidationError::MissingTruckId);
        }
        if !(0.0..=MAX_CHANGE_LIMIT).contains(&self.change_limit) {
            return Err(RerouteValidationError::ChangeLimitOutOfRange {
                value: self.change_limit,
            });
        }
        if !LOCK_HOPS_RANGE.contains(&self.lock_hops) {
            return Err(RerouteValidationError::LockHopsOutOfRange {
                value: self.lock_hops,
            });
        }
        Ok(())
    }

    pub(crate) fn in_scope(&self, route: &Route) -> bool {
        match self.scope {
            RerouteScope::Global => true,
            RerouteScope::Truck => self.truck_id.as_deref() == Some(route.truck_id.as_str()),
        }
    }
}

/// Shift ETAs of a bounded number of unlocked deliveries in each in-scope
/// route and return how many stops were altered.
///
/// Each route may change at most `floor(deliveries * change_limit)` stops,
/// never touching its first `lock_hops` deliveries. Routes with at least one
/// change have their distance and drive time rescaled.
pub(crate) fn perturb_routes(
    routes: &mut [Route],
    request: &RerouteRequest,
    config: &RoutingConfig,
    variability: &mut dyn Variability,
) -> Result<usize, RoutingError> {
    let max_shift = i64::from(config.reroute_max_shift_minutes.max(1));
    let scale = config.reroute_scale;
    let mut changed = 0;

    for route in routes.iter_mut().filter(|route| request.in_scope(route)) {
        let deliveries = route.stops.iter().filter(|stop| stop.is_delivery()).count();
        let budget = (deliveries as f64 * request.change_limit).floor() as i64;
        let unlocked = deliveries.saturating_sub(usize::from(request.lock_hops));
        let drawn = usize::try_from(variability.integer(0, budget)).unwrap_or(0);
        let changes = drawn.min(unlocked);

        let shifted = route
            .stops
            .iter_mut()
            .filter(|stop| stop.is_delivery())
            .skip(usize::from(request.lock_hops))
            .take(changes);
        for stop in shifted {
            let magnitude = variability.integer(1, max_shift) as f64;
            let shift = if variability.integer(0, 1) == 0 {
                -magnitude
            } else {
                magnitude
            };
            stop.eta = add_minutes(stop.eta, shift)?;
        }

        if changes > 0 {
            route.total_distance_km *= variability.uniform(scale.low, scale.high);
            route.total_drive_minutes *= variability.uniform(scale.low, scale.high);
        }
        changed += changes;
    }
    Ok(changed)
}
