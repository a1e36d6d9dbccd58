//! Plan-level KPI computation.

use haulplan_core::schedule::add_minutes;
use haulplan_core::{KM_TO_MILES, Kpis, Route, RouteStop};

/// Whether a delivery is expected on time.
///
/// A stop is on time when its ETA pushed out by the upper confidence margin
/// still falls no later than its due time. Stops without a due time are
/// always on time.
#[must_use]
pub fn is_on_time(stop: &RouteStop) -> bool {
    let Some(due_by) = stop.due_by else {
        return true;
    };
    let margin = stop.eta_confidence_high.unwrap_or(0.0);
    add_minutes(stop.eta, margin).is_ok_and(|latest| latest <= due_by)
}

/// Compute plan KPIs from `routes`.
///
/// Ratios are taken over the number of delivery stops and are zero when
/// there are none.
#[must_use]
pub fn compute_kpis(routes: &[Route], incident_count: usize, runtime_seconds: f64) -> Kpis {
    let deliveries: usize = routes.iter().map(Route::delivery_count).sum();
    if deliveries == 0 {
        return Kpis {
            runtime_seconds,
            ..Kpis::default()
        };
    }
    let on_time = routes
        .iter()
        .flat_map(Route::deliveries)
        .filter(|stop| is_on_time(stop))
        .count();
    let total_km: f64 = routes.iter().map(|route| route.total_distance_km).sum();
    let deliveries = deliveries as f64;

    Kpis {
        on_time_pct: on_time as f64 / deliveries,
        overlap_pct: incident_count as f64 / deliveries,
        miles_per_order: total_km * KM_TO_MILES / deliveries,
        runtime_seconds,
    }
}
