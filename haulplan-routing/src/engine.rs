//! Plan store and re-router.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Instant;

use haulplan_core::{
    CellIndexer, GeometrySelector, Kpis, Location, OverlapIncident, PickPackOutput, Route,
    SeededVariability, Variability, default_cell_indexer,
};
use jiff::civil::Date;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reroute::perturb_routes;
use crate::{
    PlanRequest, RerouteReason, RerouteRequest, RouteBuilder, RoutingConfig, RoutingError,
    compute_kpis, detect_overlaps, sequence_pick_pack,
};

/// A completed planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Generated plan id, stable across re-routes.
    pub id: String,
    /// Service day the plan covers.
    pub service_date: Date,
    /// One route per truck that received stops.
    pub routes: Vec<Route>,
    /// Cells shared by trucks in overlapping time.
    pub overlap_incidents: Vec<OverlapIncident>,
    /// Performance indicators for `routes`.
    pub kpis: Kpis,
    /// Picking and loading instructions per route.
    pub pickpack: Vec<PickPackOutput>,
    /// Drawn path per truck id.
    pub geometries: BTreeMap<String, Vec<Location>>,
    /// Wall-clock seconds spent planning.
    pub runtime_seconds: f64,
}

/// Result of a re-route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerouteOutcome {
    /// The plan after re-routing.
    pub plan: Plan,
    /// Delivery stops whose ETA changed.
    pub changed_stops: usize,
    /// Delivery stops across the whole plan.
    pub total_stops: usize,
    /// `changed_stops / total_stops`, zero for an empty plan.
    pub changed_stops_pct: f64,
    /// Reason supplied with the request.
    pub reason: Option<RerouteReason>,
    /// Wall-clock seconds spent re-routing.
    pub runtime_seconds: f64,
}

/// Builds plans, caches them by id and re-routes them on request.
///
/// Randomised quantities (drive speed, ETA margins, pick slots and re-route
/// shifts) are drawn from the injected [`Variability`]. Plans live for the
/// lifetime of the engine.
///
/// The engine shares nothing with the inventory engine: callers that plan
/// routes and reserve stock must sequence the calls themselves and
/// compensate on partial failure.
pub struct RoutingEngine<V = SeededVariability> {
    config: RoutingConfig,
    cells: Box<dyn CellIndexer>,
    geometry: GeometrySelector,
    variability: Mutex<V>,
    plans: Mutex<HashMap<String, Plan>>,
}

impl<V> fmt::Debug for RoutingEngine<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingEngine")
            .field("config", &self.config)
            .field("geometry", &self.geometry)
            .field("plans", &self.plans.lock().len())
            .finish_non_exhaustive()
    }
}

impl RoutingEngine<SeededVariability> {
    /// Engine drawing variability from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_variability(SeededVariability::from_entropy())
    }

    /// Engine with reproducible variability.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_variability(SeededVariability::seeded(seed))
    }
}

impl Default for RoutingEngine<SeededVariability> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Variability> RoutingEngine<V> {
    /// Engine using `variability`, the default cell indexer and
    /// straight-line geometry.
    ///
    /// The default indexer is the H3 grid when the `h3` feature is enabled
    /// and the synthetic lattice otherwise.
    #[must_use]
    pub fn with_variability(variability: V) -> Self {
        Self {
            config: RoutingConfig::default(),
            cells: default_cell_indexer(),
            geometry: GeometrySelector::straight_line(),
            variability: Mutex::new(variability),
            plans: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: RoutingConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the cell indexer.
    #[must_use]
    pub fn with_cell_indexer(mut self, cells: impl CellIndexer + 'static) -> Self {
        self.cells = Box::new(cells);
        self
    }

    /// Replace the geometry selector.
    #[must_use]
    pub fn with_geometry(mut self, geometry: GeometrySelector) -> Self {
        self.geometry = geometry;
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Build, analyse and cache a plan for `request`.
    ///
    /// Geometry lookups run after the variability lock is released and
    /// before the plan is stored.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidPlanRequest`] for malformed requests
    /// and [`RoutingError::Schedule`] when simulated times overflow. Nothing
    /// is cached on error.
    pub fn plan(&self, request: &PlanRequest) -> Result<Plan, RoutingError> {
        let started = Instant::now();
        let (routes, pickpack) = {
            let mut variability = self.variability.lock();
            let builder = RouteBuilder::new(&self.config, &*self.cells);
            let routes = builder.build(request, &mut *variability)?;
            let pickpack = routes
                .iter()
                .map(|route| sequence_pick_pack(route, &self.config, &mut *variability))
                .collect::<Vec<_>>();
            (routes, pickpack)
        };
        let overlap_incidents = detect_overlaps(&routes, self.config.overlap_window_minutes)?;
        let geometries = routes
            .iter()
            .map(|route| {
                let waypoints: Vec<Location> =
                    route.stops.iter().map(|stop| stop.location).collect();
                (route.truck_id.clone(), self.geometry.geometry_for(&waypoints))
            })
            .collect();

        let runtime_seconds = started.elapsed().as_secs_f64();
        let kpis = compute_kpis(&routes, overlap_incidents.len(), runtime_seconds);
        let plan = Plan {
            id: Uuid::new_v4().to_string(),
            service_date: request.service_date,
            routes,
            overlap_incidents,
            kpis,
            pickpack,
            geometries,
            runtime_seconds,
        };
        log::info!(
            "plan {} built: {} routes, {} incidents, on-time {:.2}, {:.2} miles/order",
            plan.id,
            plan.routes.len(),
            plan.overlap_incidents.len(),
            plan.kpis.on_time_pct,
            plan.kpis.miles_per_order,
        );

        self.plans.lock().insert(plan.id.clone(), plan.clone());
        Ok(plan)
    }

    /// Perturb a cached plan within the request's change budget.
    ///
    /// The cached plan's routes, incidents and KPIs are replaced in place;
    /// pick/pack output and geometry are kept. A truck-scoped request naming
    /// a truck without a route changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidRerouteRequest`] for malformed
    /// requests, [`RoutingError::PlanNotFound`] for unknown plan ids and
    /// [`RoutingError::Schedule`] when shifted times overflow. The cached
    /// plan is untouched on error.
    pub fn reroute(&self, request: &RerouteRequest) -> Result<RerouteOutcome, RoutingError> {
        request.validate()?;
        let started = Instant::now();
        let mut plans = self.plans.lock();
        let plan = plans
            .get_mut(&request.plan_id)
            .ok_or_else(|| RoutingError::PlanNotFound {
                plan_id: request.plan_id.clone(),
            })?;

        if !plan.routes.iter().any(|route| request.in_scope(route)) {
            log::warn!(
                "re-route of plan {} matched no routes (truck {:?})",
                plan.id,
                request.truck_id
            );
        }

        let mut routes = plan.routes.clone();
        let changed_stops = {
            let mut variability = self.variability.lock();
            perturb_routes(&mut routes, request, &self.config, &mut *variability)?
        };
        let overlap_incidents = detect_overlaps(&routes, self.config.overlap_window_minutes)?;
        let total_stops: usize = routes.iter().map(Route::delivery_count).sum();
        let changed_stops_pct = if total_stops == 0 {
            0.0
        } else {
            changed_stops as f64 / total_stops as f64
        };

        let runtime_seconds = started.elapsed().as_secs_f64();
        plan.kpis = compute_kpis(&routes, overlap_incidents.len(), runtime_seconds);
        plan.runtime_seconds = runtime_seconds;
        plan.routes = routes;
        plan.overlap_incidents = overlap_incidents;

        log::info!(
            "re-routed plan {} ({:?}, reason {:?}): {changed_stops}/{total_stops} stops changed",
            plan.id,
            request.scope,
            request.reason,
        );

        Ok(RerouteOutcome {
            plan: plan.clone(),
            changed_stops,
            total_stops,
            changed_stops_pct,
            reason: request.reason,
            runtime_seconds,
        })
    }

    /// Cached plan with `plan_id`, if any.
    #[must_use]
    pub fn get_plan(&self, plan_id: &str) -> Option<Plan> {
        self.plans.lock().get(plan_id).cloned()
    }

    /// Number of cached plans.
    #[must_use]
    pub fn plan_count(&self) -> usize {
        self.plans.lock().len()
    }
}
