//! Capacity-constrained nearest-neighbour route construction.

use haulplan_core::distance::scaled_distance_km;
use haulplan_core::schedule::add_minutes;
use haulplan_core::{
    CellId, CellIndexer, Depot, Location, Route, RouteStop, Stop, StopKind, Truck, Variability,
};
use jiff::Timestamp;

use crate::{PlanRequest, RoutingConfig, RoutingError};

/// Builds one route per truck from a [`PlanRequest`].
///
/// Stops are first assigned to their nearest depot. Trucks sharing a depot
/// draw from the same pool in request order, so a stop is visited at most
/// once per plan. A truck whose depot pool is already empty gets no route.
///
/// # Examples
///
/// ```
/// use haulplan_core::{Depot, Location, SeededVariability, Stop, SyntheticCellIndexer, Truck};
/// use haulplan_routing::{PlanParams, PlanRequest, RouteBuilder, RoutingConfig};
/// use jiff::civil::date;
///
/// let config = RoutingConfig::default();
/// let builder = RouteBuilder::new(&config, &SyntheticCellIndexer);
/// let request = PlanRequest {
///     service_date: date(2024, 3, 1),
///     depots: vec![Depot { id: "north".into(), location: Location { lat: 43.76, lon: -79.41 } }],
///     trucks: vec![Truck { id: "T1".into(), depot_id: "north".into(), capacity_volume: 50.0 }],
///     stops: vec![Stop::new("ORD-1", "FRAN_001", Location { lat: 43.70, lon: -79.40 }, 20.0)],
///     params: PlanParams::default(),
/// };
///
/// let routes = builder.build(&request, &mut SeededVariability::seeded(1))?;
/// assert_eq!(routes[0].stops.len(), 3);
/// assert_eq!(routes[0].utilization, 0.4);
/// # Ok::<(), haulplan_routing::RoutingError>(())
/// ```
pub struct RouteBuilder<'a> {
    config: &'a RoutingConfig,
    cells: &'a dyn CellIndexer,
}

impl<'a> RouteBuilder<'a> {
    /// Builder using `config` and indexing visits with `cells`.
    #[must_use]
    pub fn new(config: &'a RoutingConfig, cells: &'a dyn CellIndexer) -> Self {
        Self { config, cells }
    }

    /// Build routes for every truck that has stops available at its depot.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidPlanRequest`] when the request fails
    /// validation and [`RoutingError::Schedule`] when simulated times
    /// overflow.
    pub fn build(
        &self,
        request: &PlanRequest,
        variability: &mut dyn Variability,
    ) -> Result<Vec<Route>, RoutingError> {
        request.validate()?;
        let mut pools = self.assign_to_depots(&request.depots, &request.stops);
        let mut routes = Vec::with_capacity(request.trucks.len());

        for truck in &request.trucks {
            let Some((depot, pool)) = request
                .depots
                .iter()
                .zip(pools.iter_mut())
                .find(|(depot, _)| depot.id == truck.depot_id)
            else {
                continue;
            };
            if pool.is_empty() {
                log::debug!(
                    "truck {} has no stops left at depot {}",
                    truck.id,
                    truck.depot_id
                );
                continue;
            }
            let route = self.build_route(request, truck, depot, pool, variability)?;
            routes.push(route);
        }
        Ok(routes)
    }

    fn assign_to_depots<'s>(&self, depots: &[Depot], stops: &'s [Stop]) -> Vec<Vec<&'s Stop>> {
        let mut pools = vec![Vec::new(); depots.len()];
        for stop in stops {
            let locations = depots.iter().map(|depot| depot.location);
            if let Some(pool) = self
                .nearest(stop.location, locations)
                .and_then(|index| pools.get_mut(index))
            {
                pool.push(stop);
            }
        }
        pools
    }

    /// Index of the closest candidate; the first one wins on ties.
    fn nearest(&self, from: Location, candidates: impl Iterator<Item = Location>) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, location) in candidates.enumerate() {
            let distance = self.distance_km(from, location);
            if best.is_none_or(|(_, closest)| distance < closest) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }

    fn build_route(
        &self,
        request: &PlanRequest,
        truck: &Truck,
        depot: &Depot,
        pool: &mut Vec<&Stop>,
        variability: &mut dyn Variability,
    ) -> Result<Route, RoutingError> {
        let resolution = request.params.cell_resolution;
        let departure = request.params.window_start.on(request.service_date)?;
        let mut stops = vec![self.bookend(
            format!("depot_start_{}", truck.id),
            depot.location,
            departure,
            resolution,
        )];

        let mut position = depot.location;
        let mut clock = departure;
        let mut load = 0.0;
        let mut distance_km = 0.0;
        let mut drive_minutes = 0.0;

        while let Some((index, stop)) = self
            .nearest(position, pool.iter().map(|stop| stop.location))
            .and_then(|index| pool.get(index).map(|stop| (index, *stop)))
        {
            if load + stop.volume > truck.capacity_volume {
                break;
            }
            pool.remove(index);

            let leg_km = self.distance_km(position, stop.location);
            let speed = self.config.speed_band;
            let leg_minutes = leg_km * variability.uniform(speed.low, speed.high);
            clock = add_minutes(clock, leg_minutes)?;
            distance_km += leg_km;
            drive_minutes += leg_minutes;
            load += stop.volume;

            let low = self.config.eta_confidence_low;
            let high = self.config.eta_confidence_high;
            stops.push(RouteStop {
                stop_id: stop.order_id.clone(),
                kind: StopKind::Delivery,
                location: stop.location,
                eta: clock,
                eta_confidence_low: Some(variability.uniform(low.low, low.high)),
                eta_confidence_high: Some(variability.uniform(high.low, high.high)),
                service_minutes: stop.service_minutes,
                load_volume: stop.volume,
                spatial_cell: self.cell_for(stop.location, resolution),
                due_by: Some(stop.window_end.on(request.service_date)?),
            });
            clock = add_minutes(clock, stop.service_minutes)?;
            position = stop.location;
        }

        let return_km = self.distance_km(position, depot.location);
        let return_minutes = return_km * self.config.return_minutes_per_km;
        clock = add_minutes(clock, return_minutes)?;
        distance_km += return_km;
        drive_minutes += return_minutes;
        stops.push(self.bookend(
            format!("depot_end_{}", truck.id),
            depot.location,
            clock,
            resolution,
        ));

        Ok(Route {
            truck_id: truck.id.clone(),
            stops,
            total_distance_km: distance_km,
            total_drive_minutes: drive_minutes,
            utilization: utilization(load, truck.capacity_volume),
        })
    }

    fn bookend(&self, stop_id: String, location: Location, eta: Timestamp, resolution: u8) -> RouteStop {
        RouteStop {
            stop_id,
            kind: StopKind::Depot,
            location,
            eta,
            eta_confidence_low: None,
            eta_confidence_high: None,
            service_minutes: 0.0,
            load_volume: 0.0,
            spatial_cell: self.cell_for(location, resolution),
            due_by: None,
        }
    }

    fn cell_for(&self, location: Location, resolution: u8) -> Option<CellId> {
        match self.cells.cell_for(location, resolution) {
            Ok(cell) => Some(cell),
            Err(err) => {
                log::warn!("could not index ({}, {}): {err}", location.lat, location.lon);
                None
            }
        }
    }

    fn distance_km(&self, from: Location, to: Location) -> f64 {
        scaled_distance_km(from, to, self.config.road_factor)
    }
}

fn utilization(load: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        (load / capacity).min(1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanParams;
    use haulplan_core::test_support::FixedVariability;
    use haulplan_core::{CellIndexError, SyntheticCellIndexer};
    use jiff::civil::date;
    use rstest::{fixture, rstest};

    fn loc(lat: f64, lon: f64) -> Location {
        Location { lat, lon }
    }

    fn depot() -> Depot {
        Depot {
            id: "north".into(),
            location: loc(43.76, -79.41),
        }
    }

    fn truck(id: &str, capacity: f64) -> Truck {
        Truck {
            id: id.into(),
            depot_id: "north".into(),
            capacity_volume: capacity,
        }
    }

    #[fixture]
    fn request() -> PlanRequest {
        PlanRequest {
            service_date: date(2024, 3, 1),
            depots: vec![depot()],
            trucks: vec![truck("T1", 100.0)],
            stops: vec![
                Stop::new("FAR", "FRAN_002", loc(43.65, -79.38), 60.0),
                Stop::new("NEAR", "FRAN_001", loc(43.70, -79.40), 60.0),
            ],
            params: PlanParams::default(),
        }
    }

    fn build(request: &PlanRequest) -> Vec<Route> {
        let config = RoutingConfig::default();
        let builder = RouteBuilder::new(&config, &SyntheticCellIndexer);
        builder
            .build(request, &mut FixedVariability::lowest())
            .expect("request should build")
    }

    fn ids(route: &Route) -> Vec<&str> {
        route.stops.iter().map(|stop| stop.stop_id.as_str()).collect()
    }

    #[rstest]
    fn capacity_stops_extension_at_first_misfit(request: PlanRequest) {
        let routes = build(&request);
        assert_eq!(routes.len(), 1);
        assert_eq!(ids(&routes[0]), ["depot_start_T1", "NEAR", "depot_end_T1"]);
        assert_eq!(routes[0].utilization, 0.6);
    }

    #[rstest]
    fn second_truck_at_depot_takes_remaining_stops(mut request: PlanRequest) {
        request.trucks.push(truck("T2", 100.0));
        let routes = build(&request);
        assert_eq!(ids(&routes[1]), ["depot_start_T2", "FAR", "depot_end_T2"]);
    }

    #[rstest]
    fn truck_without_remaining_stops_gets_no_route(mut request: PlanRequest) {
        request.trucks[0].capacity_volume = 500.0;
        request.trucks.push(truck("T2", 100.0));
        let routes = build(&request);
        assert_eq!(routes.len(), 1);
        assert_eq!(ids(&routes[0]), ["depot_start_T1", "NEAR", "FAR", "depot_end_T1"]);
    }

    #[rstest]
    fn undersized_truck_gets_bookends_only(mut request: PlanRequest) {
        request.trucks[0].capacity_volume = 10.0;
        let routes = build(&request);
        assert_eq!(ids(&routes[0]), ["depot_start_T1", "depot_end_T1"]);
        assert_eq!(routes[0].total_distance_km, 0.0);
        assert_eq!(routes[0].utilization, 0.0);
    }

    #[rstest]
    fn zero_capacity_has_zero_utilization(mut request: PlanRequest) {
        request.trucks[0].capacity_volume = 0.0;
        request.stops[1].volume = 0.0;
        let routes = build(&request);
        assert_eq!(routes[0].utilization, 0.0);
        assert_eq!(routes[0].delivery_count(), 1);
    }

    #[rstest]
    fn ties_go_to_the_first_listed_stop(mut request: PlanRequest) {
        let shared = loc(43.70, -79.40);
        request.stops = vec![
            Stop::new("FIRST", "FRAN_001", shared, 10.0),
            Stop::new("SECOND", "FRAN_002", shared, 10.0),
        ];
        let routes = build(&request);
        assert_eq!(
            ids(&routes[0]),
            ["depot_start_T1", "FIRST", "SECOND", "depot_end_T1"]
        );
    }

    #[rstest]
    fn stops_go_to_their_nearest_depot(mut request: PlanRequest) {
        request.depots.push(Depot {
            id: "south".into(),
            location: loc(43.64, -79.38),
        });
        request.trucks.push(Truck {
            id: "S1".into(),
            depot_id: "south".into(),
            capacity_volume: 100.0,
        });
        let routes = build(&request);
        assert_eq!(ids(&routes[0]), ["depot_start_T1", "NEAR", "depot_end_T1"]);
        assert_eq!(ids(&routes[1]), ["depot_start_S1", "FAR", "depot_end_S1"]);
    }

    #[rstest]
    fn timing_follows_speed_band_and_service(request: PlanRequest) {
        let routes = build(&request);
        let route = &routes[0];
        let departure = request
            .params
            .window_start
            .on(request.service_date)
            .expect("departure");
        let leg_km = scaled_distance_km(depot().location, loc(43.70, -79.40), 1.3);
        let expected_eta = add_minutes(departure, leg_km * 1.2).expect("eta");

        assert_eq!(route.stops[0].eta, departure);
        assert_eq!(route.stops[1].eta, expected_eta);
        assert_eq!(route.stops[1].eta_confidence_low, Some(5.0));
        assert_eq!(route.stops[1].eta_confidence_high, Some(15.0));
        assert!((route.total_distance_km - 2.0 * leg_km).abs() < 1e-9);
        assert!((route.total_drive_minutes - leg_km * (1.2 + 1.5)).abs() < 1e-9);
        assert!(route.stops[2].eta > route.stops[1].eta);
    }

    #[rstest]
    fn deliveries_carry_their_due_time(request: PlanRequest) {
        let routes = build(&request);
        let due = request.stops[1]
            .window_end
            .on(request.service_date)
            .expect("due");
        assert_eq!(routes[0].stops[1].due_by, Some(due));
        assert_eq!(routes[0].stops[0].due_by, None);
    }

    #[rstest]
    fn every_visit_is_indexed(request: PlanRequest) {
        let routes = build(&request);
        assert!(routes[0].stops.iter().all(|stop| stop.spatial_cell.is_some()));
    }

    struct BrokenIndexer;

    impl CellIndexer for BrokenIndexer {
        fn cell_for(&self, _: Location, _: u8) -> Result<CellId, CellIndexError> {
            Err(CellIndexError::Coordinate {
                message: "offline".into(),
            })
        }
    }

    #[rstest]
    fn indexing_failures_leave_cells_empty(request: PlanRequest) {
        let config = RoutingConfig::default();
        let builder = RouteBuilder::new(&config, &BrokenIndexer);
        let routes = builder
            .build(&request, &mut FixedVariability::lowest())
            .expect("request should build");
        assert!(routes[0].stops.iter().all(|stop| stop.spatial_cell.is_none()));
    }

    #[rstest]
    fn invalid_request_is_rejected(mut request: PlanRequest) {
        request.trucks[0].depot_id = "nowhere".into();
        let config = RoutingConfig::default();
        let builder = RouteBuilder::new(&config, &SyntheticCellIndexer);
        let result = builder.build(&request, &mut FixedVariability::lowest());
        assert!(matches!(result, Err(RoutingError::InvalidPlanRequest(_))));
    }
}
