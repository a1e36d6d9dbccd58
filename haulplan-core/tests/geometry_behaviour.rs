//! Behavioural coverage for availability-based geometry selection.

use std::cell::RefCell;

use haulplan_core::{GeometryError, GeometrySelector, Location, RouteGeometryProvider};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Geometry service double with a fixed answer.
struct ScriptedService {
    available: bool,
    answer: Result<Vec<Location>, GeometryError>,
}

impl RouteGeometryProvider for ScriptedService {
    fn is_available(&self) -> bool {
        self.available
    }

    fn route_geometry(&self, _waypoints: &[Location]) -> Result<Vec<Location>, GeometryError> {
        self.answer.clone()
    }
}

fn road_polyline() -> Vec<Location> {
    vec![
        Location { lat: 43.761, lon: -79.411 },
        Location { lat: 43.730, lon: -79.405 },
        Location { lat: 43.700, lon: -79.400 },
        Location { lat: 43.761, lon: -79.411 },
    ]
}

fn route_stops() -> Vec<Location> {
    vec![
        Location { lat: 43.761, lon: -79.411 },
        Location { lat: 43.700, lon: -79.400 },
        Location { lat: 43.761, lon: -79.411 },
    ]
}

#[fixture]
fn selector() -> RefCell<Option<GeometrySelector>> {
    RefCell::new(None)
}

#[fixture]
fn line() -> RefCell<Vec<Location>> {
    RefCell::new(Vec::new())
}

#[given("a geometry service that returns a road polyline")]
fn service_ok(#[from(selector)] selector: &RefCell<Option<GeometrySelector>>) {
    *selector.borrow_mut() = Some(GeometrySelector::with_primary(ScriptedService {
        available: true,
        answer: Ok(road_polyline()),
    }));
}

#[given("a geometry service that reports itself unavailable")]
fn service_down(#[from(selector)] selector: &RefCell<Option<GeometrySelector>>) {
    *selector.borrow_mut() = Some(GeometrySelector::with_primary(ScriptedService {
        available: false,
        answer: Ok(road_polyline()),
    }));
}

#[given("a geometry service that fails with a timeout")]
fn service_times_out(#[from(selector)] selector: &RefCell<Option<GeometrySelector>>) {
    *selector.borrow_mut() = Some(GeometrySelector::with_primary(ScriptedService {
        available: true,
        answer: Err(GeometryError::Timeout {
            url: "http://osrm.invalid/route/v1/driving".to_owned(),
            timeout_secs: 2,
        }),
    }));
}

#[when("I request the geometry for a three stop route")]
fn request_geometry(
    #[from(selector)] selector: &RefCell<Option<GeometrySelector>>,
    #[from(line)] line: &RefCell<Vec<Location>>,
) {
    let guard = selector.borrow();
    let selector = guard.as_ref().expect("selector must be initialised");
    *line.borrow_mut() = selector.geometry_for(&route_stops());
}

#[then("the road polyline is used")]
fn road_used(#[from(line)] line: &RefCell<Vec<Location>>) {
    assert_eq!(*line.borrow(), road_polyline());
}

#[then("the straight line through the stops is used")]
fn straight_used(#[from(line)] line: &RefCell<Vec<Location>>) {
    assert_eq!(*line.borrow(), route_stops());
}

#[scenario(path = "tests/features/route_geometry.feature", index = 0)]
fn reachable_service_supplies_geometry(
    selector: RefCell<Option<GeometrySelector>>,
    line: RefCell<Vec<Location>>,
) {
    let _ = (selector, line);
}

#[scenario(path = "tests/features/route_geometry.feature", index = 1)]
fn unavailable_service_is_skipped(
    selector: RefCell<Option<GeometrySelector>>,
    line: RefCell<Vec<Location>>,
) {
    let _ = (selector, line);
}

#[scenario(path = "tests/features/route_geometry.feature", index = 2)]
fn failing_service_falls_back(
    selector: RefCell<Option<GeometrySelector>>,
    line: RefCell<Vec<Location>>,
) {
    let _ = (selector, line);
}
