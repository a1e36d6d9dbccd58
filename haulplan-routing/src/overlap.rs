//! Spatio-temporal conflict detection between trucks.

use std::collections::BTreeMap;

use haulplan_core::schedule::{add_minutes, minutes_between};
use haulplan_core::{CellId, OverlapIncident, Route, ScheduleError, StopKind};
use jiff::Timestamp;

struct Visit<'a> {
    truck_id: &'a str,
    arrival: Timestamp,
    departure: Timestamp,
}

struct Group<'a> {
    start: Timestamp,
    end: Timestamp,
    trucks: Vec<&'a str>,
}

impl<'a> Group<'a> {
    fn open(visit: &Visit<'a>) -> Self {
        Self {
            start: visit.arrival,
            end: visit.departure,
            trucks: vec![visit.truck_id],
        }
    }

    fn absorb(&mut self, visit: &Visit<'a>) {
        self.end = self.end.max(visit.departure);
        if !self.trucks.contains(&visit.truck_id) {
            self.trucks.push(visit.truck_id);
        }
    }

    fn into_incident(self, cell: &CellId) -> Option<OverlapIncident> {
        (self.trucks.len() >= 2).then(|| OverlapIncident {
            spatial_cell: cell.clone(),
            start_ts: self.start,
            end_ts: self.end,
            truck_ids: self.trucks.into_iter().map(str::to_owned).collect(),
        })
    }
}

/// Find cells visited by two or more trucks within `window_minutes`.
///
/// Non-depot visits are grouped by spatial cell and swept in arrival
/// order. A visit joins the current group when it arrives no later than
/// `window_minutes` after the group's end, where the end is the latest
/// `arrival + service` seen so far. Groups with a single truck are dropped,
/// so a truck is never reported against itself. Visits without a cell are
/// ignored.
///
/// # Errors
///
/// Returns [`ScheduleError`] when a service end cannot be represented.
pub fn detect_overlaps(
    routes: &[Route],
    window_minutes: f64,
) -> Result<Vec<OverlapIncident>, ScheduleError> {
    let mut by_cell: BTreeMap<&CellId, Vec<Visit<'_>>> = BTreeMap::new();
    for route in routes {
        for stop in route.stops.iter().filter(|stop| stop.kind != StopKind::Depot) {
            let Some(cell) = stop.spatial_cell.as_ref() else {
                continue;
            };
            by_cell.entry(cell).or_default().push(Visit {
                truck_id: &route.truck_id,
                arrival: stop.eta,
                departure: add_minutes(stop.eta, stop.service_minutes)?,
            });
        }
    }

    let mut incidents = Vec::new();
    for (cell, mut visits) in by_cell {
        visits.sort_by_key(|visit| visit.arrival);
        let mut current: Option<Group<'_>> = None;
        for visit in &visits {
            match current.as_mut() {
                Some(group) if minutes_between(group.end, visit.arrival) <= window_minutes => {
                    group.absorb(visit);
                }
                _ => {
                    if let Some(closed) = current.replace(Group::open(visit)) {
                        incidents.extend(closed.into_incident(cell));
                    }
                }
            }
        }
        if let Some(closed) = current {
            incidents.extend(closed.into_incident(cell));
        }
    }
    Ok(incidents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulplan_core::{Location, RouteStop};
    use rstest::rstest;

    fn at(minute: i64) -> Timestamp {
        Timestamp::from_second(1_709_265_600 + minute * 60).expect("valid timestamp")
    }

    fn visit(cell: &str, minute: i64, kind: StopKind) -> RouteStop {
        RouteStop {
            stop_id: format!("{cell}-{minute}"),
            kind,
            location: Location { lat: 43.7, lon: -79.4 },
            eta: at(minute),
            eta_confidence_low: None,
            eta_confidence_high: None,
            service_minutes: 15.0,
            load_volume: 1.0,
            spatial_cell: Some(CellId::new(cell)),
            due_by: None,
        }
    }

    fn route(truck_id: &str, stops: Vec<RouteStop>) -> Route {
        Route {
            truck_id: truck_id.into(),
            stops,
            total_distance_km: 0.0,
            total_drive_minutes: 0.0,
            utilization: 0.0,
        }
    }

    #[rstest]
    fn reports_two_trucks_in_same_cell() {
        let routes = [
            route("T1", vec![visit("c1", 0, StopKind::Delivery)]),
            route("T2", vec![visit("c1", 40, StopKind::Delivery)]),
        ];
        let incidents = detect_overlaps(&routes, 30.0).expect("detect");
        assert_eq!(incidents.len(), 1);
        let incident = &incidents[0];
        assert_eq!(incident.spatial_cell, CellId::new("c1"));
        assert_eq!(incident.start_ts, at(0));
        assert_eq!(incident.end_ts, at(55));
        assert_eq!(incident.truck_ids, ["T1", "T2"]);
    }

    #[rstest]
    #[case(46, 0)]
    #[case(45, 1)]
    fn window_bounds_merging(#[case] second_arrival: i64, #[case] expected: usize) {
        let routes = [
            route("T1", vec![visit("c1", 0, StopKind::Delivery)]),
            route("T2", vec![visit("c1", second_arrival, StopKind::Delivery)]),
        ];
        let incidents = detect_overlaps(&routes, 30.0).expect("detect");
        assert_eq!(incidents.len(), expected);
    }

    #[rstest]
    fn same_truck_never_overlaps_itself() {
        let routes = [route(
            "T1",
            vec![
                visit("c1", 0, StopKind::Delivery),
                visit("c1", 10, StopKind::Delivery),
            ],
        )];
        assert!(detect_overlaps(&routes, 30.0).expect("detect").is_empty());
    }

    #[rstest]
    fn depot_visits_are_ignored() {
        let routes = [
            route("T1", vec![visit("depot", 0, StopKind::Depot)]),
            route("T2", vec![visit("depot", 0, StopKind::Depot)]),
        ];
        assert!(detect_overlaps(&routes, 30.0).expect("detect").is_empty());
    }

    #[rstest]
    fn repeated_truck_is_listed_once() {
        let routes = [
            route(
                "T1",
                vec![
                    visit("c1", 0, StopKind::Delivery),
                    visit("c1", 20, StopKind::Delivery),
                ],
            ),
            route("T2", vec![visit("c1", 10, StopKind::Delivery)]),
        ];
        let incidents = detect_overlaps(&routes, 30.0).expect("detect");
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].truck_ids, ["T1", "T2"]);
        assert_eq!(incidents[0].end_ts, at(35));
    }

    #[rstest]
    fn different_cells_do_not_merge() {
        let routes = [
            route("T1", vec![visit("c1", 0, StopKind::Delivery)]),
            route("T2", vec![visit("c2", 0, StopKind::Delivery)]),
        ];
        assert!(detect_overlaps(&routes, 30.0).expect("detect").is_empty());
    }
}
