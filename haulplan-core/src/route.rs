//! Built routes.

use jiff::Timestamp;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CellId, Location};

/// Role of a stop within a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StopKind {
    /// Drop-off at a franchisee.
    Delivery,
    /// Collection from a site.
    Pickup,
    /// Depot departure or return.
    Depot,
}

/// One visit in a route, in delivery order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteStop {
    /// Order id for deliveries, `depot_start_*`/`depot_end_*` for bookends.
    pub stop_id: String,
    /// Role of the visit.
    pub kind: StopKind,
    /// Visit location.
    pub location: Location,
    /// Estimated arrival.
    pub eta: Timestamp,
    /// Lower ETA confidence margin in minutes.
    pub eta_confidence_low: Option<f64>,
    /// Upper ETA confidence margin in minutes.
    pub eta_confidence_high: Option<f64>,
    /// Minutes spent on site.
    pub service_minutes: f64,
    /// Volume dropped at this visit.
    pub load_volume: f64,
    /// Spatial cell of the visit, when it could be indexed.
    pub spatial_cell: Option<CellId>,
    /// Latest on-time arrival, for deliveries.
    pub due_by: Option<Timestamp>,
}

impl RouteStop {
    /// Whether the visit is a delivery.
    #[must_use]
    pub fn is_delivery(&self) -> bool {
        self.kind == StopKind::Delivery
    }
}

/// A truck's ordered visits with aggregate figures.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    /// Truck driving the route.
    pub truck_id: String,
    /// Visits in order, bookended by the depot.
    pub stops: Vec<RouteStop>,
    /// Total road distance in kilometres, including the return leg.
    pub total_distance_km: f64,
    /// Total driving time in minutes, including the return leg.
    pub total_drive_minutes: f64,
    /// Delivered volume over truck capacity, in `[0, 1]`.
    pub utilization: f64,
}

impl Route {
    /// Delivery visits in order.
    pub fn deliveries(&self) -> impl Iterator<Item = &RouteStop> {
        self.stops.iter().filter(|stop| stop.is_delivery())
    }

    /// Number of delivery visits.
    #[must_use]
    pub fn delivery_count(&self) -> usize {
        self.deliveries().count()
    }

    /// Sum of delivered volume.
    #[must_use]
    pub fn delivered_volume(&self) -> f64 {
        self.deliveries().map(|stop| stop.load_volume).sum()
    }
}
