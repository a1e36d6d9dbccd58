//! Planning inputs: delivery stops, depots and trucks.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ClockTime, Location};

/// Default on-site service time in minutes.
pub const DEFAULT_SERVICE_MINUTES: f64 = 15.0;

/// An order to deliver to a franchisee.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stop {
    /// Order identifier; becomes the route stop id.
    pub order_id: String,
    /// Receiving franchisee.
    pub franchisee_id: String,
    /// Delivery location.
    pub location: Location,
    /// Load volume, non-negative.
    pub volume: f64,
    /// Minutes spent on site, non-negative.
    #[cfg_attr(feature = "serde", serde(default = "default_service_minutes"))]
    pub service_minutes: f64,
    /// Earliest delivery time.
    #[cfg_attr(feature = "serde", serde(default = "default_window_start"))]
    pub window_start: ClockTime,
    /// Latest delivery time.
    #[cfg_attr(feature = "serde", serde(default = "default_window_end"))]
    pub window_end: ClockTime,
    /// The order contains an item that cannot be substituted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_non_substitutable_item: bool,
}

impl Stop {
    /// Stop with default service time and window.
    #[must_use]
    pub fn new(
        order_id: impl Into<String>,
        franchisee_id: impl Into<String>,
        location: Location,
        volume: f64,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            franchisee_id: franchisee_id.into(),
            location,
            volume,
            service_minutes: DEFAULT_SERVICE_MINUTES,
            window_start: ClockTime::DEFAULT_WINDOW_START,
            window_end: ClockTime::DEFAULT_WINDOW_END,
            has_non_substitutable_item: false,
        }
    }
}

#[cfg(feature = "serde")]
fn default_service_minutes() -> f64 {
    DEFAULT_SERVICE_MINUTES
}

#[cfg(feature = "serde")]
fn default_window_start() -> ClockTime {
    ClockTime::DEFAULT_WINDOW_START
}

#[cfg(feature = "serde")]
fn default_window_end() -> ClockTime {
    ClockTime::DEFAULT_WINDOW_END
}

/// Origin and return point for trucks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Depot {
    /// Depot identifier referenced by [`Truck::depot_id`].
    pub id: String,
    /// Depot location.
    pub location: Location,
}

/// A delivery vehicle based at a depot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Truck {
    /// Truck identifier.
    pub id: String,
    /// Home depot; must name an existing [`Depot`].
    pub depot_id: String,
    /// Volume capacity, non-negative.
    pub capacity_volume: f64,
}
