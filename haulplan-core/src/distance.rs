//! Road distance estimation.
//!
//! Distances are great-circle (haversine) lengths scaled by a fixed urban
//! road factor. No road network is consulted.

use geo::{Distance, Haversine};

use crate::Location;

/// Multiplier converting straight-line distance into an urban road estimate.
pub const ROAD_FACTOR: f64 = 1.3;

/// Kilometres to statute miles.
pub const KM_TO_MILES: f64 = 0.621_371;

/// Great-circle distance between two locations in kilometres.
#[must_use]
pub fn haversine_km(from: Location, to: Location) -> f64 {
    Haversine.distance(from.to_point(), to.to_point()) / 1000.0
}

/// Estimated road distance in kilometres using [`ROAD_FACTOR`].
///
/// # Examples
///
/// ```
/// use haulplan_core::{Location, haversine_km, road_distance_km};
///
/// let a = Location { lat: 43.65, lon: -79.38 };
/// let b = Location { lat: 43.76, lon: -79.41 };
/// let road = road_distance_km(a, b);
/// assert!((road - haversine_km(a, b) * 1.3).abs() < 1e-9);
/// ```
#[must_use]
pub fn road_distance_km(from: Location, to: Location) -> f64 {
    scaled_distance_km(from, to, ROAD_FACTOR)
}

/// Great-circle distance in kilometres scaled by `road_factor`.
#[must_use]
pub fn scaled_distance_km(from: Location, to: Location, road_factor: f64) -> f64 {
    haversine_km(from, to) * road_factor
}
