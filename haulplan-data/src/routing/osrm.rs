//! OSRM API response types for the Route service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
///
/// The `code` field indicates the response status; `routes` is present on
/// success.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route found between the coordinates
    /// - `"InvalidQuery"` - Invalid query parameters
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// One candidate route.
#[derive(Debug, Deserialize)]
pub struct RouteEntry {
    /// Full-resolution path when requested with `geometries=geojson`.
    pub geometry: LineString,
}

/// GeoJSON line string.
#[derive(Debug, Deserialize)]
pub struct LineString {
    /// `[lon, lat]` pairs in travel order.
    pub coordinates: Vec<[f64; 2]>,
}
