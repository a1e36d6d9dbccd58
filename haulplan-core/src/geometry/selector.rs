//! Straight-line fallback and availability-based provider selection.

use std::fmt;

use super::{GeometryError, RouteGeometryProvider};
use crate::Location;

/// Geometry that joins consecutive waypoints with straight segments.
#[derive(Debug, Default, Clone, Copy)]
pub struct StraightLineGeometry;

impl RouteGeometryProvider for StraightLineGeometry {
    fn route_geometry(&self, waypoints: &[Location]) -> Result<Vec<Location>, GeometryError> {
        if waypoints.is_empty() {
            return Err(GeometryError::EmptyInput);
        }
        Ok(waypoints.to_vec())
    }
}

/// Chooses a geometry source per route.
///
/// The primary provider is consulted only while it reports itself
/// available. A failure at call time is logged and answered with the
/// straight-line geometry, so route construction never fails because of a
/// geometry lookup.
#[derive(Default)]
pub struct GeometrySelector {
    primary: Option<Box<dyn RouteGeometryProvider>>,
}

impl fmt::Debug for GeometrySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometrySelector")
            .field("has_primary", &self.primary.is_some())
            .finish()
    }
}

impl GeometrySelector {
    /// Selector that always draws straight lines.
    #[must_use]
    pub fn straight_line() -> Self {
        Self { primary: None }
    }

    /// Selector preferring `primary` whenever it is available.
    #[must_use]
    pub fn with_primary(primary: impl RouteGeometryProvider + 'static) -> Self {
        Self {
            primary: Some(Box::new(primary)),
        }
    }

    /// Return the best available geometry for `waypoints`.
    ///
    /// An empty waypoint list yields an empty polyline.
    #[must_use]
    pub fn geometry_for(&self, waypoints: &[Location]) -> Vec<Location> {
        if waypoints.is_empty() {
            return Vec::new();
        }
        if let Some(primary) = self.primary.as_deref().filter(|p| p.is_available()) {
            match primary.route_geometry(waypoints) {
                Ok(line) if !line.is_empty() => return line,
                Ok(_) => log::warn!("geometry provider returned an empty line; using straight line"),
                Err(err) => log::warn!("geometry lookup failed, using straight line: {err}"),
            }
        }
        waypoints.to_vec()
    }
}
