//! Route geometry lookup.
//!
//! A [`RouteGeometryProvider`] turns the ordered stop locations of a route
//! into a drawable polyline. Road-network providers live outside this crate;
//! [`StraightLineGeometry`] is the deterministic local substitute, and
//! [`GeometrySelector`] chooses between them by availability.

mod selector;

use thiserror::Error;

use crate::Location;

pub use selector::{GeometrySelector, StraightLineGeometry};

/// Errors from [`RouteGeometryProvider::route_geometry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// No waypoints were supplied.
    #[error("at least one waypoint is required")]
    EmptyInput,
    /// A network-level failure prevented the request from completing.
    #[error("network error requesting {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport detail.
        message: String,
    },
    /// The request exceeded its timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response detail.
        message: String,
    },
    /// The service reported a routing failure in its response body.
    #[error("routing service error {code}: {message}")]
    Service {
        /// Service status code.
        code: String,
        /// Service message.
        message: String,
    },
    /// The response could not be decoded.
    #[error("failed to parse geometry response: {message}")]
    Parse {
        /// Decoder detail.
        message: String,
    },
    /// The provider is known to be unavailable.
    #[error("geometry provider is unavailable")]
    Unavailable,
}

/// Fetch a polyline following the given waypoints.
///
/// # Examples
///
/// ```
/// use haulplan_core::{GeometryError, Location, RouteGeometryProvider, StraightLineGeometry};
///
/// let waypoints = [
///     Location { lat: 43.76, lon: -79.41 },
///     Location { lat: 43.70, lon: -79.40 },
/// ];
/// let line = StraightLineGeometry.route_geometry(&waypoints)?;
/// assert_eq!(line, waypoints.to_vec());
/// # Ok::<(), GeometryError>(())
/// ```
pub trait RouteGeometryProvider: Send + Sync {
    /// Report whether the provider is currently worth calling.
    ///
    /// Selectors skip providers reporting `false` instead of waiting for a
    /// call to fail.
    fn is_available(&self) -> bool {
        true
    }

    /// Return the polyline for `waypoints`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::EmptyInput`] for an empty slice and other
    /// variants for provider failures.
    fn route_geometry(&self, waypoints: &[Location]) -> Result<Vec<Location>, GeometryError>;
}
