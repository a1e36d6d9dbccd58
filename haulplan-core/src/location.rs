//! Geographic coordinates.

use geo::Point;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A WGS84 coordinate pair.
///
/// # Examples
///
/// ```
/// use haulplan_core::Location;
///
/// # fn main() -> Result<(), haulplan_core::LocationError> {
/// let toronto = Location::new(43.65, -79.38)?;
/// assert_eq!(toronto.lat, 43.65);
/// assert!(Location::new(91.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawLocation"))]
pub struct Location {
    /// Latitude in degrees, within `[-90, 90]`.
    pub lat: f64,
    /// Longitude in degrees, within `[-180, 180]`.
    pub lon: f64,
}

/// Errors returned by [`Location::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LocationError {
    /// Latitude was not a finite value in `[-90, 90]`.
    #[error("latitude {lat} is outside [-90, 90]")]
    Latitude {
        /// Rejected latitude.
        lat: f64,
    },
    /// Longitude was not a finite value in `[-180, 180]`.
    #[error("longitude {lon} is outside [-180, 180]")]
    Longitude {
        /// Rejected longitude.
        lon: f64,
    },
}

impl Location {
    /// Validates and constructs a [`Location`].
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] when either coordinate is out of range or
    /// not finite.
    pub fn new(lat: f64, lon: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(LocationError::Latitude { lat });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(LocationError::Longitude { lon });
        }
        Ok(Self { lat, lon })
    }

    /// Return the location as a `geo` point (`x` = longitude).
    #[must_use]
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawLocation {
    lat: f64,
    lon: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawLocation> for Location {
    type Error = LocationError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lon)
    }
}
