//! Spatial cell indexing.
//!
//! A [`CellIndexer`] maps a coordinate to a coarse grid cell so that nearby
//! stops can be grouped for overlap analysis. Resolutions follow the
//! hexagonal grid convention: `0` is the coarsest level and `15` the finest.
//!
//! With the `h3` feature enabled, [`default_cell_indexer`] returns the H3
//! grid indexer. Builds without it fall back to the synthetic lattice.

#[cfg(feature = "h3")]
mod h3;
mod synthetic;

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Location;

#[cfg(feature = "h3")]
pub use h3::H3CellIndexer;
pub use synthetic::SyntheticCellIndexer;

/// Finest supported resolution.
pub const MAX_RESOLUTION: u8 = 15;

/// Opaque identifier of a spatial cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CellId(String);

impl CellId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from [`CellIndexer::cell_for`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellIndexError {
    /// The requested resolution is not supported by the indexer.
    #[error("cell resolution {resolution} is outside 0..={MAX_RESOLUTION}")]
    ResolutionOutOfRange {
        /// Rejected resolution.
        resolution: u8,
    },
    /// The indexer could not place the coordinate.
    #[error("cannot index coordinate: {message}")]
    Coordinate {
        /// Indexer-specific detail.
        message: String,
    },
}

/// Assign coordinates to spatial cells.
///
/// # Examples
///
/// ```
/// use haulplan_core::{CellIndexer, Location, SyntheticCellIndexer};
///
/// let indexer = SyntheticCellIndexer;
/// let a = indexer.cell_for(Location { lat: 43.6500, lon: -79.3800 }, 8)?;
/// let b = indexer.cell_for(Location { lat: 43.6501, lon: -79.3801 }, 8)?;
/// assert_eq!(a, b);
/// # Ok::<(), haulplan_core::CellIndexError>(())
/// ```
pub trait CellIndexer: Send + Sync {
    /// Return the cell containing `location` at `resolution`.
    ///
    /// # Errors
    ///
    /// Returns [`CellIndexError`] when the resolution is unsupported or the
    /// coordinate cannot be indexed.
    fn cell_for(&self, location: Location, resolution: u8) -> Result<CellId, CellIndexError>;
}

/// Indexer used when none is injected.
#[must_use]
pub fn default_cell_indexer() -> Box<dyn CellIndexer> {
    #[cfg(feature = "h3")]
    {
        Box::new(H3CellIndexer)
    }
    #[cfg(not(feature = "h3"))]
    {
        Box::new(SyntheticCellIndexer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_indexer_places_coordinates() {
        let cell = default_cell_indexer()
            .cell_for(Location { lat: 43.65, lon: -79.38 }, 8)
            .expect("cell");
        #[cfg(feature = "h3")]
        assert!(cell.as_str().starts_with("88"));
        #[cfg(not(feature = "h3"))]
        assert!(cell.as_str().starts_with("syn08:"));
    }
}
