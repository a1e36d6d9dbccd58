//! Deterministic square-lattice stand-in for a hexagonal grid.

use super::{CellId, CellIndexError, CellIndexer, MAX_RESOLUTION};
use crate::Location;

/// Average hexagon edge length at resolution 0, in kilometres.
const BASE_EDGE_KM: f64 = 1_107.712_591;

/// Kilometres spanned by one degree of latitude.
const KM_PER_DEGREE: f64 = 111.32;

/// Cell indexer that needs no external grid library.
///
/// Each resolution divides the lattice step by `sqrt(7)`, matching the
/// aperture of the hexagonal grid it stands in for. A cell is roughly two
/// hexagon edges across. Identifiers look like `syn08:5266:-9577`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticCellIndexer;

impl SyntheticCellIndexer {
    /// Lattice step in degrees at `resolution`.
    fn step_degrees(resolution: u8) -> f64 {
        let edge_km = BASE_EDGE_KM / 7.0_f64.sqrt().powi(i32::from(resolution));
        edge_km * 2.0 / KM_PER_DEGREE
    }
}

impl CellIndexer for SyntheticCellIndexer {
    fn cell_for(&self, location: Location, resolution: u8) -> Result<CellId, CellIndexError> {
        if resolution > MAX_RESOLUTION {
            return Err(CellIndexError::ResolutionOutOfRange { resolution });
        }
        if !location.lat.is_finite() || !location.lon.is_finite() {
            return Err(CellIndexError::Coordinate {
                message: format!("non-finite coordinate ({}, {})", location.lat, location.lon),
            });
        }
        let step = Self::step_degrees(resolution);
        let (lat_idx, lon_idx) = (
            (location.lat / step).floor() as i64,
            (location.lon / step).floor() as i64,
        );
        Ok(CellId::new(format!("syn{resolution:02}:{lat_idx}:{lon_idx}")))
    }
}
