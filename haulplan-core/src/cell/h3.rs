//! Cells on the H3 hexagonal grid.

use h3o::{LatLng, Resolution};

use super::{CellId, CellIndexError, CellIndexer};
use crate::Location;

/// Cell indexer backed by the H3 grid.
///
/// Identifiers are the canonical lower-case hexadecimal form of the H3
/// index, such as `882b9bc1c3fffff` at resolution 8.
///
/// # Examples
///
/// ```
/// use haulplan_core::{CellIndexer, H3CellIndexer, Location};
///
/// let cell = H3CellIndexer.cell_for(Location { lat: 43.65, lon: -79.38 }, 8)?;
/// assert!(cell.as_str().starts_with("88"));
/// # Ok::<(), haulplan_core::CellIndexError>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct H3CellIndexer;

impl CellIndexer for H3CellIndexer {
    fn cell_for(&self, location: Location, resolution: u8) -> Result<CellId, CellIndexError> {
        let grid_resolution = Resolution::try_from(resolution)
            .map_err(|_| CellIndexError::ResolutionOutOfRange { resolution })?;
        let coordinate =
            LatLng::new(location.lat, location.lon).map_err(|err| CellIndexError::Coordinate {
                message: err.to_string(),
            })?;
        Ok(CellId::new(coordinate.to_cell(grid_resolution).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h3o::CellIndex;
    use rstest::rstest;
    use std::str::FromStr;

    fn loc(lat: f64, lon: f64) -> Location {
        Location { lat, lon }
    }

    #[rstest]
    #[case(4)]
    #[case(8)]
    #[case(15)]
    fn identifiers_are_valid_cells_at_the_requested_resolution(#[case] resolution: u8) {
        let cell = H3CellIndexer
            .cell_for(loc(43.6532, -79.3832), resolution)
            .expect("cell");
        let index = CellIndex::from_str(cell.as_str()).expect("canonical H3 index");
        assert_eq!(u8::from(index.resolution()), resolution);
    }

    #[rstest]
    fn nearby_points_share_a_cell() {
        let a = H3CellIndexer.cell_for(loc(43.65000, -79.38000), 8);
        let b = H3CellIndexer.cell_for(loc(43.65001, -79.38001), 8);
        assert_eq!(a, b);
    }

    #[rstest]
    fn distant_points_use_different_cells() {
        let a = H3CellIndexer.cell_for(loc(43.76, -79.41), 8).expect("cell");
        let b = H3CellIndexer.cell_for(loc(43.65, -79.18), 8).expect("cell");
        assert_ne!(a, b);
    }

    #[rstest]
    fn rejects_unsupported_resolution() {
        let err = H3CellIndexer
            .cell_for(loc(0.0, 0.0), 16)
            .expect_err("resolution 16 is unsupported");
        assert_eq!(err, CellIndexError::ResolutionOutOfRange { resolution: 16 });
    }

    #[rstest]
    fn rejects_non_finite_coordinates() {
        let err = H3CellIndexer
            .cell_for(loc(f64::NAN, 0.0), 8)
            .expect_err("NaN cannot be indexed");
        assert!(matches!(err, CellIndexError::Coordinate { .. }));
    }
}
