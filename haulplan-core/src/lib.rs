//! Core domain types for the haulplan logistics engines.
//!
//! The crate holds the value types shared by the routing and inventory
//! engines together with the small capability seams they are built on:
//! distance estimation, spatial cell indexing, route geometry lookup,
//! randomness and wall-clock time. Constructors return `Result` to surface
//! invalid input early.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cell;
pub mod clock;
pub mod distance;
pub mod geometry;
mod incident;
mod kpi;
mod location;
mod pickpack;
mod route;
pub mod schedule;
mod stop;
pub mod variability;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

#[cfg(feature = "h3")]
pub use cell::H3CellIndexer;
pub use cell::{CellId, CellIndexError, CellIndexer, SyntheticCellIndexer, default_cell_indexer};
pub use clock::{Clock, SystemClock};
pub use distance::{KM_TO_MILES, ROAD_FACTOR, haversine_km, road_distance_km};
pub use geometry::{
    GeometryError, GeometrySelector, RouteGeometryProvider, StraightLineGeometry,
};
pub use incident::OverlapIncident;
pub use kpi::Kpis;
pub use location::{Location, LocationError};
pub use pickpack::{PickPackOutput, PickTask};
pub use route::{Route, RouteStop, StopKind};
pub use schedule::{ClockTime, ClockTimeError, ScheduleError};
pub use stop::{Depot, Stop, Truck};
pub use variability::{SeededVariability, Variability};
