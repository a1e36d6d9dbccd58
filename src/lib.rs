//! Facade crate for the haulplan routing and inventory engines.
//!
//! This crate re-exports the shared domain types, the routing and inventory
//! engines, and exposes the OSRM geometry provider and SQLite stock sink
//! behind feature flags.

#![forbid(unsafe_code)]

pub use haulplan_core::{
    Clock, ClockTime, Depot, GeometryError, GeometrySelector, Kpis, Location, LocationError,
    OverlapIncident, PickPackOutput, PickTask, Route, RouteGeometryProvider, RouteStop,
    SeededVariability, Stop, StopKind, SystemClock, Truck, Variability,
};

pub use haulplan_core::{CellId, CellIndexError, CellIndexer, SyntheticCellIndexer};

#[cfg(feature = "h3")]
pub use haulplan_core::H3CellIndexer;

pub use haulplan_routing::{
    Plan, PlanParams, PlanRequest, RerouteOutcome, RerouteReason, RerouteRequest, RerouteScope,
    RoutingConfig, RoutingEngine, RoutingError,
};

pub use haulplan_inventory::{
    ConsumptionFeed, EventOutcome, FeasibilityLine, FeasibilityOutcome, FeedHandle,
    InventoryConfig, InventoryEngine, InventoryError, InventoryMetrics, ReleaseOutcome,
    ReleaseRequest, Reservation, ReservationLine, ReservationStatus, ReserveOutcome,
    ReserveRequest, SeedStock, Snapshot, SnapshotFilter, StockEvent, StockEventKind, StockKey,
    StockSink,
};

#[cfg(feature = "osrm")]
pub use haulplan_data::routing::{OsrmGeometryConfig, OsrmGeometryProvider, ProviderBuildError};

#[cfg(feature = "store-sqlite")]
pub use haulplan_data::store::{SqliteStockSink, SqliteStockSinkError};

#[cfg(feature = "test-support")]
pub use haulplan_core::test_support;
