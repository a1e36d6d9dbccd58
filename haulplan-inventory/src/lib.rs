//! Stock ledger, reservations and stock events for warehouses and
//! franchisees.
//!
//! [`InventoryEngine`] owns a ledger keyed by location and item, a table of
//! time-limited reservations grouped by plan id, and the log of accepted
//! stock events. Every operation takes the engine's single lock for its
//! whole duration and first purges expired reservations, so callers always
//! see net availability that excludes lapsed holds.
//!
//! Accepted ledger changes are forwarded to a [`StockSink`] after the lock
//! is released. Sink failures are logged and never undo the in-memory
//! change.
//!
//! # Example
//!
//! ```
//! use haulplan_inventory::{
//!     InventoryEngine, ReservationLine, ReservationStatus, ReserveRequest, SeedStock,
//! };
//!
//! let engine = InventoryEngine::new().with_seed(&SeedStock::demo());
//! let outcome = engine.reserve(&ReserveRequest {
//!     plan_id: "plan-1".into(),
//!     lines: vec![ReservationLine {
//!         warehouse_id: "WH_NORTH".into(),
//!         order_id: "ORD-1".into(),
//!         item_id: "BREAD_WHITE".into(),
//!         qty: 5.0,
//!         non_substitutable: false,
//!     }],
//!     ttl_minutes: None,
//! })?;
//! assert_eq!(outcome.status, ReservationStatus::Ok);
//! # Ok::<(), haulplan_inventory::InventoryError>(())
//! ```

mod config;
mod engine;
mod error;
mod event;
mod feasibility;
mod feed;
mod ledger;
mod reservation;
mod seed;
mod sink;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::InventoryConfig;
pub use engine::{InventoryEngine, InventoryMetrics, Snapshot, SnapshotFilter};
pub use error::InventoryError;
pub use event::{EventOutcome, EventRejection, RejectedEvent, StockEvent, StockEventKind};
pub use feasibility::{FeasibilityLine, FeasibilityOutcome, InsufficientFeasibility};
pub use feed::{ConsumptionFeed, FeedHandle};
pub use ledger::{LocationKind, StockKey, StockRecord};
pub use reservation::{
    InsufficientStock, ReleaseOutcome, ReleaseRequest, Reservation, ReservationLine,
    ReservationStatus, ReserveOutcome, ReserveRequest,
};
pub use seed::SeedStock;
pub use sink::{NullStockSink, StockSink, StockSinkError};
