//! Route planning and re-routing for delivery fleets.
//!
//! The [`RoutingEngine`] turns a [`PlanRequest`] into a [`Plan`]: stops are
//! assigned to their nearest depot, each truck's route is grown by greedy
//! nearest-neighbour selection under its volume capacity, spatio-temporal
//! overlaps between trucks are detected, pick/pack instructions are derived
//! and KPIs computed. Plans are cached by id so that a later
//! [`RerouteRequest`] can perturb a bounded share of their stops.
//!
//! # Example
//!
//! ```
//! use haulplan_core::{Depot, Location, Stop, Truck};
//! use haulplan_routing::{PlanParams, PlanRequest, RoutingEngine};
//! use jiff::civil::date;
//!
//! let depot = Location { lat: 43.761_539, lon: -79.411_079 };
//! let request = PlanRequest {
//!     service_date: date(2024, 3, 1),
//!     depots: vec![Depot { id: "north".into(), location: depot }],
//!     trucks: vec![Truck { id: "T1".into(), depot_id: "north".into(), capacity_volume: 100.0 }],
//!     stops: vec![Stop::new("ORD-1", "FRAN_001", Location { lat: 43.70, lon: -79.40 }, 20.0)],
//!     params: PlanParams::default(),
//! };
//!
//! let engine = RoutingEngine::seeded(7);
//! let plan = engine.plan(&request)?;
//! assert_eq!(plan.routes.len(), 1);
//! assert_eq!(plan.pickpack[0].loading_order, vec!["ORD-1".to_owned()]);
//! # Ok::<(), haulplan_routing::RoutingError>(())
//! ```

mod builder;
mod config;
mod engine;
mod error;
mod kpi;
mod overlap;
mod pickpack;
mod request;
mod reroute;

pub use builder::RouteBuilder;
pub use config::{Band, RoutingConfig};
pub use engine::{Plan, RerouteOutcome, RoutingEngine};
pub use error::RoutingError;
pub use kpi::{compute_kpis, is_on_time};
pub use overlap::detect_overlaps;
pub use pickpack::{MAX_PICK_TASKS_PER_STOP, sequence_pick_pack};
pub use request::{PlanParams, PlanRequest, PlanRequestValidationError};
pub use reroute::{RerouteReason, RerouteRequest, RerouteScope, RerouteValidationError};
