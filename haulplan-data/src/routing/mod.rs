//! Road-following route geometry from an OSRM service.
//!
//! [`OsrmGeometryProvider`] implements
//! [`haulplan_core::RouteGeometryProvider`] over the OSRM Route API. The
//! core trait is synchronous so the routing engine stays embeddable in
//! synchronous callers; the provider blocks on its HTTP requests
//! internally.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use haulplan_core::{GeometrySelector, Location};
//! use haulplan_data::routing::{OsrmGeometryConfig, OsrmGeometryProvider};
//!
//! let config = OsrmGeometryConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_profile("driving");
//! let selector = GeometrySelector::with_primary(OsrmGeometryProvider::with_config(config)?);
//!
//! let line = selector.geometry_for(&[
//!     Location { lat: 43.76, lon: -79.41 },
//!     Location { lat: 43.70, lon: -79.40 },
//! ]);
//! assert!(!line.is_empty());
//! # Ok::<(), haulplan_data::routing::ProviderBuildError>(())
//! ```

mod osrm;
mod provider;

pub use provider::{
    DEFAULT_USER_AGENT, OsrmGeometryConfig, OsrmGeometryProvider, ProviderBuildError,
};
