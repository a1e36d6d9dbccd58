//! External collaborators for the haulplan engines.
//!
//! Responsibilities:
//! - Fetch road-following route geometry from an OSRM service.
//! - Persist ledger changes reported by the inventory engine to SQLite.
//!
//! Boundaries:
//! - Do not encode planning or stock rules (live in `haulplan-routing` and
//!   `haulplan-inventory`).
//! - Callers treat every adapter as best effort: failures are returned,
//!   never retried here.
//!
//! Invariants:
//! - Thread-safe by default.
//! - No global mutable state.

#[cfg(feature = "osrm")]
pub mod routing;

#[cfg(feature = "store-sqlite")]
pub mod store;
