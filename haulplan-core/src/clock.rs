//! Wall-clock seam.

use jiff::Timestamp;

/// Source of the current instant.
///
/// Reservation expiry and snapshot timestamps read time through this trait
/// so tests can advance it explicitly.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Timestamp;
}

/// [`Clock`] reading the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
