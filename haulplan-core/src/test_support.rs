//! Deterministic doubles for the seams defined in this crate.
//!
//! Enabled for unit tests and, through the `test-support` feature, for
//! downstream crates' tests.

use jiff::{SignedDuration, Timestamp};
use parking_lot::Mutex;

use crate::{Clock, GeometryError, Location, RouteGeometryProvider, Variability};

/// [`Variability`] that always lands at the same relative position.
///
/// `fraction` is the position inside each requested range: `0.0` selects
/// the lower bound and `1.0` the upper bound.
///
/// # Examples
///
/// ```
/// use haulplan_core::Variability;
/// use haulplan_core::test_support::FixedVariability;
///
/// let mut v = FixedVariability::new(0.5);
/// assert_eq!(v.uniform(1.0, 2.0), 1.5);
/// assert_eq!(v.integer(0, 10), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedVariability {
    fraction: f64,
}

impl FixedVariability {
    /// Fixed position clamped to `[0, 1]`.
    #[must_use]
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    /// Always pick lower bounds.
    #[must_use]
    pub fn lowest() -> Self {
        Self::new(0.0)
    }

    /// Always pick upper bounds.
    #[must_use]
    pub fn highest() -> Self {
        Self::new(1.0)
    }
}

impl Variability for FixedVariability {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high > low {
            low + (high - low) * self.fraction
        } else {
            low
        }
    }

    fn integer(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        let offset = ((high - low) as f64 * self.fraction).round() as i64;
        low + offset
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let raw = (len as f64 * self.fraction).floor() as usize;
        raw.min(len - 1)
    }
}

/// [`Clock`] that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Clock frozen at `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward by whole minutes.
    ///
    /// Saturates at the largest representable instant.
    pub fn advance_minutes(&self, minutes: i64) {
        let mut now = self.now.lock();
        *now = now
            .checked_add(SignedDuration::from_mins(minutes))
            .unwrap_or(Timestamp::MAX);
    }

    /// Jump to `at`.
    pub fn set(&self, at: Timestamp) {
        *self.now.lock() = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Timestamp::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

/// [`RouteGeometryProvider`] returning a canned line or error.
#[derive(Debug, Clone)]
pub struct StubGeometryProvider {
    response: Result<Vec<Location>, GeometryError>,
    available: bool,
}

impl StubGeometryProvider {
    /// Provider answering every call with `line`.
    #[must_use]
    pub fn with_line(line: Vec<Location>) -> Self {
        Self {
            response: Ok(line),
            available: true,
        }
    }

    /// Provider failing every call with `error`.
    #[must_use]
    pub fn with_error(error: GeometryError) -> Self {
        Self {
            response: Err(error),
            available: true,
        }
    }

    /// Report the provider as unavailable.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

impl RouteGeometryProvider for StubGeometryProvider {
    fn is_available(&self) -> bool {
        self.available
    }

    fn route_geometry(&self, waypoints: &[Location]) -> Result<Vec<Location>, GeometryError> {
        if waypoints.is_empty() {
            return Err(GeometryError::EmptyInput);
        }
        self.response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 1, 0)]
    #[case(1.0, 15, 4)]
    fn fixed_variability_hits_bounds(
        #[case] fraction: f64,
        #[case] expected_int: i64,
        #[case] expected_index: usize,
    ) {
        let mut v = FixedVariability::new(fraction);
        assert_eq!(v.integer(1, 15), expected_int);
        assert_eq!(v.index(5), expected_index);
    }

    #[rstest]
    fn manual_clock_advances() {
        let clock = ManualClock::default();
        clock.advance_minutes(10);
        assert_eq!(clock.now().as_second(), 600);
    }
}
