//! Time-of-day values and timestamp arithmetic.
//!
//! Planning windows arrive as `HH:MM` strings relative to a service date.
//! Service dates are interpreted in UTC.

use std::fmt;
use std::str::FromStr;

use jiff::civil::{Date, Time};
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A wall-clock time of day with minute precision.
///
/// # Examples
///
/// ```
/// use haulplan_core::ClockTime;
///
/// let start: ClockTime = "04:30".parse()?;
/// assert_eq!((start.hour(), start.minute()), (4, 30));
/// assert_eq!(start.to_string(), "04:30");
/// assert!("4:30".parse::<ClockTime>().is_err());
/// # Ok::<(), haulplan_core::ClockTimeError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ClockTime(Time);

/// Errors from parsing a [`ClockTime`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockTimeError {
    /// The value was not shaped like `HH:MM`.
    #[error("time {value:?} must be formatted as HH:MM")]
    Format {
        /// Rejected text.
        value: String,
    },
    /// Hours or minutes were out of range.
    #[error("time {value:?} is not a valid time of day")]
    OutOfRange {
        /// Rejected text.
        value: String,
    },
}

/// Errors from timestamp arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A computed instant fell outside the representable range.
    #[error("timestamp arithmetic overflowed: {message}")]
    Overflow {
        /// Detail from the time library.
        message: String,
    },
}

impl ClockTime {
    /// Default start of a delivery window.
    pub const DEFAULT_WINDOW_START: Self = Self(Time::constant(4, 0, 0, 0));
    /// Default end of a delivery window.
    pub const DEFAULT_WINDOW_END: Self = Self(Time::constant(10, 0, 0, 0));

    /// Construct from hour and minute.
    ///
    /// # Errors
    ///
    /// Returns [`ClockTimeError::OutOfRange`] for hours above 23 or minutes
    /// above 59.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ClockTimeError> {
        let out_of_range = || ClockTimeError::OutOfRange {
            value: format!("{hour:02}:{minute:02}"),
        };
        let h = i8::try_from(hour).map_err(|_| out_of_range())?;
        let m = i8::try_from(minute).map_err(|_| out_of_range())?;
        Time::new(h, m, 0, 0).map(Self).map_err(|_| out_of_range())
    }

    /// Hour of day, `0..=23`.
    #[must_use]
    pub fn hour(self) -> u8 {
        u8::try_from(self.0.hour()).unwrap_or_default()
    }

    /// Minute of hour, `0..=59`.
    #[must_use]
    pub fn minute(self) -> u8 {
        u8::try_from(self.0.minute()).unwrap_or_default()
    }

    /// The UTC instant of this time on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Overflow`] when the instant is not
    /// representable.
    pub fn on(self, date: Date) -> Result<Timestamp, ScheduleError> {
        TimeZone::UTC
            .to_timestamp(date.to_datetime(self.0))
            .map_err(overflow)
    }
}

impl FromStr for ClockTime {
    type Err = ClockTimeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let format_err = || ClockTimeError::Format {
            value: value.to_owned(),
        };
        let (hh, mm) = value.split_once(':').ok_or_else(format_err)?;
        let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
        if !two_digits(hh) || !two_digits(mm) {
            return Err(format_err());
        }
        let hour: u8 = hh.parse().map_err(|_| format_err())?;
        let minute: u8 = mm.parse().map_err(|_| format_err())?;
        Self::new(hour, minute).map_err(|_| ClockTimeError::OutOfRange {
            value: value.to_owned(),
        })
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ClockTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Advance `at` by a fractional number of minutes (negative moves back).
///
/// # Errors
///
/// Returns [`ScheduleError::Overflow`] when `minutes` is not finite or the
/// result is out of range.
pub fn add_minutes(at: Timestamp, minutes: f64) -> Result<Timestamp, ScheduleError> {
    let span = SignedDuration::try_from_secs_f64(minutes * 60.0).map_err(overflow)?;
    at.checked_add(span).map_err(overflow)
}

/// Minutes elapsed from `from` to `to` (negative when `to` is earlier).
#[must_use]
pub fn minutes_between(from: Timestamp, to: Timestamp) -> f64 {
    to.duration_since(from).as_secs_f64() / 60.0
}

fn overflow(err: jiff::Error) -> ScheduleError {
    ScheduleError::Overflow {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use rstest::rstest;

    #[rstest]
    #[case("00:00", 0, 0)]
    #[case("04:00", 4, 0)]
    #[case("23:59", 23, 59)]
    fn parses_valid_times(#[case] text: &str, #[case] hour: u8, #[case] minute: u8) {
        let time: ClockTime = text.parse().expect("valid time");
        assert_eq!((time.hour(), time.minute()), (hour, minute));
        assert_eq!(time.to_string(), text);
    }

    #[rstest]
    #[case("4:00")]
    #[case("04-00")]
    #[case("04:00:00")]
    #[case("ab:cd")]
    #[case("")]
    fn rejects_malformed_times(#[case] text: &str) {
        assert!(matches!(
            text.parse::<ClockTime>(),
            Err(ClockTimeError::Format { .. })
        ));
    }

    #[rstest]
    #[case("24:00")]
    #[case("12:60")]
    fn rejects_out_of_range_times(#[case] text: &str) {
        assert!(matches!(
            text.parse::<ClockTime>(),
            Err(ClockTimeError::OutOfRange { .. })
        ));
    }

    #[rstest]
    fn defaults_match_delivery_window() {
        assert_eq!(ClockTime::DEFAULT_WINDOW_START.to_string(), "04:00");
        assert_eq!(ClockTime::DEFAULT_WINDOW_END.to_string(), "10:00");
    }

    #[rstest]
    fn anchors_time_on_service_date_in_utc() {
        let ts = ClockTime::DEFAULT_WINDOW_START
            .on(date(2024, 3, 1))
            .expect("representable");
        assert_eq!(ts.to_string(), "2024-03-01T04:00:00Z");
    }

    #[rstest]
    fn adds_fractional_minutes() {
        let start = ClockTime::DEFAULT_WINDOW_START
            .on(date(2024, 3, 1))
            .expect("representable");
        let later = add_minutes(start, 90.5).expect("in range");
        assert!((minutes_between(start, later) - 90.5).abs() < 1e-9);
        let earlier = add_minutes(start, -15.0).expect("in range");
        assert!((minutes_between(start, earlier) + 15.0).abs() < 1e-9);
    }

    #[rstest]
    fn non_finite_minutes_overflow() {
        let start = Timestamp::UNIX_EPOCH;
        assert!(add_minutes(start, f64::NAN).is_err());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn serialises_as_text() {
        let time = ClockTime::new(6, 5).expect("valid");
        assert_eq!(serde_json::to_string(&time).expect("json"), "\"06:05\"");
        let back: ClockTime = serde_json::from_str("\"06:05\"").expect("parse");
        assert_eq!(back, time);
    }
}
