//! CF time coordinate decoding
//!
//! Time coordinates are stored as offsets from a reference instant, described
//! by a units string such as `"days since 1970-01-01 00:00:00"`. Only calendars
//! that agree with the proleptic Gregorian calendar chrono implements are
//! decoded; model calendars (`360_day`, `noleap`, ...) are left numeric.

use crate::errors::{CubeFrameError, Result};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parsed `"<unit> since <reference>"` time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUnits {
    /// Length of one unit step in nanoseconds
    pub step_ns: i64,
    /// Instant that a value of zero refers to
    pub reference: NaiveDateTime,
}

impl TimeUnits {
    /// Parses a CF time units string.
    ///
    /// # Errors
    ///
    /// Returns [`CubeFrameError::InvalidTimeUnits`] if the string is not of
    /// the form `"<unit> since <reference>"` or either part is unrecognised.
    pub fn parse(units: &str) -> Result<Self> {
        let invalid = || CubeFrameError::InvalidTimeUnits {
            units: units.to_string(),
        };

        let (step, reference) = units.split_once(" since ").ok_or_else(invalid)?;

        let step_ns = match step.trim().to_lowercase().as_str() {
            "microseconds" | "microsecond" | "usec" | "us" => 1_000,
            "milliseconds" | "millisecond" | "msec" | "ms" => 1_000_000,
            "seconds" | "second" | "secs" | "sec" | "s" => 1_000_000_000,
            "minutes" | "minute" | "mins" | "min" => 60_000_000_000,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3_600_000_000_000,
            "days" | "day" | "d" => 86_400_000_000_000,
            _ => return Err(invalid()),
        };

        let reference = parse_reference(reference).ok_or_else(invalid)?;

        Ok(Self { step_ns, reference })
    }

    /// Converts an offset into an instant at nanosecond resolution.
    /// Non-finite values and offsets beyond about 292 years give `None`.
    #[must_use]
    pub fn decode(&self, value: f64) -> Option<NaiveDateTime> {
        if !value.is_finite() {
            return None;
        }
        let ns = (value * self.step_ns as f64).round();
        if ns.abs() >= i64::MAX as f64 {
            return None;
        }
        self.reference
            .checked_add_signed(TimeDelta::nanoseconds(ns as i64))
    }
}

/// Whether a units string describes a time reference.
#[must_use]
pub fn is_time_reference(units: &str) -> bool {
    units.contains(" since ")
}

/// Whether values on this calendar can be decoded with chrono.
#[must_use]
pub fn is_gregorian(calendar: Option<&str>) -> bool {
    match calendar {
        None => true,
        Some(name) => matches!(
            name.trim().to_lowercase().as_str(),
            "standard" | "gregorian" | "proleptic_gregorian"
        ),
    }
}

fn parse_reference(reference: &str) -> Option<NaiveDateTime> {
    let trimmed = reference
        .trim()
        .trim_end_matches(" UTC")
        .trim_end_matches('Z')
        .trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
