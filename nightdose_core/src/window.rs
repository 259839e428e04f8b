//! Day window resolution.
//!
//! A requested day is a civil calendar date in the pump's local timezone.
//! It is converted to a half-open UTC instant interval by treating the
//! profile's UTC offset as a constant shift (no tz database, no DST).

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveTime};

/// Milliseconds in one civil day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Half-open UTC interval `[start, end)` covering one local calendar day,
/// in milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl DayWindow {
    /// Resolve a `YYYY-MM-DD` local date against a UTC offset in minutes.
    ///
    /// Local midnight is parsed as if it were UTC midnight, then shifted
    /// back by the offset; the window always spans exactly 24 hours.
    pub fn for_local_date(date: &str, utc_offset_minutes: i32) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| Error::Date(format!("invalid date {:?}: {}", date, e)))?;

        let midnight_utc_ms = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        let start_ms = midnight_utc_ms - i64::from(utc_offset_minutes) * 60_000;

        Ok(Self {
            start_ms,
            end_ms: start_ms + MILLIS_PER_DAY,
        })
    }

    /// Whether a UTC millisecond timestamp falls inside the window.
    pub fn contains(&self, timestamp_ms: i64) -> bool {
        self.start_ms <= timestamp_ms && timestamp_ms < self.end_ms
    }
}
