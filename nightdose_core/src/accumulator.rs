//! Hourly basal accumulation.
//!
//! A 24-bucket array of delivered basal insulin per hour. Buckets start at
//! the scheduled default rate in force at the top of each hour and are then
//! adjusted by temp-basal overrides.

use crate::schedule::{NormalizedSchedule, SECONDS_PER_DAY};

/// Convert a UTC millisecond timestamp to local seconds-of-day under a
/// fixed offset. This is the time base used to locate overrides against
/// the normalized schedule.
pub fn local_seconds_of_day(timestamp_ms: i64, utc_offset_seconds: i64) -> u32 {
    (timestamp_ms.div_euclid(1000) + utc_offset_seconds).rem_euclid(SECONDS_PER_DAY) as u32
}

/// Per-hour basal delivery for one day, in units.
#[derive(Clone, Debug)]
pub struct HourlyBasal {
    buckets: [f64; 24],
}

impl HourlyBasal {
    /// Seed every bucket with the scheduled rate in force at the start of
    /// its hour. Sub-hour schedule steps are not resolved at this
    /// granularity; overrides are, since they are applied at their exact
    /// timestamp.
    pub fn from_schedule(schedule: &NormalizedSchedule) -> Self {
        let mut buckets = [0.0; 24];
        for (hour, bucket) in buckets.iter_mut().enumerate() {
            *bucket = schedule.rate_at(hour as u32 * 3600);
        }
        Self { buckets }
    }

    /// Apply one temp-basal override starting at `seconds_of_day`.
    ///
    /// The delta against the scheduled default rate is weighted by the
    /// override duration and credited entirely to the bucket of the start
    /// hour, even when the duration crosses into later hours. That is a
    /// known resolution approximation carried over from the source system.
    pub fn apply_override(
        &mut self,
        schedule: &NormalizedSchedule,
        seconds_of_day: u32,
        duration_ms: i64,
        rate: f64,
    ) {
        let default_rate = schedule.rate_at(seconds_of_day);
        let delta = (rate - default_rate) * (duration_ms as f64 / 3_600_000.0);
        // seconds_of_day < 86400, so the hour index is always in 0..24
        let hour = (seconds_of_day / 3600) as usize;
        self.buckets[hour] += delta;

        tracing::debug!(
            "Override at {}s: {} U/hr vs default {} U/hr for {} ms -> {:+.3} U in hour {}",
            seconds_of_day,
            rate,
            default_rate,
            duration_ms,
            delta,
            hour
        );
    }

    /// Total basal insulin over the day.
    pub fn total(&self) -> f64 {
        self.buckets.iter().sum()
    }

    pub fn buckets(&self) -> &[f64; 24] {
        &self.buckets
    }
}
