//! Basal schedule normalization.
//!
//! A pump profile expresses its basal schedule in pump-local time-of-day
//! seconds. The accumulator works in UTC-shifted seconds-of-day, so each
//! entry is shifted by the profile's UTC offset (modulo one day) and a
//! synthetic wrap-around entry is added at second 0 so that every instant
//! of the day has a defined rate.

use crate::{BasalEntry, Error, Profile, Result};

/// Seconds in one civil day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// A basal schedule shifted to UTC seconds-of-day.
///
/// Invariants: entries are sorted ascending by time, times are unique, and
/// the first entry is at second 0, so `rate_at` is total over `[0, 86400)`.
#[derive(Clone, Debug)]
pub struct NormalizedSchedule {
    entries: Vec<BasalEntry>,
}

impl NormalizedSchedule {
    /// Normalize a raw local-time schedule using the given UTC offset.
    ///
    /// Returns `Error::Config` if the schedule is empty: without at least
    /// one entry no default rate can ever be derived.
    pub fn new(schedule: &[BasalEntry], utc_offset_minutes: i32) -> Result<Self> {
        let offset_seconds = i64::from(utc_offset_minutes) * 60;

        // The wrap-around entry carries the rate of the latest local entry:
        // that rate is the one in force at local midnight, which the UTC
        // shift can move into the middle of the day.
        let wrap_rate = schedule
            .iter()
            .max_by_key(|e| e.time_seconds)
            .map(|e| e.rate)
            .ok_or_else(|| Error::Config("basal schedule is empty".into()))?;

        let mut entries: Vec<BasalEntry> = schedule
            .iter()
            .map(|e| {
                let shifted =
                    (i64::from(e.time_seconds) - offset_seconds).rem_euclid(SECONDS_PER_DAY);
                BasalEntry::new(shifted as u32, e.rate)
            })
            .collect();
        entries.push(BasalEntry::new(0, wrap_rate));

        entries.sort_by_key(|e| e.time_seconds);

        // Keep the last entry for any duplicated time (an original entry
        // can land exactly on the synthetic midnight slot).
        entries.reverse();
        entries.dedup_by_key(|e| e.time_seconds);
        entries.reverse();

        Ok(Self { entries })
    }

    /// Normalize the schedule of a profile.
    pub fn from_profile(profile: &Profile) -> Result<Self> {
        Self::new(&profile.basal_schedule, profile.utc_offset_minutes)
    }

    /// Rate in force at `seconds_of_day`: the latest entry at or before it.
    pub fn rate_at(&self, seconds_of_day: u32) -> f64 {
        let idx = self
            .entries
            .partition_point(|e| e.time_seconds <= seconds_of_day);
        // idx >= 1 because the first entry is always at second 0
        self.entries[idx - 1].rate
    }

    /// The normalized entries, sorted ascending by time.
    pub fn entries(&self) -> &[BasalEntry] {
        &self.entries
    }

    /// Human-readable hour ranges, e.g. `00:00 -> 04:59: 0.9 U/hr`.
    ///
    /// Only meant for diagnostics; ranges are rounded to whole hours.
    pub fn hour_ranges(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let start_hour = entry.time_seconds / 3600;
                let end_hour = self
                    .entries
                    .get(i + 1)
                    .map(|next| (next.time_seconds / 3600).saturating_sub(1))
                    .unwrap_or(23);
                format!(
                    "{:02}:00 -> {:02}:59: {} U/hr",
                    start_hour, end_hour, entry.rate
                )
            })
            .collect()
    }
}
