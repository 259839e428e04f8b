//! Core domain types for the Nightdose system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Basal schedule entries and profiles
//! - Treatment events
//! - Daily insulin totals

use serde::{Deserialize, Serialize};

// ============================================================================
// Profile Types
// ============================================================================

/// One step of a pump basal schedule: from `time_seconds` (seconds into the
/// day) onward, insulin is delivered at `rate` U/hr until the next entry.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct BasalEntry {
    pub time_seconds: u32,
    pub rate: f64,
}

impl BasalEntry {
    pub fn new(time_seconds: u32, rate: f64) -> Self {
        Self { time_seconds, rate }
    }
}

/// A pump profile: the timezone the pump reports and its basal schedule,
/// expressed in pump-local time-of-day seconds.
///
/// The offset is treated as a constant shift, exactly as the pump reports
/// it. No daylight-saving transitions are modeled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub utc_offset_minutes: i32,
    pub basal_schedule: Vec<BasalEntry>,
}

impl Profile {
    pub fn utc_offset_seconds(&self) -> i64 {
        i64::from(self.utc_offset_minutes) * 60
    }
}

// ============================================================================
// Treatment Types
// ============================================================================

/// A raw treatment event as recorded by the pump uploader.
///
/// Every field except the timestamp is optional by nature; the timestamp is
/// optional because corrupt or partial records must not abort aggregation
/// (they are dropped during selection instead). A treatment carrying a
/// `rate` is a temp-basal override; one carrying only `insulin` is a bolus.
/// The old `-1` rate sentinel is replaced by `Option` here.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Treatment {
    /// Event time in milliseconds UTC, if the record carried a usable one.
    pub timestamp_ms: Option<i64>,
    /// Temp-basal duration in milliseconds.
    pub duration_ms: Option<i64>,
    /// Bolus dose in units.
    pub insulin: Option<f64>,
    /// Temp-basal override rate in U/hr.
    pub rate: Option<f64>,
}

// ============================================================================
// Result Type
// ============================================================================

/// Total insulin delivered during one civil calendar day.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DailyTotals {
    pub basal_units: f64,
    pub bolus_units: f64,
}

impl DailyTotals {
    /// Total daily dose: basal plus bolus.
    pub fn tdd(&self) -> f64 {
        self.basal_units + self.bolus_units
    }
}
