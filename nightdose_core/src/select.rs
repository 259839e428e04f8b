//! Treatment selection and classification.
//!
//! Raw treatments are filtered against the day window and classified into
//! the two event kinds the accumulators care about. Classification is
//! override-first: a record carrying both a temp-basal rate and a bolus
//! amount counts only as an override, never as a bolus. That precedence is
//! carried over from the source system on purpose.

use crate::{DayWindow, Treatment};

/// A treatment that survived window filtering and classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DosedTreatment {
    /// A temp-basal override: `rate` U/hr for `duration_ms`, starting at
    /// `timestamp_ms`. A record without a duration is a zero-length
    /// override (delta 0, still not a bolus).
    BasalOverride {
        timestamp_ms: i64,
        duration_ms: i64,
        rate: f64,
    },
    /// A discrete bolus dose of `units` U.
    Bolus { timestamp_ms: i64, units: f64 },
}

/// Outcome of window filtering and classification.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    /// Classified events, in input order.
    pub events: Vec<DosedTreatment>,
    /// Number of timestamped records inside the window, counted before
    /// classification. The pipeline short-circuit keys off this count: a
    /// window holding only unclassifiable records is still a non-empty
    /// window and the scheduled basal must be computed for it.
    pub in_window: usize,
}

/// Filter treatments to the window and classify the survivors.
///
/// Records with a missing timestamp are dropped silently (tolerance policy:
/// corrupt or partial records must not abort aggregation). Records that are
/// neither an override nor a positive bolus are dropped as irrelevant, but
/// still counted as in-window.
pub fn select_in_window(treatments: &[Treatment], window: &DayWindow) -> Selection {
    let mut selection = Selection::default();
    let mut malformed = 0usize;

    for treatment in treatments {
        let timestamp_ms = match treatment.timestamp_ms {
            Some(ts) => ts,
            None => {
                malformed += 1;
                continue;
            }
        };
        if !window.contains(timestamp_ms) {
            continue;
        }
        selection.in_window += 1;

        match classify(treatment, timestamp_ms) {
            Some(event) => selection.events.push(event),
            None => {
                tracing::debug!("Dropping unclassifiable treatment at {}", timestamp_ms);
            }
        }
    }

    if malformed > 0 {
        tracing::warn!("Dropped {} treatments without a usable timestamp", malformed);
    }

    selection
}

/// Classify a single in-window treatment, override-first.
fn classify(treatment: &Treatment, timestamp_ms: i64) -> Option<DosedTreatment> {
    if let Some(rate) = treatment.rate {
        // Presence of a rate makes the record an override candidate; a
        // negative rate is malformed, but still never falls through to
        // the bolus branch.
        if rate >= 0.0 {
            return Some(DosedTreatment::BasalOverride {
                timestamp_ms,
                duration_ms: treatment.duration_ms.unwrap_or(0).max(0),
                rate,
            });
        }
        return None;
    }

    match treatment.insulin {
        Some(units) if units > 0.0 => Some(DosedTreatment::Bolus {
            timestamp_ms,
            units,
        }),
        _ => None,
    }
}
