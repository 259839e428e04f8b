//! Diagnostic trace sink.
//!
//! The totals computation can emit a human-readable trace of its
//! intermediate state: the normalized schedule, the hourly arrays and the
//! individual boluses. The sink is side-effect only and never feeds back
//! into the computed result; it is not a stable machine-readable contract.

use crate::NormalizedSchedule;

/// Receiver for diagnostic events emitted during a daily computation.
///
/// All methods default to no-ops so implementors pick what they care about.
pub trait TraceSink {
    /// The normalized (UTC-shifted) basal schedule.
    fn schedule(&mut self, _schedule: &NormalizedSchedule) {}

    /// A labelled 24-bucket hourly array ("hourly basal rates" before
    /// overrides, "hourly basal delivery" after).
    fn hourly(&mut self, _label: &str, _buckets: &[f64; 24]) {}

    /// The individual bolus doses, in selection order.
    fn boluses(&mut self, _units: &[f64]) {}

    /// A free-form informational note (e.g. "no treatments in window").
    fn note(&mut self, _message: &str) {}
}

/// Sink that discards everything.
pub struct NullTrace;

impl TraceSink for NullTrace {}

/// Sink that emits the trace through `tracing` at info level.
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn schedule(&mut self, schedule: &NormalizedSchedule) {
        tracing::info!("Adjusted basal schedule (UTC):");
        for range in schedule.hour_ranges() {
            tracing::info!("  {}", range);
        }
    }

    fn hourly(&mut self, label: &str, buckets: &[f64; 24]) {
        tracing::info!("{}: {:?}", label, buckets);
    }

    fn boluses(&mut self, units: &[f64]) {
        tracing::info!("Bolus events: {:?}", units);
    }

    fn note(&mut self, message: &str) {
        tracing::info!("{}", message);
    }
}
