//! Daily insulin totals.
//!
//! Orchestrates the full reconciliation pipeline for one civil day:
//! normalize the schedule, resolve the day window, select and classify
//! treatments, accumulate hourly basal, aggregate boluses, report totals.
//!
//! The computation is pure over its inputs: nothing is cached across calls
//! and independent invocations can run in parallel without coordination.

use crate::accumulator::{local_seconds_of_day, HourlyBasal};
use crate::select::{select_in_window, DosedTreatment};
use crate::trace::{NullTrace, TraceSink};
use crate::{DailyTotals, DayWindow, NormalizedSchedule, Profile, Result, Treatment};

/// Compute total basal and bolus insulin for one local calendar day.
///
/// `local_date` is a `YYYY-MM-DD` civil date in the pump's local timezone.
/// Returns `Error::Config` for a profile with an empty basal schedule and
/// `Error::Date` for an unparsable date; a day with no in-window
/// treatments is a normal `(0, 0)` outcome, not a failure.
pub fn daily_insulin(
    profile: &Profile,
    treatments: &[Treatment],
    local_date: &str,
) -> Result<DailyTotals> {
    daily_insulin_traced(profile, treatments, local_date, &mut NullTrace)
}

/// Like [`daily_insulin`], additionally emitting a diagnostic trace.
///
/// The sink only observes intermediate state; it can never change the
/// computed totals.
pub fn daily_insulin_traced(
    profile: &Profile,
    treatments: &[Treatment],
    local_date: &str,
    trace: &mut dyn TraceSink,
) -> Result<DailyTotals> {
    // Normalizing first means a misconfigured (empty) schedule fails even
    // on a day without treatments, instead of being masked by the
    // short-circuit below.
    let schedule = NormalizedSchedule::from_profile(profile)?;
    let window = DayWindow::for_local_date(local_date, profile.utc_offset_minutes)?;

    // The short-circuit keys off the window filter alone: a window whose
    // records are all unclassifiable is still a non-empty window, and the
    // scheduled basal is delivered regardless of what was recorded.
    let selection = select_in_window(treatments, &window);
    if selection.in_window == 0 {
        let note = format!("No relevant treatments found for {}", local_date);
        tracing::info!("{}", note);
        trace.note(&note);
        return Ok(DailyTotals::default());
    }

    trace.schedule(&schedule);

    let mut hourly = HourlyBasal::from_schedule(&schedule);
    trace.hourly("Hourly basal rates", hourly.buckets());

    let offset_seconds = profile.utc_offset_seconds();
    for event in &selection.events {
        if let DosedTreatment::BasalOverride {
            timestamp_ms,
            duration_ms,
            rate,
        } = *event
        {
            let seconds_of_day = local_seconds_of_day(timestamp_ms, offset_seconds);
            hourly.apply_override(&schedule, seconds_of_day, duration_ms, rate);
        }
    }

    let (bolus_units, bolus_list) = aggregate_boluses(&selection.events);

    trace.hourly("Hourly basal delivery", hourly.buckets());
    trace.boluses(&bolus_list);

    let totals = DailyTotals {
        basal_units: hourly.total(),
        bolus_units,
    };

    tracing::info!(
        "{}: basal {:.2} U, bolus {:.2} U, TDD {:.2} U",
        local_date,
        totals.basal_units,
        totals.bolus_units,
        totals.tdd()
    );

    Ok(totals)
}

/// Sum bolus doses among the selected treatments.
///
/// Also returns the individual amounts in selection order for diagnostics.
/// No deduplication: repeated identical doses all count (the upstream feed
/// is assumed already deduplicated).
pub fn aggregate_boluses(selected: &[DosedTreatment]) -> (f64, Vec<f64>) {
    let list: Vec<f64> = selected
        .iter()
        .filter_map(|event| match event {
            DosedTreatment::Bolus { units, .. } => Some(*units),
            DosedTreatment::BasalOverride { .. } => None,
        })
        .collect();

    // Fold from +0.0: `sum()` starts from -0.0 on current toolchains, which
    // would report "-0.00 U" for a day without boluses.
    let total = list.iter().fold(0.0, |acc, units| acc + units);
    (total, list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BasalEntry, Error, TraceSink};

    // Scenario profile: 0.5/0.8/0.6/0.9 at 6h steps, pump at UTC+1.
    // Shifted hourly defaults sum to 18.8 U.
    fn test_profile() -> Profile {
        Profile {
            utc_offset_minutes: 60,
            basal_schedule: vec![
                BasalEntry::new(0, 0.5),
                BasalEntry::new(21_600, 0.8),
                BasalEntry::new(43_200, 0.6),
                BasalEntry::new(64_800, 0.9),
            ],
        }
    }

    // 2024-12-12 local at UTC+1 starts at 2024-12-11T23:00:00Z
    const WINDOW_START_MS: i64 = 1_733_961_600_000 - 3_600_000;

    fn bolus(offset_into_day_ms: i64, units: f64) -> Treatment {
        Treatment {
            timestamp_ms: Some(WINDOW_START_MS + offset_into_day_ms),
            insulin: Some(units),
            ..Treatment::default()
        }
    }

    #[test]
    fn test_no_treatments_is_zero_zero() {
        let totals = daily_insulin(&test_profile(), &[], "2024-12-12").unwrap();
        assert_eq!(totals, DailyTotals::default());
    }

    #[test]
    fn test_treatments_outside_window_is_zero_zero() {
        let treatments = vec![bolus(-1, 4.5), bolus(86_400_000, 2.0)];
        let totals = daily_insulin(&test_profile(), &treatments, "2024-12-12").unwrap();
        assert_eq!(totals, DailyTotals::default());
    }

    #[test]
    fn test_window_with_only_unclassifiable_records_accrues_scheduled_basal() {
        // A dated note, a zero-unit bolus and a negative-rate record all
        // classify as nothing, but the window itself is non-empty, so the
        // scheduled basal for the day still counts.
        let treatments = vec![
            Treatment {
                timestamp_ms: Some(WINDOW_START_MS + 3_600_000),
                ..Treatment::default()
            },
            bolus(6 * 3_600_000, 0.0),
            Treatment {
                timestamp_ms: Some(WINDOW_START_MS + 9 * 3_600_000),
                insulin: Some(4.5),
                rate: Some(-1.0),
                ..Treatment::default()
            },
        ];

        let totals = daily_insulin(&test_profile(), &treatments, "2024-12-12").unwrap();
        assert!((totals.basal_units - 18.8).abs() < 1e-9);
        assert_eq!(totals.bolus_units, 0.0);
    }

    #[test]
    fn test_single_bolus_in_window() {
        let treatments = vec![bolus(12 * 3_600_000, 4.5)];
        let totals = daily_insulin(&test_profile(), &treatments, "2024-12-12").unwrap();

        assert!((totals.basal_units - 18.8).abs() < 1e-9);
        assert!((totals.bolus_units - 4.5).abs() < 1e-9);
        assert!((totals.tdd() - 23.3).abs() < 1e-9);
    }

    #[test]
    fn test_bolus_at_window_start_included() {
        let treatments = vec![bolus(0, 1.0)];
        let totals = daily_insulin(&test_profile(), &treatments, "2024-12-12").unwrap();
        assert!((totals.bolus_units - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_override_adjusts_its_start_hour() {
        // 12h after window start is 12:00 local, where the default rate
        // is 0.6 U/hr.
        let treatments = vec![Treatment {
            timestamp_ms: Some(WINDOW_START_MS + 12 * 3_600_000),
            duration_ms: Some(1_800_000),
            rate: Some(1.2),
            ..Treatment::default()
        }];

        let totals = daily_insulin(&test_profile(), &treatments, "2024-12-12").unwrap();

        // (1.2 - 0.6) * 0.5h = +0.3 U on top of the 18.8 U default
        assert!((totals.basal_units - 19.1).abs() < 1e-9);
        assert_eq!(totals.bolus_units, 0.0);
    }

    #[test]
    fn test_record_with_rate_and_insulin_counts_only_as_override() {
        let treatments = vec![Treatment {
            timestamp_ms: Some(WINDOW_START_MS + 12 * 3_600_000),
            duration_ms: Some(1_800_000),
            insulin: Some(4.5),
            rate: Some(1.2),
        }];

        let totals = daily_insulin(&test_profile(), &treatments, "2024-12-12").unwrap();
        assert_eq!(totals.bolus_units, 0.0);
        assert!((totals.basal_units - 19.1).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_identical_boluses_all_count() {
        let treatments = vec![bolus(3_600_000, 2.5), bolus(3_600_000, 2.5)];
        let totals = daily_insulin(&test_profile(), &treatments, "2024-12-12").unwrap();
        assert!((totals.bolus_units - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let treatments = vec![
            bolus(3_600_000, 4.5),
            Treatment {
                timestamp_ms: Some(WINDOW_START_MS + 7 * 3_600_000),
                duration_ms: Some(3_600_000),
                rate: Some(0.0),
                ..Treatment::default()
            },
        ];

        let first = daily_insulin(&test_profile(), &treatments, "2024-12-12").unwrap();
        let second = daily_insulin(&test_profile(), &treatments, "2024-12-12").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_schedule_is_config_error_even_without_treatments() {
        let profile = Profile {
            utc_offset_minutes: 60,
            basal_schedule: vec![],
        };
        let result = daily_insulin(&profile, &[], "2024-12-12");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_date_is_date_error() {
        let result = daily_insulin(&test_profile(), &[], "yesterday");
        assert!(matches!(result, Err(Error::Date(_))));
    }

    #[test]
    fn test_trace_never_changes_result() {
        struct MeddlingTrace;
        impl TraceSink for MeddlingTrace {
            fn hourly(&mut self, _label: &str, _buckets: &[f64; 24]) {}
        }

        let treatments = vec![bolus(3_600_000, 4.5)];
        let traced = daily_insulin_traced(
            &test_profile(),
            &treatments,
            "2024-12-12",
            &mut MeddlingTrace,
        )
        .unwrap();
        let plain = daily_insulin(&test_profile(), &treatments, "2024-12-12").unwrap();
        assert_eq!(traced, plain);
    }

    #[test]
    fn test_no_treatment_note_emitted() {
        #[derive(Default)]
        struct NoteTrace {
            notes: Vec<String>,
        }
        impl TraceSink for NoteTrace {
            fn note(&mut self, message: &str) {
                self.notes.push(message.to_string());
            }
        }

        let mut sink = NoteTrace::default();
        daily_insulin_traced(&test_profile(), &[], "2024-12-12", &mut sink).unwrap();
        assert_eq!(sink.notes.len(), 1);
        assert!(sink.notes[0].contains("2024-12-12"));
    }

    #[test]
    fn test_aggregate_boluses_keeps_order() {
        let selected = vec![
            DosedTreatment::Bolus {
                timestamp_ms: 0,
                units: 1.5,
            },
            DosedTreatment::BasalOverride {
                timestamp_ms: 0,
                duration_ms: 0,
                rate: 0.5,
            },
            DosedTreatment::Bolus {
                timestamp_ms: 1,
                units: 3.0,
            },
        ];

        let (total, list) = aggregate_boluses(&selected);
        assert!((total - 4.5).abs() < 1e-9);
        assert_eq!(list, vec![1.5, 3.0]);
    }
}
