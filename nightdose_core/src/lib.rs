#![forbid(unsafe_code)]

//! Core domain model and reconciliation logic for the Nightdose system.
//!
//! This crate provides:
//! - Domain types (profiles, basal schedules, treatments, day windows)
//! - Schedule normalization (pump-local time to UTC seconds-of-day)
//! - Treatment selection and classification
//! - Hourly basal accumulation and bolus aggregation
//! - Nightscout JSON document loading

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod schedule;
pub mod window;
pub mod select;
pub mod accumulator;
pub mod trace;
pub mod nightscout;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use schedule::NormalizedSchedule;
pub use window::DayWindow;
pub use select::{select_in_window, DosedTreatment, Selection};
pub use accumulator::HourlyBasal;
pub use trace::{LogTrace, NullTrace, TraceSink};
pub use nightscout::{load_profiles, load_treatments, ProfileDocument};
pub use config::Config;
pub use engine::{daily_insulin, daily_insulin_traced};
