use clap::{Parser, Subcommand};
use nightdose_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "nightdose")]
#[command(about = "Daily insulin totals from Nightscout data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Named basal schedule to use from the profile store
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Path to the profile JSON (overrides the data directory lookup)
    #[arg(long, global = true)]
    profile_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute basal/bolus totals for one local calendar day
    Day {
        /// Calendar date (YYYY-MM-DD) in the pump's local timezone
        date: String,

        /// Path to the treatments JSON (overrides the data directory lookup)
        #[arg(long)]
        treatments_file: Option<PathBuf>,

        /// Print the diagnostic trace (schedule, hourly arrays, boluses)
        #[arg(long)]
        trace: bool,
    },

    /// Print the UTC-adjusted basal schedule for a profile
    Schedule,
}

fn main() -> Result<()> {
    // Initialize logging
    nightdose_core::logging::init();

    let cli = Cli::parse();

    // Determine data locations
    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let profile_path = cli
        .profile_file
        .unwrap_or_else(|| config.profile_path(&data_dir));
    let store_name = cli.profile.or_else(|| config.profile.store_name.clone());

    match cli.command {
        Commands::Day {
            date,
            treatments_file,
            trace,
        } => {
            let treatments_path =
                treatments_file.unwrap_or_else(|| config.treatments_path(&data_dir));
            cmd_day(
                &profile_path,
                &treatments_path,
                store_name.as_deref(),
                &date,
                trace,
            )
        }
        Commands::Schedule => cmd_schedule(&profile_path, store_name.as_deref()),
    }
}

fn cmd_day(
    profile_path: &Path,
    treatments_path: &Path,
    store_name: Option<&str>,
    date: &str,
    trace: bool,
) -> Result<()> {
    let profile = load_selected_profile(profile_path, store_name)?;
    let treatments = load_treatments(treatments_path)?;

    let totals = if trace {
        daily_insulin_traced(&profile, &treatments, date, &mut PrintTrace)?
    } else {
        daily_insulin(&profile, &treatments, date)?
    };

    println!("Basal insulin: {:.2} U", totals.basal_units);
    println!("Bolus insulin: {:.2} U", totals.bolus_units);
    println!("Total daily dose (TDD): {:.2} U", totals.tdd());

    Ok(())
}

fn cmd_schedule(profile_path: &Path, store_name: Option<&str>) -> Result<()> {
    let profile = load_selected_profile(profile_path, store_name)?;
    let schedule = NormalizedSchedule::from_profile(&profile)?;

    println!("Adjusted basal schedule (UTC):");
    for range in schedule.hour_ranges() {
        println!("  {}", range);
    }

    Ok(())
}

/// Load the profile documents and pick one named schedule.
///
/// The pump uploader writes the current profile first, so the first
/// document is used.
fn load_selected_profile(path: &Path, store_name: Option<&str>) -> Result<Profile> {
    let documents = load_profiles(path)?;
    let document = documents
        .first()
        .ok_or_else(|| Error::Profile(format!("no profile documents in {:?}", path)))?;
    document.to_profile(store_name)
}

/// Trace sink that prints the diagnostic dump to stdout.
struct PrintTrace;

impl TraceSink for PrintTrace {
    fn schedule(&mut self, schedule: &NormalizedSchedule) {
        println!("Adjusted basal schedule (UTC):");
        for range in schedule.hour_ranges() {
            println!("  {}", range);
        }
    }

    fn hourly(&mut self, label: &str, buckets: &[f64; 24]) {
        println!("{}: {:?}", label, buckets);
    }

    fn boluses(&mut self, units: &[f64]) {
        println!("Bolus events: {:?}", units);
    }

    fn note(&mut self, message: &str) {
        println!("{}", message);
    }
}
