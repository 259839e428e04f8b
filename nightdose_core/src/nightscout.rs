//! Nightscout JSON document loading.
//!
//! Profiles and treatments arrive as Nightscout export documents: an array
//! of profile records with a named schedule store, and an array of
//! treatment records whose `date` field may be a plain number, a numeric
//! string, an ISO-8601 string, or Mongo extended JSON
//! (`{"$numberLong": "..."}`), depending on how the data was exported.
//!
//! Loading is tolerant: a record that fails to parse is logged and
//! skipped, never fatal. A treatment whose date cannot be understood is
//! kept with no timestamp and dropped later during window selection.

use crate::{BasalEntry, Error, Profile, Result, Treatment};
use chrono::DateTime;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// Profile Documents
// ============================================================================

/// One Nightscout profile record: the pump's reported UTC offset in
/// minutes and a store of named basal schedules.
#[derive(Clone, Debug, Deserialize)]
pub struct ProfileDocument {
    #[serde(rename = "utcOffset", default)]
    pub utc_offset: i32,
    #[serde(default)]
    pub store: BTreeMap<String, StoreEntry>,
}

/// One named schedule in the profile store.
#[derive(Clone, Debug, Deserialize)]
pub struct StoreEntry {
    #[serde(default)]
    pub basal: Vec<RawBasalEntry>,
}

/// A basal schedule step as Nightscout records it.
#[derive(Clone, Debug, Deserialize)]
pub struct RawBasalEntry {
    #[serde(rename = "timeAsSeconds")]
    pub time_as_seconds: f64,
    pub value: f64,
}

impl ProfileDocument {
    /// Build a core [`Profile`] from one named schedule in the store.
    ///
    /// With `name: None` the first store entry is used (store names are
    /// kept sorted, so "first" is deterministic). An unknown name or an
    /// empty store is `Error::Profile`.
    pub fn to_profile(&self, name: Option<&str>) -> Result<Profile> {
        let (store_name, entry) = match name {
            Some(name) => {
                let entry = self.store.get(name).ok_or_else(|| {
                    Error::Profile(format!(
                        "no schedule named {:?} in profile store (available: {:?})",
                        name,
                        self.store.keys().collect::<Vec<_>>()
                    ))
                })?;
                (name, entry)
            }
            None => self
                .store
                .iter()
                .next()
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| Error::Profile("profile store is empty".into()))?,
        };

        tracing::debug!("Using basal schedule {:?}", store_name);

        let basal_schedule = entry
            .basal
            .iter()
            .map(|e| BasalEntry::new(e.time_as_seconds as u32, e.value))
            .collect();

        Ok(Profile {
            utc_offset_minutes: self.utc_offset,
            basal_schedule,
        })
    }
}

/// Load Nightscout profile documents from a JSON file.
pub fn load_profiles(path: &Path) -> Result<Vec<ProfileDocument>> {
    let contents = std::fs::read_to_string(path)?;
    let profiles: Vec<ProfileDocument> = serde_json::from_str(&contents)?;
    tracing::debug!("Loaded {} profile documents from {:?}", profiles.len(), path);
    Ok(profiles)
}

// ============================================================================
// Treatment Documents
// ============================================================================

/// Treatment record in Nightscout export shape.
#[derive(Debug, Deserialize)]
struct RawTreatment {
    #[serde(default, deserialize_with = "de_millis")]
    date: Option<i64>,
    #[serde(rename = "durationInMilliseconds", default)]
    duration_in_milliseconds: Option<i64>,
    #[serde(default)]
    insulin: Option<f64>,
    #[serde(default)]
    rate: Option<f64>,
}

impl From<RawTreatment> for Treatment {
    fn from(raw: RawTreatment) -> Self {
        Treatment {
            timestamp_ms: raw.date,
            duration_ms: raw.duration_in_milliseconds,
            insulin: raw.insulin,
            rate: raw.rate,
        }
    }
}

/// Load Nightscout treatment records from a JSON file.
///
/// Records that fail to parse are logged with a warning and skipped;
/// corrupt rows must not abort aggregation.
pub fn load_treatments(path: &Path) -> Result<Vec<Treatment>> {
    let contents = std::fs::read_to_string(path)?;
    let records: Vec<Value> = serde_json::from_str(&contents)?;

    let mut treatments = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<RawTreatment>(record) {
            Ok(raw) => treatments.push(Treatment::from(raw)),
            Err(e) => {
                tracing::warn!("Skipping treatment record {}: {}", index, e);
            }
        }
    }

    tracing::debug!("Loaded {} treatments from {:?}", treatments.len(), path);
    Ok(treatments)
}

/// Tolerant millisecond-date deserializer.
///
/// Understands plain numbers, numeric strings, ISO-8601 strings and Mongo
/// extended JSON. Anything else maps to `None` rather than an error.
fn de_millis<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(millis_from_value))
}

fn millis_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok().or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.timestamp_millis())
        }),
        Value::Object(map) => map.get("$numberLong").and_then(millis_from_value),
        _ => None,
    }
}
