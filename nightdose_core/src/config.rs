//! Configuration file support for Nightdose.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/nightdose/config.toml`.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Data file locations
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_profile_file")]
    pub profile_file: String,

    #[serde(default = "default_treatments_file")]
    pub treatments_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            profile_file: default_profile_file(),
            treatments_file: default_treatments_file(),
        }
    }
}

/// Profile selection configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    /// Named schedule to use from the profile store. When unset, the
    /// first store entry is used.
    #[serde(default)]
    pub store_name: Option<String>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("nightdose")
}

fn default_profile_file() -> String {
    "profile.json".into()
}

fn default_treatments_file() -> String {
    "treatments.json".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("nightdose").join("config.toml")
    }

    /// Resolve the profile JSON path against a data directory
    pub fn profile_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.data.profile_file)
    }

    /// Resolve the treatments JSON path against a data directory
    pub fn treatments_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.data.treatments_file)
    }
}
