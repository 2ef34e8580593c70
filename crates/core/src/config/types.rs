use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    #[serde(default)]
    pub activity: ActivitySettings,
    #[serde(default)]
    pub store: StoreSettings,
    /// Entity kinds that may appear as subject or causer, mapped to the
    /// collection they are stored in.
    #[serde(default)]
    pub models: BTreeMap<String, String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the activity collection.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ActivitySettings {
    /// Log name given to records that do not pick one (default: "default")
    #[serde(default = "default_log_name")]
    pub default_log_name: String,
    /// Collection activity documents are stored in (default: "activities")
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Days to keep activities before `clean` prunes them (default: 365)
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for ActivitySettings {
    fn default() -> Self {
        Self {
            default_log_name: default_log_name(),
            collection: default_collection(),
            retention_days: default_retention_days(),
        }
    }
}

fn default_log_name() -> String {
    "default".to_string()
}

fn default_collection() -> String {
    "activities".to_string()
}

fn default_retention_days() -> u32 {
    365
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StoreSettings {
    /// SQLite database file. Supports `~`, environment variables and
    /// `{{config_dir}}`.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Directory holding the loaded config file.
    pub config_dir: Option<PathBuf>,
    pub activity: ActivitySettings,
    pub store_path: PathBuf,
    pub models: BTreeMap<String, String>,
    pub logging: LoggingConfig,
}
