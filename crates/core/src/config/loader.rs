use std::path::{Path, PathBuf};
use std::{env, fs};

use dirs::{data_dir, home_dir};
use shellexpand::full;
use thiserror::Error;
use tracing::debug;

use crate::config::types::{ConfigFile, LoggingConfig, ResolvedConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(String),

    #[error("failed to read config file {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse TOML in {0}: {1}")]
    ParseError(String, #[source] toml::de::Error),

    #[error("version {0} is unsupported (expected 1)")]
    BadVersion(u32),

    #[error("home directory not available to expand '~'")]
    NoHome,

    #[error("activity.default_log_name must not be empty")]
    EmptyLogName,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(config_path: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let s = fs::read_to_string(&path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e))?;

        let cf: ConfigFile = toml::from_str(&s)
            .map_err(|e| ConfigError::ParseError(path.display().to_string(), e))?;

        debug!(path = %path.display(), "loaded config");
        Self::resolve(cf, path.parent())
    }

    /// Validate a parsed config and expand its paths. `config_dir` replaces
    /// `{{config_dir}}` in path settings.
    pub fn resolve(
        cf: ConfigFile,
        config_dir: Option<&Path>,
    ) -> Result<ResolvedConfig, ConfigError> {
        if cf.version != 1 {
            return Err(ConfigError::BadVersion(cf.version));
        }
        if cf.activity.default_log_name.trim().is_empty() {
            return Err(ConfigError::EmptyLogName);
        }

        let dir = config_dir.map(|d| d.to_string_lossy().into_owned()).unwrap_or_default();
        let sub = |s: &str| s.replace("{{config_dir}}", &dir);

        let store_path = match &cf.store.path {
            Some(p) => expand_path(&sub(p))?,
            None => default_store_path(),
        };

        let logging = match &cf.logging.file {
            Some(file) => LoggingConfig {
                file: Some(expand_path(&sub(&file.to_string_lossy()))?),
                ..cf.logging.clone()
            },
            None => cf.logging.clone(),
        };

        Ok(ResolvedConfig {
            config_dir: config_dir.map(Path::to_path_buf),
            activity: cf.activity,
            store_path,
            models: cf.models,
            logging,
        })
    }
}

pub fn default_config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("activitylog").join("config.toml");
    }
    let home = home_dir().unwrap_or_else(|| PathBuf::from("~"));
    home.join(".config").join("activitylog").join("config.toml")
}

/// Default SQLite file: `$XDG_DATA_HOME/activitylog/activity.db`, falling
/// back to the platform data directory.
pub fn default_store_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_DATA_HOME") {
        return Path::new(&xdg).join("activitylog").join("activity.db");
    }
    let base = data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("activitylog").join("activity.db")
}

fn expand_path(input: &str) -> Result<PathBuf, ConfigError> {
    let expanded = full(input).map_err(|_| ConfigError::NoHome)?;
    Ok(PathBuf::from(expanded.to_string()))
}
