//! TOML configuration: file format and loader.

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, default_config_path, default_store_path};
pub use types::{ActivitySettings, ConfigFile, LoggingConfig, ResolvedConfig, StoreSettings};
