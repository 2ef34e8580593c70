use activitylog_core::config::loader::{ConfigLoader, default_config_path};
use std::path::Path;

use crate::logging;

pub fn run(config: Option<&Path>) {
    match ConfigLoader::load(config) {
        Ok(rc) => {
            logging::init(&rc);
            println!("OK   actlog doctor");
            println!(
                "path: {}",
                config.map_or_else(
                    || default_config_path().display().to_string(),
                    |p| p.display().to_string()
                )
            );
            println!("store: {}", rc.store_path.display());
            println!("activity.default_log_name: {}", rc.activity.default_log_name);
            println!("activity.collection: {}", rc.activity.collection);
            println!("activity.retention_days: {}", rc.activity.retention_days);
            if rc.models.is_empty() {
                println!("models: (none)");
            }
            for (kind, collection) in &rc.models {
                println!("models.{}: {}", kind, collection);
            }
            println!("logging.level: {}", rc.logging.level);
        }
        Err(e) => {
            println!("FAIL actlog doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
