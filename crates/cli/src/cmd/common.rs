//! Helpers shared by the commands: config, store and argument parsing.

use std::fs;
use std::path::Path;

use activitylog_core::activity::{ActivityLog, ActivityLogOptions};
use activitylog_core::config::loader::ConfigLoader;
use activitylog_core::config::types::ResolvedConfig;
use activitylog_core::models::ModelRegistry;
use activitylog_core::store::{Document, DocumentId, SqliteStore};
use serde_json::Value;

use crate::logging;

/// `KIND:ID` reference given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityArg {
    pub kind: String,
    pub id: String,
}

/// Load config and start logging, exiting on failure.
pub fn load_config(config: Option<&Path>) -> ResolvedConfig {
    let rc = match ConfigLoader::load(config) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(&rc);
    rc
}

/// Open the activity log on the configured SQLite store.
pub fn open_log(rc: &ResolvedConfig) -> ActivityLog<SqliteStore> {
    if let Some(parent) = rc.store_path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = fs::create_dir_all(parent)
    {
        eprintln!("Error creating {}: {}", parent.display(), e);
        std::process::exit(1);
    }

    let store = match SqliteStore::open(&rc.store_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening store {}: {}", rc.store_path.display(), e);
            std::process::exit(1);
        }
    };

    let registry = match ModelRegistry::from_collections(&rc.models) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error in [models]: {}", e);
            std::process::exit(1);
        }
    };

    match ActivityLog::new(store, registry, ActivityLogOptions::from(&rc.activity)) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Error registering activity log: {}", e);
            std::process::exit(1);
        }
    }
}

/// Fetch the entity a `KIND:ID` argument points at, exiting if it is unknown.
pub fn fetch_entity(log: &ActivityLog<SqliteStore>, entity: &EntityArg) -> Document {
    let model = match log.model(&entity.kind) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match model.find_by_id(&DocumentId::from(entity.id.as_str())) {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            eprintln!("Error: no {} with id {}", entity.kind, entity.id);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error reading {}: {}", entity.kind, e);
            std::process::exit(1);
        }
    }
}

/// Parse `key=value`. The value is read as JSON when it parses, otherwise
/// kept as a string.
pub fn parse_pair(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s.split_once('=').ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Parse `KIND:ID`.
pub fn parse_entity_arg(s: &str) -> Result<EntityArg, String> {
    match s.split_once(':') {
        Some((kind, id)) if !kind.is_empty() && !id.is_empty() => {
            Ok(EntityArg { kind: kind.to_string(), id: id.to_string() })
        }
        _ => Err(format!("expected KIND:ID, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("ip=127.0.0.1").unwrap(), ("ip".into(), json!("127.0.0.1")));
        assert_eq!(parse_pair("count=3").unwrap(), ("count".into(), json!(3)));
        assert_eq!(parse_pair("tags=[\"a\"]").unwrap(), ("tags".into(), json!(["a"])));
        assert_eq!(parse_pair("note=a=b").unwrap(), ("note".into(), json!("a=b")));
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=1").is_err());
    }

    #[test]
    fn test_parse_entity_arg() {
        assert_eq!(
            parse_entity_arg("Post:abc").unwrap(),
            EntityArg { kind: "Post".into(), id: "abc".into() }
        );
        assert!(parse_entity_arg("Post").is_err());
        assert!(parse_entity_arg(":abc").is_err());
        assert!(parse_entity_arg("Post:").is_err());
    }
}
