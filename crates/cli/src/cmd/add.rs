//! Add command: create an entity document.

use std::path::Path;

use serde_json::Map;
use tracing::info;

use super::common::{load_config, open_log};
use crate::AddArgs;

pub fn run(config: Option<&Path>, args: AddArgs) {
    let rc = load_config(config);
    let log = open_log(&rc);

    let model = match log.model(&args.kind) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Hint: register the kind under [models] in the config file.");
            std::process::exit(1);
        }
    };

    let fields: Map<_, _> = args.fields.into_iter().collect();
    match model.create(fields) {
        Ok(doc) => {
            let id = doc.id.map(|id| id.to_string()).unwrap_or_default();
            info!(kind = %args.kind, id = %id, "entity created");
            println!("{}", id);
        }
        Err(e) => {
            eprintln!("Error saving {}: {}", args.kind, e);
            std::process::exit(1);
        }
    }
}
