//! Show command: one activity with its subject and causer.

use std::path::Path;

use activitylog_core::store::DocumentId;

use super::common::{load_config, open_log};
use super::output::{print_activity_detail, print_activity_json};
use crate::ShowArgs;

pub fn run(config: Option<&Path>, args: ShowArgs) {
    let rc = load_config(config);
    let log = open_log(&rc);

    let activity = match log.find_by_id(&DocumentId::from(args.id.as_str())) {
        Ok(Some(activity)) => activity,
        Ok(None) => {
            eprintln!("Error: no activity with id {}", args.id);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error reading activity: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        print_activity_json(&activity);
    } else {
        print_activity_detail(&activity);
    }
}
