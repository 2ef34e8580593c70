//! List command implementation.

use std::path::Path;

use activitylog_core::activity::fields;
use activitylog_core::store::DocumentQuery;

use super::common::{load_config, open_log};
use super::output::{print_activities_json, print_activities_table};
use crate::ListArgs;

pub fn run(config: Option<&Path>, args: ListArgs) {
    let rc = load_config(config);
    let log = open_log(&rc);

    let mut query = DocumentQuery::new().newest_first();
    if let Some(name) = &args.log_name {
        query = query.filter(fields::LOG_NAME, name.as_str());
    }
    if let Some(on) = &args.on {
        query = query
            .filter(fields::SUBJECT_TYPE, on.kind.as_str())
            .filter(fields::SUBJECT_ID, on.id.as_str());
    }
    if let Some(by) = &args.by {
        query = query
            .filter(fields::CAUSER_TYPE, by.kind.as_str())
            .filter(fields::CAUSER_ID, by.id.as_str());
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }

    let activities = match log.find(&query) {
        Ok(activities) => activities,
        Err(e) => {
            eprintln!("Error querying activities: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        print_activities_json(&activities);
    } else {
        print_activities_table(&activities);
    }
}
