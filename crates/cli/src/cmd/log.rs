//! Log command: record one activity.

use std::path::Path;

use activitylog_core::activity::ActivityRecord;

use super::common::{fetch_entity, load_config, open_log};
use crate::LogArgs;

pub fn run(config: Option<&Path>, args: LogArgs) {
    let rc = load_config(config);
    let log = open_log(&rc);

    let subject = args.on.as_ref().map(|e| fetch_entity(&log, e));
    let causer = args.by.as_ref().map(|e| fetch_entity(&log, e));

    let mut record = log.new_activity();
    if let Some(name) = args.log_name {
        record.use_log(name);
    }

    let built: Result<&mut ActivityRecord, _> = record
        .performed_on(subject.as_ref())
        .and_then(|r| r.caused_by(causer.as_ref()))
        .map(|r| {
            for (key, value) in args.properties {
                r.with_property(key, value);
            }
            r
        });

    let result = built.and_then(|r| r.log(&log, args.description));
    match result {
        Ok(record) => {
            let id = record.id().map(ToString::to_string).unwrap_or_default();
            println!("{}", id);
        }
        Err(e) => {
            eprintln!("Error logging activity: {}", e);
            std::process::exit(1);
        }
    }
}
