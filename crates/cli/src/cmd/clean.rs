//! Clean command: prune activities past the retention period.

use std::path::Path;

use super::common::{load_config, open_log};
use crate::CleanArgs;

pub fn run(config: Option<&Path>, args: CleanArgs) {
    let rc = load_config(config);
    let log = open_log(&rc);

    let days = args.days.unwrap_or(rc.activity.retention_days);
    match log.prune(days) {
        Ok(removed) => println!("Removed {} activities older than {} days", removed, days),
        Err(e) => {
            eprintln!("Error pruning activities: {}", e);
            std::process::exit(1);
        }
    }
}
