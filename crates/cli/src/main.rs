mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use cmd::common::{EntityArg, parse_entity_arg, parse_pair};

#[derive(Debug, Parser)]
#[command(name = "actlog", version, about = "Record and browse who did what to which entity")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved settings
    Doctor,

    /// Create an entity that activities can point at
    Add(AddArgs),

    /// Record an activity
    Log(LogArgs),

    /// List activities, newest first
    List(ListArgs),

    /// Show a single activity with its subject and causer
    Show(ShowArgs),

    /// Delete activities older than the retention period
    Clean(CleanArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Entity kind, as registered under [models] (e.g. "Post")
    pub kind: String,

    /// Field to set, as key=value (JSON values accepted)
    #[arg(short = 'f', long = "field", value_parser = parse_pair)]
    pub fields: Vec<(String, Value)>,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// What happened
    pub description: String,

    /// Log name (defaults to activity.default_log_name)
    #[arg(long = "log")]
    pub log_name: Option<String>,

    /// Entity the activity was performed on, as KIND:ID
    #[arg(long, value_parser = parse_entity_arg)]
    pub on: Option<EntityArg>,

    /// Entity that caused the activity, as KIND:ID
    #[arg(long, value_parser = parse_entity_arg)]
    pub by: Option<EntityArg>,

    /// Extra property, as key=value (JSON values accepted)
    #[arg(short = 'p', long = "property", value_parser = parse_pair)]
    pub properties: Vec<(String, Value)>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only activities in this log
    #[arg(long = "log")]
    pub log_name: Option<String>,

    /// Only activities performed on this entity, as KIND:ID
    #[arg(long, value_parser = parse_entity_arg)]
    pub on: Option<EntityArg>,

    /// Only activities caused by this entity, as KIND:ID
    #[arg(long, value_parser = parse_entity_arg)]
    pub by: Option<EntityArg>,

    /// Maximum number of activities to show
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Activity id
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Delete activities older than this many days (defaults to activity.retention_days)
    #[arg(long)]
    pub days: Option<u32>,
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(config),
        Commands::Add(args) => cmd::add::run(config, args),
        Commands::Log(args) => cmd::log::run(config, args),
        Commands::List(args) => cmd::list::run(config, args),
        Commands::Show(args) => cmd::show::run(config, args),
        Commands::Clean(args) => cmd::clean::run(config, args),
    }
}
