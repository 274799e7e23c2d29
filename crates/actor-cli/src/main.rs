mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{action::ActionSubcommand, config::ConfigSubcommand, index::IndexSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "actor",
    about = "Declare actions, validate their config, and record occurrences",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from config/actor.yaml or .git/)
    #[arg(long, global = true, env = "ACTOR_ROOT")]
    root: Option<PathBuf>,

    /// Config file (default: <root>/config/actor.yaml)
    #[arg(long, global = true, env = "ACTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default action config into the project
    Publish {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Validate the action config
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Inspect registered actions
    Action {
        #[command(subcommand)]
        subcommand: ActionSubcommand,
    },

    /// Record one occurrence of an action
    Record {
        /// Action name
        name: String,
        /// Occurrence type (required when the action has a type)
        #[arg(long = "type", value_name = "TYPE")]
        action_type: Option<String>,
        /// Timestamp in RFC 3339 (defaults to now when the action has a timestamp)
        #[arg(long)]
        at: Option<String>,
        /// Payload as JSON; anything that is not JSON is stored as a string
        #[arg(long)]
        payload: Option<String>,
    },

    /// Read back indexed occurrences
    Index {
        #[command(subcommand)]
        subcommand: IndexSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let config = root::resolve_config(&root, cli.config.as_deref());
    tracing::debug!(root = %root.display(), config = %config.display(), "resolved paths");

    let result = match cli.command {
        Commands::Publish { force } => cmd::publish::run(&config, force, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&config, subcommand, cli.json),
        Commands::Action { subcommand } => cmd::action::run(&config, subcommand, cli.json),
        Commands::Record {
            name,
            action_type,
            at,
            payload,
        } => cmd::record::run(
            &root,
            &config,
            &name,
            action_type.as_deref(),
            at.as_deref(),
            payload.as_deref(),
            cli.json,
        ),
        Commands::Index { subcommand } => cmd::index::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
