use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

use context::Context;

#[derive(Parser)]
#[command(name = "taskweave", version, about = "Keep Google Tasks and Google Calendar in step")]
struct Cli {
    /// Use this directory for config.toml and state.json
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every flow: calendar -> tasks, inbox -> lists, tasks -> calendar
    Run,
    /// Run a single synchronization flow
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// Place unscheduled tasks on the calendar
    Schedule {
        /// Print the placements without creating events or touching tasks
        #[arg(long)]
        dry_run: bool,
    },
    /// Inspect or edit the task/event links
    State {
        #[command(subcommand)]
        action: commands::state::StateAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Credential management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Show task lists and the role each one plays
    Lists,
    /// Estimate travel minutes between two places
    Travel {
        from: String,
        to: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "taskweave=debug" } else { "taskweave=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = Context::new(cli.data_dir).and_then(|ctx| match cli.command {
        Commands::Run => commands::run::run(&ctx),
        Commands::Sync { action } => commands::sync::run(&ctx, action),
        Commands::Schedule { dry_run } => commands::schedule::run(&ctx, dry_run),
        Commands::State { action } => commands::state::run(&ctx, action),
        Commands::Config { action } => commands::config::run(&ctx, action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Lists => commands::lists::run(&ctx),
        Commands::Travel { from, to } => commands::travel::run(&ctx, &from, &to),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
