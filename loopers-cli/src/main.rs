use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "loopers", about = "Find the participants who keep coming back")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra config file, layered over the user and project config
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the configured cohorts and print daily looper counts
    Run(commands::run::RunArgs),
    /// Count distinct participants per cohort in recent records
    Summary(commands::summary::SummaryArgs),
    /// Manage the raw record cache
    Cache(commands::cache::CacheArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let explicit = cli.config.as_deref();
    match cli.command {
        Commands::Run(args) => commands::run::run(args, explicit),
        Commands::Summary(args) => commands::summary::run(args, explicit),
        Commands::Cache(args) => commands::cache::run(args, explicit),
        Commands::Config(args) => commands::config::run(args, explicit),
    }
}
