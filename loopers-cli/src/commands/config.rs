//! Inspect the layered configuration.

use crate::config::{ConfigLayer, ConfigLoader};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (merged, defaults applied)
    Show,
    /// Show configuration file paths in the order they are layered
    Path,
}

pub fn run(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(explicit),
        ConfigCommands::Path => {
            for layer in ConfigLoader::layers(explicit) {
                println!("{}", describe_layer(&layer));
            }
            Ok(())
        }
    }
}

fn show_config(explicit: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(explicit)?;
    for layer in ConfigLoader::layers(explicit) {
        if layer.path.exists() {
            println!("# from {} config: {}", layer.name, layer.path.display());
        }
    }
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn describe_layer(layer: &ConfigLayer) -> String {
    let status = if layer.path.exists() { "" } else { " (not found)" };
    let label = format!("{}{} config:", layer.name[..1].to_uppercase(), &layer.name[1..]);
    format!("{:<16}{}{}", label, layer.path.display(), status)
}
