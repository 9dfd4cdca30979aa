//! Record cache commands.
//!
//! The cache holds raw records only, grouped by pool. Importing replaces a
//! pool unless `--append` is given; derived looper sets are recomputed on
//! every `run`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use loopers_core::{ImportMode, RawRecord, RecordPools};
use tracing::warn;

use crate::config::{ConfigLoader, LoopersConfig};

/// Cache management arguments.
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

/// Cache subcommands.
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Import fetched rows (a JSON array) into a pool
    Import {
        /// Pool to import into (e.g. casual, normal, hardcore)
        #[arg(long)]
        pool: String,

        /// Keep the pool's cached records instead of replacing them
        #[arg(long)]
        append: bool,

        /// JSON file of {participant, date, magnitude, category} rows
        file: PathBuf,
    },
    /// Show pools and their record counts
    Show,
    /// Show the cache file path
    Path,
}

/// Run cache command.
pub fn run(args: CacheArgs, explicit: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(explicit)?;
    match args.command {
        CacheCommands::Import { pool, append, file } => {
            let mode = if append {
                ImportMode::Append
            } else {
                ImportMode::Replace
            };
            import(&config, &pool, &file, mode)
        }
        CacheCommands::Show => show(&config),
        CacheCommands::Path => {
            println!("{}", config.cache.records_path.display());
            Ok(())
        }
    }
}

/// Load the record cache, failing with a hint when nothing was imported yet.
pub(crate) fn load_pools(config: &LoopersConfig) -> Result<RecordPools> {
    let path = &config.cache.records_path;
    let pools = RecordPools::load(path)
        .with_context(|| format!("Failed to load record cache {}", path.display()))?;
    if pools.is_empty() {
        bail!(
            "No records cached at {}. Import some with `loopers cache import --pool NAME FILE`.",
            path.display()
        );
    }
    Ok(pools)
}

fn read_rows(file: &Path) -> Result<Vec<RawRecord>> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of rows", file.display()))
}

fn import(config: &LoopersConfig, pool: &str, file: &Path, mode: ImportMode) -> Result<()> {
    let rows = read_rows(file)?;
    let path = &config.cache.records_path;
    let mut pools = RecordPools::load(path)
        .with_context(|| format!("Failed to load record cache {}", path.display()))?;

    let (imported, dropped) = pools.import_rows(pool, rows, mode);
    pools.save(path)?;

    if dropped > 0 {
        warn!(pool, dropped, "some rows could not be parsed");
    }
    println!(
        "Imported {} records into pool '{}' ({} dropped)",
        imported, pool, dropped
    );
    Ok(())
}

fn show(config: &LoopersConfig) -> Result<()> {
    let pools = load_pools(config)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Pool").fg(Color::Cyan),
        Cell::new("Records").fg(Color::Cyan),
        Cell::new("First").fg(Color::Cyan),
        Cell::new("Last").fg(Color::Cyan),
    ]);

    for (name, count) in pools.summary() {
        let records = pools.pool(name)?;
        let first = records.iter().map(|r| r.date()).min();
        let last = records.iter().map(|r| r.date()).max();
        table.add_row(vec![
            Cell::new(name),
            Cell::new(count).set_alignment(CellAlignment::Right),
            Cell::new(format_day(first)),
            Cell::new(format_day(last)),
        ]);
    }

    println!("{table}");
    println!(
        "{} records in {}",
        pools.record_count(),
        config.cache.records_path.display()
    );
    Ok(())
}

pub(crate) fn format_day(day: Option<chrono::NaiveDate>) -> String {
    day.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}
