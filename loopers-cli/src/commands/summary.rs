//! Distinct-participant summary of the most recent records.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use loopers_core::Snapshot;

use super::cache::load_pools;
use crate::config::ConfigLoader;

/// Summary arguments.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Cohort every other cohort is compared against
    #[arg(long, default_value = "casual")]
    pub reference: String,

    /// Only consider the N most recent records
    #[arg(long, value_name = "N")]
    pub latest: Option<usize>,
}

/// Run summary command.
pub fn run(args: SummaryArgs, explicit: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(explicit)?;
    let pools = load_pools(&config)?;

    let snapshot = Snapshot::of(&pools, &config.cohorts, &args.reference, args.latest)?;
    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &Snapshot) {
    println!(
        "{} records considered; {} participants in '{}'",
        snapshot.records_considered, snapshot.reference_participants, snapshot.reference
    );
    println!();

    if snapshot.rows.is_empty() {
        println!("No other cohorts configured.");
        return;
    }
    println!("{}", snapshot_table(snapshot));
}

fn snapshot_table(snapshot: &Snapshot) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Cohort").fg(Color::Cyan),
        Cell::new("Participants").fg(Color::Cyan),
        Cell::new(format!("Also in {}", snapshot.reference)).fg(Color::Cyan),
    ]);

    for row in &snapshot.rows {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(row.participants).set_alignment(CellAlignment::Right),
            Cell::new(row.also_in_reference).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
