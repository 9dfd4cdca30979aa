//! Classify every configured cohort and report the daily looper counts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use loopers_core::{CohortResults, ReportFormat};
use tracing::info;

use super::cache::{format_day, load_pools};
use crate::config::ConfigLoader;

/// Run arguments.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Write the daily counts of every cohort to PATH, or to the data
    /// directory when no path is given
    #[arg(long, value_name = "PATH")]
    pub export: Option<Option<PathBuf>>,

    /// Export format (csv, json); guessed from the extension when omitted
    #[arg(long, value_parser = parse_format)]
    pub format: Option<ReportFormat>,

    /// Also show the counts of the last N days of the range
    #[arg(long, value_name = "N")]
    pub last: Option<usize>,
}

fn parse_format(s: &str) -> std::result::Result<ReportFormat, String> {
    ReportFormat::parse(s).ok_or_else(|| format!("unknown format '{s}' (expected csv or json)"))
}

/// Run the configured cohort plan.
pub fn run(args: RunArgs, explicit: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(explicit)?;
    let range = config.date_range()?;
    let pools = load_pools(&config)?;

    let results = config.plan().run(&pools, range)?;
    info!(cohorts = results.len(), days = range.len(), "plan finished");

    println!("{}", results_table(&results, args.last.unwrap_or(0)));

    if let Some(path) = args.export {
        let (path, format) = export_target(path, args.format);
        results
            .report()
            .save(&path, format)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {} report to {}", format.as_str(), path.display());
    }
    Ok(())
}

/// Explicit format, else the file extension, else CSV.
fn export_format(path: &Path, explicit: Option<ReportFormat>) -> ReportFormat {
    explicit
        .or_else(|| ReportFormat::from_path(path))
        .unwrap_or(ReportFormat::Csv)
}

fn export_target(path: Option<PathBuf>, explicit: Option<ReportFormat>) -> (PathBuf, ReportFormat) {
    match path {
        Some(path) => {
            let format = export_format(&path, explicit);
            (path, format)
        }
        None => {
            let format = explicit.unwrap_or(ReportFormat::Csv);
            let file = format!("loopers.{}", format.as_str());
            (loopers_paths::data_dir().join(file), format)
        }
    }
}

fn results_table(results: &CohortResults, last: usize) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let days: Vec<NaiveDate> = results.range().days().collect();
    let tail_days = &days[days.len().saturating_sub(last)..];

    let mut header = vec![
        Cell::new("Cohort").fg(Color::Cyan),
        Cell::new("Loopers").fg(Color::Cyan),
        Cell::new("Peak").fg(Color::Cyan),
        Cell::new("Peak date").fg(Color::Cyan),
        Cell::new("Latest").fg(Color::Cyan),
        Cell::new("Mean/day").fg(Color::Cyan),
    ];
    header.extend(
        tail_days
            .iter()
            .map(|day| Cell::new(day.format("%m-%d")).fg(Color::Cyan)),
    );
    table.set_header(header);

    for (name, sets) in results.iter() {
        let counts = sets.counts();
        let peak = counts.peak();
        let mut row = vec![
            Cell::new(name),
            count_cell(sets.participants().len()),
            count_cell(peak.map_or(0, |(_, count)| count)),
            Cell::new(format_day(peak.map(|(day, _)| day))),
            count_cell(counts.latest().map_or(0, |(_, count)| count)),
            Cell::new(format!("{:.1}", counts.mean())).set_alignment(CellAlignment::Right),
        ];
        row.extend(
            counts
                .tail(tail_days.len())
                .into_iter()
                .map(|(_, count)| count_cell(count)),
        );
        table.add_row(row);
    }

    table
}

fn count_cell(count: usize) -> Cell {
    Cell::new(count).set_alignment(CellAlignment::Right)
}
