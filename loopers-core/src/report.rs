//! Named daily series over one range, exported for charting.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::range::DateRange;
use crate::series::DailySeries;

/// Export format for a [`Report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// One column per series, one row per day
    Csv,
    /// The serialized report
    Json,
}

impl ReportFormat {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Guess the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }
}

/// A series with the cohort name it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedSeries {
    pub name: String,
    pub counts: DailySeries,
}

/// Daily counts for several cohorts over the same range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    range: DateRange,
    series: Vec<NamedSeries>,
}

impl Report {
    #[must_use]
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            series: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, counts: DailySeries) {
        self.series.push(NamedSeries {
            name: name.into(),
            counts,
        });
    }

    #[must_use]
    pub fn range(&self) -> DateRange {
        self.range
    }

    #[must_use]
    pub fn series(&self) -> &[NamedSeries] {
        &self.series
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// `date,<name>...` header followed by one row per day of the range.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        let header: Vec<String> = std::iter::once("date".to_string())
            .chain(self.series.iter().map(|s| csv_field(&s.name)))
            .collect();
        writeln!(writer, "{}", header.join(","))?;

        for day in self.range.days() {
            let mut row = vec![day.format("%Y-%m-%d").to_string()];
            row.extend(
                self.series
                    .iter()
                    .map(|s| s.counts.get(day).unwrap_or(0).to_string()),
            );
            writeln!(writer, "{}", row.join(","))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the report to `path`, creating parent directories.
    pub fn save(&self, path: &Path, format: ReportFormat) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        match format {
            ReportFormat::Csv => self.write_csv(writer),
            ReportFormat::Json => self.write_json(writer),
        }
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
