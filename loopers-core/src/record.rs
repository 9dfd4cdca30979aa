//! Activity records and the upstream row shape they are parsed from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{LooperError, Result};

/// Category label upstream uses for runs that followed no named path.
pub const UNCATEGORIZED_SENTINEL: &str = "No path";

/// A single completed activity run.
///
/// Records are immutable once built. Several records may share the same
/// participant and date; each one counts separately toward frequency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    participant: String,
    date: NaiveDate,
    magnitude: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

impl Record {
    /// Build a record. An empty category is stored as uncategorized.
    #[must_use]
    pub fn new(
        participant: impl Into<String>,
        date: NaiveDate,
        magnitude: u64,
        category: Option<String>,
    ) -> Self {
        Self {
            participant: participant.into(),
            date,
            magnitude,
            category: normalize_category(category),
        }
    }

    #[must_use]
    pub fn participant(&self) -> &str {
        &self.participant
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Turns (or steps) taken. Descriptive only.
    #[must_use]
    pub fn magnitude(&self) -> u64 {
        self.magnitude
    }

    /// The named path, or `None` when uncategorized.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty() && label != UNCATEGORIZED_SENTINEL)
}

/// A row as handed over by the fetcher, before any parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub participant: String,
    /// ISO-8601 calendar date (`YYYY-MM-DD`).
    pub date: String,
    /// Integer, possibly with thousands separators.
    pub magnitude: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl TryFrom<RawRecord> for Record {
    type Error = LooperError;

    fn try_from(raw: RawRecord) -> Result<Self> {
        let participant = raw.participant.trim();
        if participant.is_empty() {
            return Err(LooperError::RecordParse {
                field: "participant",
                value: raw.participant,
                reason: "participant name is empty".into(),
            });
        }

        let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d").map_err(|e| {
            LooperError::RecordParse {
                field: "date",
                value: raw.date.clone(),
                reason: e.to_string(),
            }
        })?;

        let magnitude = raw
            .magnitude
            .trim()
            .replace(',', "")
            .parse::<u64>()
            .map_err(|e| LooperError::RecordParse {
                field: "magnitude",
                value: raw.magnitude.clone(),
                reason: e.to_string(),
            })?;

        Ok(Record::new(participant, date, magnitude, raw.category))
    }
}

/// Parse a batch of upstream rows, dropping the ones that do not parse.
///
/// Returns the parsed records and the number of rows dropped.
pub fn parse_rows(rows: impl IntoIterator<Item = RawRecord>) -> (Vec<Record>, usize) {
    let mut records = Vec::new();
    let mut dropped = 0;
    for row in rows {
        match Record::try_from(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                dropped += 1;
                tracing::debug!(error = %e, "dropping unparseable row");
            }
        }
    }
    if dropped > 0 {
        warn!(dropped, kept = records.len(), "dropped unparseable rows");
    }
    (records, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(participant: &str, date: &str, magnitude: &str, category: Option<&str>) -> RawRecord {
        RawRecord {
            participant: participant.to_string(),
            date: date.to_string(),
            magnitude: magnitude.to_string(),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn parses_well_formed_row() {
        let record = Record::try_from(raw(" Kasekopf ", "2022-08-01", "1,234", Some("Grey You")))
            .unwrap();

        assert_eq!(record.participant(), "Kasekopf");
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2022, 8, 1).unwrap());
        assert_eq!(record.magnitude(), 1234);
        assert_eq!(record.category(), Some("Grey You"));
    }

    #[test]
    fn sentinel_and_empty_categories_are_uncategorized() {
        let sentinel = Record::try_from(raw("a", "2022-08-01", "10", Some("No path"))).unwrap();
        let empty = Record::try_from(raw("a", "2022-08-01", "10", Some("  "))).unwrap();
        let missing = Record::try_from(raw("a", "2022-08-01", "10", None)).unwrap();

        assert_eq!(sentinel.category(), None);
        assert_eq!(empty.category(), None);
        assert_eq!(missing.category(), None);
    }

    #[test]
    fn bad_date_fails_fast() {
        let err = Record::try_from(raw("a", "08/01/2022", "10", None)).unwrap_err();
        assert!(matches!(err, LooperError::RecordParse { field: "date", .. }));
    }

    #[test]
    fn negative_magnitude_is_rejected() {
        let err = Record::try_from(raw("a", "2022-08-01", "-3", None)).unwrap_err();
        assert!(matches!(
            err,
            LooperError::RecordParse {
                field: "magnitude",
                ..
            }
        ));
    }

    #[test]
    fn blank_participant_is_rejected() {
        let err = Record::try_from(raw("   ", "2022-08-01", "3", None)).unwrap_err();
        assert!(matches!(
            err,
            LooperError::RecordParse {
                field: "participant",
                ..
            }
        ));
    }

    #[test]
    fn parse_rows_drops_bad_rows_and_keeps_duplicates() {
        let rows = vec![
            raw("a", "2022-08-01", "10", None),
            raw("a", "2022-08-01", "10", None),
            raw("b", "not a date", "10", None),
            raw("c", "2022-08-02", "many", None),
        ];

        let (records, dropped) = parse_rows(rows);

        assert_eq!(records.len(), 2);
        assert_eq!(dropped, 2);
        assert_eq!(records[0], records[1]);
    }

    #[test]
    fn record_serializes_date_as_iso_string() {
        let record = Record::new(
            "a",
            NaiveDate::from_ymd_opt(2020, 1, 4).unwrap(),
            7,
            Some("Community Service".into()),
        );
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("\"date\":\"2020-01-04\""));
        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
