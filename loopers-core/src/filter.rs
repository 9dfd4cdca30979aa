//! Category selection applied before classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Exact-match predicate on a record's category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecordFilter {
    /// Every record.
    #[default]
    Any,
    /// Records whose category equals this label.
    Category(String),
    /// Records with no category.
    Uncategorized,
}

impl RecordFilter {
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Any => true,
            Self::Category(label) => record.category() == Some(label.as_str()),
            Self::Uncategorized => record.category().is_none(),
        }
    }

    /// Matching records, duplicates and order preserved.
    pub fn select<'a, I>(&'a self, records: I) -> impl Iterator<Item = &'a Record> + 'a
    where
        I: IntoIterator<Item = &'a Record>,
        I::IntoIter: 'a,
    {
        records.into_iter().filter(move |record| self.matches(record))
    }
}

impl fmt::Display for RecordFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Category(label) => write!(f, "category = {label:?}"),
            Self::Uncategorized => write!(f, "uncategorized"),
        }
    }
}
