//! Grouping records by the day they were completed.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::record::Record;

/// Participants active on each day, one entry per record.
///
/// Days with no records are absent; [`DailyIndex::participants_on`] treats
/// them as empty.
#[derive(Debug, Clone, Default)]
pub struct DailyIndex<'a> {
    days: HashMap<NaiveDate, Vec<&'a str>>,
}

impl<'a> DailyIndex<'a> {
    /// Group records by date. Input need not be sorted; duplicates are kept.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut days: HashMap<NaiveDate, Vec<&'a str>> = HashMap::new();
        for record in records {
            days.entry(record.date())
                .or_default()
                .push(record.participant());
        }
        Self { days }
    }

    /// Participants with a record on `date`, in input order.
    #[must_use]
    pub fn participants_on(&self, date: NaiveDate) -> &[&'a str] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct days holding at least one record.
    #[must_use]
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
