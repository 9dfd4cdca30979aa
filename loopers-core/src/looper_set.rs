//! Per-day looper sets over a fixed date range.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{LooperError, Result};
use crate::range::DateRange;
use crate::series::DailySeries;

/// Participants classified as loopers on each day of a range.
///
/// Every day of the range has an entry, possibly empty. Instances are never
/// modified after construction; combinators build new mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LooperSets {
    range: DateRange,
    days: BTreeMap<NaiveDate, BTreeSet<String>>,
}

impl LooperSets {
    /// A mapping with an empty set for every day of `range`.
    #[must_use]
    pub fn empty(range: DateRange) -> Self {
        let days = range.days().map(|day| (day, BTreeSet::new())).collect();
        Self { range, days }
    }

    /// Build a mapping from explicit per-day sets.
    ///
    /// Days of `range` missing from `days` get an empty set. A day outside
    /// `range` is rejected.
    pub fn from_days(
        range: DateRange,
        days: impl IntoIterator<Item = (NaiveDate, BTreeSet<String>)>,
    ) -> Result<Self> {
        let mut sets = Self::empty(range);
        for (date, participants) in days {
            match sets.days.get_mut(&date) {
                Some(slot) => slot.extend(participants),
                None => return Err(LooperError::DateOutOfRange { date, range }),
            }
        }
        Ok(sets)
    }

    /// Crate-internal constructor for callers that already cover every day.
    pub(crate) fn from_complete(
        range: DateRange,
        days: BTreeMap<NaiveDate, BTreeSet<String>>,
    ) -> Self {
        debug_assert_eq!(days.len(), range.len());
        Self { range, days }
    }

    #[must_use]
    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Loopers on `date`, or `None` if the date is outside the range.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&BTreeSet<String>> {
        self.days.get(&date)
    }

    /// Days and their sets in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &BTreeSet<String>)> {
        self.days.iter().map(|(day, set)| (*day, set))
    }

    /// Number of days in the mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Every participant that is a looper on at least one day.
    #[must_use]
    pub fn participants(&self) -> BTreeSet<&str> {
        self.days
            .values()
            .flat_map(|set| set.iter().map(String::as_str))
            .collect()
    }

    /// Per-day looper counts.
    #[must_use]
    pub fn counts(&self) -> DailySeries {
        DailySeries::from(self)
    }

    /// See [`crate::combine::overlap`].
    pub fn overlap(&self, other: &LooperSets) -> Result<LooperSets> {
        crate::combine::overlap(self, other)
    }

    /// See [`crate::combine::remove`].
    pub fn remove(&self, other: &LooperSets) -> Result<LooperSets> {
        crate::combine::remove(self, other)
    }
}
