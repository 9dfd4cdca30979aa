//! Calendar ranges that looper mappings are defined over.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{LooperError, Result};

/// First day of recorded history.
pub const HISTORY_START: NaiveDate = ymd(2007, 7, 1);

/// Exclusive end of the range used by the historical report.
pub const DEFAULT_HISTORY_END: NaiveDate = ymd(2022, 8, 8);

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar constant"),
    }
}

/// A contiguous run of calendar days.
///
/// Uses a half-open interval `[start, end)` - start is inclusive, end is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting a start that falls after the end.
    ///
    /// `start == end` is a valid, empty range.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(LooperError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day in the range.
    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day after the range.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered.
    #[must_use]
    pub fn len(&self) -> usize {
        // start <= end is guaranteed by the constructor
        (self.end - self.start).num_days() as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if the given day falls within this range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Every day in the range, in calendar order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day < end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
