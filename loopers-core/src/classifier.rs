//! Sliding-window looper classification.
//!
//! A participant is a looper on day `d` when they have at least `threshold`
//! records dated within `[d - radius, d + radius]`. The window always spans
//! `2 * radius + 1` calendar days. Only records dated inside the range are
//! counted, so offset days before its start or past its end contribute
//! nothing.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::error::{LooperError, Result};
use crate::index::DailyIndex;
use crate::looper_set::LooperSets;
use crate::range::DateRange;
use crate::record::Record;

/// Default window radius: three days either side, a seven day window.
pub const DEFAULT_WINDOW_RADIUS: u32 = 3;

/// Default number of records required within the window.
pub const DEFAULT_THRESHOLD: u32 = 4;

/// Validated window radius and threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowParams {
    radius: u32,
    threshold: u32,
}

impl WindowParams {
    /// Validate a radius (days either side) and threshold (records needed).
    ///
    /// A negative radius or a threshold below one is rejected, never clamped.
    /// A radius wider than the whole calendar is rejected as well.
    pub fn new(radius: i64, threshold: i64) -> Result<Self> {
        if radius < 0 || radius > max_window_radius() {
            return Err(LooperError::InvalidWindowRadius(radius));
        }
        let radius =
            u32::try_from(radius).map_err(|_| LooperError::InvalidWindowRadius(radius))?;
        if threshold < 1 {
            return Err(LooperError::InvalidThreshold(threshold));
        }
        let threshold =
            u32::try_from(threshold).map_err(|_| LooperError::InvalidThreshold(threshold))?;
        Ok(Self { radius, threshold })
    }

    #[must_use]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Total days covered by one window.
    #[must_use]
    pub fn width(&self) -> u64 {
        2 * u64::from(self.radius) + 1
    }
}

/// Days between the first and last representable dates.
fn max_window_radius() -> i64 {
    (NaiveDate::MAX - NaiveDate::MIN).num_days()
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            radius: DEFAULT_WINDOW_RADIUS,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Classify loopers for every day of `range`.
///
/// The result has exactly one entry per day of the range and does not
/// depend on the order of `records`. Records dated outside the range are
/// ignored.
pub fn find_loopers<'a, I>(records: I, range: DateRange, params: WindowParams) -> LooperSets
where
    I: IntoIterator<Item = &'a Record>,
{
    let index = DailyIndex::build(
        records
            .into_iter()
            .filter(|record| range.contains(record.date())),
    );
    // Past the range length every window already covers the whole range.
    let radius = i64::from(params.radius).min(i64::try_from(range.len()).unwrap_or(i64::MAX));
    debug!(
        days = range.len(),
        radius = params.radius,
        window = params.width(),
        threshold = params.threshold,
        indexed_days = index.day_count(),
        "classifying loopers"
    );

    let mut days = BTreeMap::new();
    if range.is_empty() {
        return LooperSets::from_complete(range, days);
    }

    // Prime with [start - radius, start + radius - 1]; each step adds the
    // leading edge before classifying and drops the trailing edge after.
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for offset in -radius..radius {
        enter(&mut counts, &index, shift(range.start(), offset));
    }

    for day in range.days() {
        enter(&mut counts, &index, shift(day, radius));

        let loopers: BTreeSet<String> = counts
            .iter()
            .filter(|(_, count)| **count >= params.threshold)
            .map(|(participant, _)| (*participant).to_string())
            .collect();
        days.insert(day, loopers);

        leave(&mut counts, &index, shift(day, -radius));
    }

    LooperSets::from_complete(range, days)
}

/// `date + offset` days, or `None` past the ends of the calendar.
fn shift(date: NaiveDate, offset: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(offset))
}

fn enter<'a>(
    counts: &mut HashMap<&'a str, u32>,
    index: &DailyIndex<'a>,
    day: Option<NaiveDate>,
) {
    let Some(day) = day else {
        return;
    };
    for &participant in index.participants_on(day) {
        *counts.entry(participant).or_insert(0) += 1;
    }
}

fn leave<'a>(
    counts: &mut HashMap<&'a str, u32>,
    index: &DailyIndex<'a>,
    day: Option<NaiveDate>,
) {
    let Some(day) = day else {
        return;
    };
    for participant in index.participants_on(day) {
        if let Some(count) = counts.get_mut(participant) {
            *count -= 1;
            if *count == 0 {
                counts.remove(participant);
            }
        }
    }
}
