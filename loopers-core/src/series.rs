//! Daily looper counts handed to reporting.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::looper_set::LooperSets;

/// Number of loopers per day, in calendar order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DailySeries {
    points: BTreeMap<NaiveDate, usize>,
}

impl From<&LooperSets> for DailySeries {
    fn from(sets: &LooperSets) -> Self {
        Self {
            points: sets.iter().map(|(day, set)| (day, set.len())).collect(),
        }
    }
}

impl DailySeries {
    /// Count on `date`, if the date is covered.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<usize> {
        self.points.get(&date).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, usize)> + '_ {
        self.points.iter().map(|(day, count)| (*day, *count))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Highest count and the first day it was reached.
    #[must_use]
    pub fn peak(&self) -> Option<(NaiveDate, usize)> {
        self.iter()
            .fold(None, |best: Option<(NaiveDate, usize)>, (day, count)| {
                match best {
                    Some((_, top)) if top >= count => best,
                    _ => Some((day, count)),
                }
            })
    }

    /// Count on the last covered day.
    #[must_use]
    pub fn latest(&self) -> Option<(NaiveDate, usize)> {
        self.points.iter().next_back().map(|(day, count)| (*day, *count))
    }

    /// The last `n` points, oldest first.
    #[must_use]
    pub fn tail(&self, n: usize) -> Vec<(NaiveDate, usize)> {
        let skip = self.points.len().saturating_sub(n);
        self.iter().skip(skip).collect()
    }

    /// Mean count per day; zero for an empty series.
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        let total: usize = self.points.values().sum();
        total as f64 / self.points.len() as f64
    }
}
