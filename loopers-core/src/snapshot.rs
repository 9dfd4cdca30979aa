//! Distinct-participant summaries over the most recent records.
//!
//! Unlike the windowed classifier this looks at one batch as a whole: who
//! completed a run in each cohort, and how many of them also appear in a
//! reference cohort.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::cohort::CohortDefinition;
use crate::error::{LooperError, Result};
use crate::pools::RecordPools;
use crate::record::Record;

/// One cohort's line in a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRow {
    pub name: String,
    /// Distinct participants in the cohort
    pub participants: usize,
    /// Of those, how many are also in the reference cohort
    pub also_in_reference: usize,
}

/// Participant counts per cohort over a batch of recent records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub reference: String,
    pub reference_participants: usize,
    pub records_considered: usize,
    pub rows: Vec<SnapshotRow>,
}

impl Snapshot {
    /// Summarize `cohorts` against the cohort named `reference`.
    ///
    /// With `latest = Some(n)` only the `n` most recent records across all
    /// pools are considered; records on the same day keep their pool order.
    /// Window parameters of the cohorts are ignored.
    pub fn of(
        pools: &RecordPools,
        cohorts: &[CohortDefinition],
        reference: &str,
        latest: Option<usize>,
    ) -> Result<Self> {
        for cohort in cohorts {
            for pool in &cohort.pools {
                pools.pool(pool)?;
            }
        }
        let reference_cohort = cohorts
            .iter()
            .find(|cohort| cohort.name == reference)
            .ok_or_else(|| LooperError::UnknownCohort(reference.to_string()))?;

        let mut batch: Vec<(&str, &Record)> = pools.tagged().collect();
        batch.sort_by(|a, b| b.1.date().cmp(&a.1.date()));
        if let Some(n) = latest {
            batch.truncate(n);
        }

        let reference_set = distinct_participants(&batch, reference_cohort);
        let rows = cohorts
            .iter()
            .filter(|cohort| cohort.name != reference)
            .map(|cohort| {
                let set = distinct_participants(&batch, cohort);
                SnapshotRow {
                    name: cohort.name.clone(),
                    participants: set.len(),
                    also_in_reference: set.intersection(&reference_set).count(),
                }
            })
            .collect();

        Ok(Self {
            reference: reference.to_string(),
            reference_participants: reference_set.len(),
            records_considered: batch.len(),
            rows,
        })
    }
}

fn distinct_participants<'a>(
    batch: &[(&str, &'a Record)],
    cohort: &CohortDefinition,
) -> BTreeSet<&'a str> {
    batch
        .iter()
        .filter(|(pool, record)| {
            cohort.pools.iter().any(|name| name == pool) && cohort.filter.matches(record)
        })
        .map(|(_, record)| record.participant())
        .collect()
}
