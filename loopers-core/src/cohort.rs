//! Declarative cohort definitions and the driver that evaluates them.
//!
//! A plan lists base cohorts (record pools, a category filter and window
//! parameters) and composite cohorts built from earlier entries with a
//! [`Combinator`]. Entries are evaluated in declaration order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::{DEFAULT_THRESHOLD, DEFAULT_WINDOW_RADIUS, WindowParams, find_loopers};
use crate::combine::Combinator;
use crate::error::{LooperError, Result};
use crate::filter::RecordFilter;
use crate::looper_set::LooperSets;
use crate::pools::RecordPools;
use crate::range::DateRange;
use crate::report::Report;

fn default_radius() -> i64 {
    i64::from(DEFAULT_WINDOW_RADIUS)
}

fn default_threshold() -> i64 {
    i64::from(DEFAULT_THRESHOLD)
}

/// A cohort classified directly from records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortDefinition {
    /// Unique name within the plan
    pub name: String,

    /// Record pools whose union feeds the classifier
    pub pools: Vec<String>,

    /// Category filter applied to the pooled records
    #[serde(default)]
    pub filter: RecordFilter,

    /// Days either side of each day
    #[serde(default = "default_radius")]
    pub window_radius: i64,

    /// Records needed within the window
    #[serde(default = "default_threshold")]
    pub threshold: i64,
}

impl CohortDefinition {
    /// Create a cohort over `pools` with the default window.
    #[must_use]
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        pools: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            pools: pools.into_iter().map(Into::into).collect(),
            filter: RecordFilter::Any,
            window_radius: default_radius(),
            threshold: default_threshold(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_window(mut self, radius: i64, threshold: i64) -> Self {
        self.window_radius = radius;
        self.threshold = threshold;
        self
    }

    /// Validated window parameters.
    pub fn params(&self) -> Result<WindowParams> {
        WindowParams::new(self.window_radius, self.threshold)
    }
}

/// A cohort derived from two earlier entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDefinition {
    pub name: String,
    pub op: Combinator,
    pub left: String,
    pub right: String,
}

impl CompositeDefinition {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        op: Combinator,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            op,
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Ordered base and composite cohort definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortPlan {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cohorts: Vec<CohortDefinition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composites: Vec<CompositeDefinition>,
}

impl CohortPlan {
    /// The report the tool was first written for: four-in-seven-day loopers
    /// of two challenge paths, and of each path together with casual runs.
    #[must_use]
    pub fn historical() -> Self {
        let paths = ["normal", "hardcore"];
        Self {
            cohorts: vec![
                CohortDefinition::new("casual", ["casual"]),
                CohortDefinition::new("community-service", paths)
                    .with_filter(RecordFilter::Category("Community Service".into())),
                CohortDefinition::new("grey-you", paths)
                    .with_filter(RecordFilter::Category("Grey You".into())),
            ],
            composites: vec![
                CompositeDefinition::new(
                    "community-service&casual",
                    Combinator::Overlap,
                    "casual",
                    "community-service",
                ),
                CompositeDefinition::new(
                    "grey-you&casual",
                    Combinator::Overlap,
                    "casual",
                    "grey-you",
                ),
            ],
        }
    }

    /// Check names are unique, composites only reference earlier entries,
    /// and every window is valid.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();

        for cohort in &self.cohorts {
            cohort.params()?;
            if !seen.insert(cohort.name.as_str()) {
                return Err(LooperError::DuplicateCohort(cohort.name.clone()));
            }
        }

        for composite in &self.composites {
            for operand in [&composite.left, &composite.right] {
                if !seen.contains(operand.as_str()) {
                    return Err(LooperError::UnknownCohort(operand.clone()));
                }
            }
            if !seen.insert(composite.name.as_str()) {
                return Err(LooperError::DuplicateCohort(composite.name.clone()));
            }
        }

        Ok(())
    }

    /// Evaluate every entry over `range`.
    pub fn run(&self, pools: &RecordPools, range: DateRange) -> Result<CohortResults> {
        self.validate()?;
        let mut results = CohortResults::new(range);

        for cohort in &self.cohorts {
            let params = cohort.params()?;
            let pooled = pools.select(cohort.pools.as_slice())?;
            let pooled_count = pooled.len();
            let loopers = find_loopers(cohort.filter.select(pooled), range, params);
            info!(
                cohort = %cohort.name,
                filter = %cohort.filter,
                records = pooled_count,
                loopers = loopers.participants().len(),
                "classified cohort"
            );
            results.push(cohort.name.clone(), loopers);
        }

        for composite in &self.composites {
            let left = results.require(&composite.left)?;
            let right = results.require(&composite.right)?;
            let combined = composite.op.apply(left, right)?;
            debug!(
                cohort = %composite.name,
                op = composite.op.as_str(),
                left = %composite.left,
                right = %composite.right,
                "combined cohort"
            );
            results.push(composite.name.clone(), combined);
        }

        Ok(results)
    }
}

/// Looper sets for each plan entry, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortResults {
    range: DateRange,
    entries: Vec<(String, LooperSets)>,
}

impl CohortResults {
    fn new(range: DateRange) -> Self {
        Self {
            range,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, name: String, sets: LooperSets) {
        self.entries.push((name, sets));
    }

    fn require(&self, name: &str) -> Result<&LooperSets> {
        self.get(name)
            .ok_or_else(|| LooperError::UnknownCohort(name.to_string()))
    }

    #[must_use]
    pub fn range(&self) -> DateRange {
        self.range
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LooperSets> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, sets)| sets)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LooperSets)> {
        self.entries.iter().map(|(name, sets)| (name.as_str(), sets))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Daily counts for every entry.
    #[must_use]
    pub fn report(&self) -> Report {
        let mut report = Report::new(self.range);
        for (name, sets) in self.iter() {
            report.push(name, sets.counts());
        }
        report
    }
}
