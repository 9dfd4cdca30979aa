//! Per-day set algebra over looper mappings.
//!
//! Both operands must cover the same date range; a mismatch is reported
//! instead of producing a partial result.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{LooperError, Result};
use crate::looper_set::LooperSets;

/// How a composite cohort combines its two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    /// Loopers in both operands.
    Overlap,
    /// Loopers in the left operand but not the right.
    Remove,
}

impl Combinator {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overlap => "overlap",
            Self::Remove => "remove",
        }
    }

    /// Apply to two mappings.
    pub fn apply(&self, left: &LooperSets, right: &LooperSets) -> Result<LooperSets> {
        match self {
            Self::Overlap => overlap(left, right),
            Self::Remove => remove(left, right),
        }
    }
}

/// Day by day `a ∩ b`.
pub fn overlap(a: &LooperSets, b: &LooperSets) -> Result<LooperSets> {
    zip_days(a, b, |left, right| left.intersection(right).cloned().collect())
}

/// Day by day `a − b`.
pub fn remove(a: &LooperSets, b: &LooperSets) -> Result<LooperSets> {
    zip_days(a, b, |left, right| left.difference(right).cloned().collect())
}

fn zip_days<F>(a: &LooperSets, b: &LooperSets, op: F) -> Result<LooperSets>
where
    F: Fn(&BTreeSet<String>, &BTreeSet<String>) -> BTreeSet<String>,
{
    if a.range() != b.range() {
        return Err(LooperError::DomainMismatch {
            left: a.range(),
            right: b.range(),
        });
    }

    let days = a
        .iter()
        .map(|(day, left)| {
            // Equal ranges imply equal key sets.
            let combined = match b.get(day) {
                Some(right) => op(left, right),
                None => op(left, &BTreeSet::new()),
            };
            (day, combined)
        })
        .collect();

    Ok(LooperSets::from_complete(a.range(), days))
}
