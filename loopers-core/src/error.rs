//! Error types for looper detection.

use chrono::NaiveDate;
use thiserror::Error;

use crate::range::DateRange;

/// Result type for looper detection operations.
pub type Result<T> = std::result::Result<T, LooperError>;

/// Errors that can occur while classifying or combining looper sets.
#[derive(Debug, Error)]
pub enum LooperError {
    /// Threshold must be a positive count.
    #[error("invalid threshold {0}: must be at least 1")]
    InvalidThreshold(i64),

    /// Window radius must be a non-negative number of days.
    #[error("invalid window radius {0}: must be zero or more days")]
    InvalidWindowRadius(i64),

    /// Range start falls after its end.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Combinator operands cover different date domains.
    #[error("date domain mismatch: {left} vs {right}")]
    DomainMismatch { left: DateRange, right: DateRange },

    /// A date was supplied outside the mapping's range.
    #[error("date {date} is outside {range}")]
    DateOutOfRange { date: NaiveDate, range: DateRange },

    /// An upstream row could not be turned into a record.
    #[error("cannot parse {field} from {value:?}: {reason}")]
    RecordParse {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A composite references a cohort that is not defined before it.
    #[error("unknown cohort: {0}")]
    UnknownCohort(String),

    /// Two plan entries share a name.
    #[error("duplicate cohort name: {0}")]
    DuplicateCohort(String),

    /// A cohort draws from a record pool that does not exist.
    #[error("unknown record pool: {0}")]
    UnknownPool(String),

    /// The record cache was written in a format this build cannot read.
    #[error("unsupported record cache version {found} (expected {expected})")]
    UnsupportedCacheVersion { found: u32, expected: u32 },

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
