//! Looper detection for recurring online events.
//!
//! A *looper* is a participant who completes runs often enough that, within a
//! sliding window of days, their run count meets a threshold. This crate
//! classifies loopers for every day of a multi-year range and combines the
//! resulting per-day sets into composite cohorts.
//!
//! # Architecture
//!
//! - **Records** ([`Record`]) are immutable activity events, grouped into
//!   named [`RecordPools`] that are cached on disk as raw data only.
//! - **Classification** ([`find_loopers`]) builds a [`DailyIndex`] and slides a
//!   `2 * radius + 1` day window across a [`DateRange`], producing
//!   [`LooperSets`].
//! - **Combinators** ([`overlap`], [`remove`]) derive new mappings per day.
//! - **Plans** ([`CohortPlan`]) declare cohorts and composites; running one
//!   yields [`CohortResults`], whose [`Report`] is handed to charting.

mod classifier;
mod cohort;
mod combine;
mod error;
mod filter;
mod index;
mod looper_set;
mod pools;
mod range;
mod record;
mod report;
mod series;
mod snapshot;

// Classification
pub use classifier::{DEFAULT_THRESHOLD, DEFAULT_WINDOW_RADIUS, WindowParams, find_loopers};
pub use index::DailyIndex;

// Set algebra
pub use combine::{Combinator, overlap, remove};
pub use looper_set::LooperSets;

// Records
pub use filter::RecordFilter;
pub use pools::{CACHE_VERSION, ImportMode, RecordPools};
pub use record::{RawRecord, Record, UNCATEGORIZED_SENTINEL, parse_rows};

// Cohorts
pub use cohort::{CohortDefinition, CohortPlan, CohortResults, CompositeDefinition};
pub use snapshot::{Snapshot, SnapshotRow};

// Reporting
pub use report::{NamedSeries, Report, ReportFormat};
pub use series::DailySeries;

// Dates
pub use range::{DEFAULT_HISTORY_END, DateRange, HISTORY_START};

// Errors
pub use error::{LooperError, Result};
