use chrono::NaiveDate;
use loopers_core::{
    CohortDefinition, CohortPlan, CompositeDefinition, DEFAULT_HISTORY_END, DateRange,
    HISTORY_START,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name of the record cache inside the cache directory
pub const RECORDS_FILE: &str = "records.json";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLoopersConfig {
    #[serde(default)]
    pub range: RawRangeConfig,

    #[serde(default)]
    pub cache: RawCacheConfig,

    /// Replaces the base list wholesale when set
    pub cohorts: Option<Vec<CohortDefinition>>,

    /// Replaces the base list wholesale when set
    pub composites: Option<Vec<CompositeDefinition>>,
}

/// Range config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRangeConfig {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCacheConfig {
    pub records_path: Option<PathBuf>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopersConfig {
    pub range: RangeConfig,

    pub cache: CacheConfig,

    #[serde(default)]
    pub cohorts: Vec<CohortDefinition>,

    #[serde(default)]
    pub composites: Vec<CompositeDefinition>,
}

impl Default for LoopersConfig {
    fn default() -> Self {
        let plan = CohortPlan::historical();
        Self {
            range: RangeConfig::default(),
            cache: CacheConfig::default(),
            cohorts: plan.cohorts,
            composites: plan.composites,
        }
    }
}

impl LoopersConfig {
    /// The configured range, validated.
    pub fn date_range(&self) -> loopers_core::Result<DateRange> {
        DateRange::new(self.range.start, self.range.end)
    }

    /// The configured cohorts and composites as a plan.
    pub fn plan(&self) -> CohortPlan {
        CohortPlan {
            cohorts: self.cohorts.clone(),
            composites: self.composites.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeConfig {
    /// First day classified
    pub start: NaiveDate,

    /// Day after the last day classified
    pub end: NaiveDate,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            start: HISTORY_START,
            end: DEFAULT_HISTORY_END,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// JSON file holding the imported record pools
    pub records_path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            records_path: loopers_paths::cache_dir().join(RECORDS_FILE),
        }
    }
}
