//! Named record pools and their on-disk cache.
//!
//! Upstream serves each run type (casual, normal, hardcore) separately, so
//! records are kept in named pools. Only raw records are cached; derived
//! looper sets are always recomputed.
//!
//! A fresh fetch of a pool is the whole pool, so importing replaces by
//! default. Appending is opt-in.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LooperError, Result};
use crate::record::{RawRecord, Record, parse_rows};

/// Current version of the cache format
pub const CACHE_VERSION: u32 = 1;

/// Records grouped by the pool they were fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPools {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    pools: BTreeMap<String, Vec<Record>>,
}

/// How imported rows combine with a pool's existing records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Discard the pool's records first.
    #[default]
    Replace,
    /// Keep the pool's records and add the new ones after them.
    Append,
}

fn default_version() -> u32 {
    CACHE_VERSION
}

impl Default for RecordPools {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordPools {
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: CACHE_VERSION,
            pools: BTreeMap::new(),
        }
    }

    /// Load the cache at `path`. A missing file yields empty pools.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no record cache, starting empty");
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)?;
        let pools: Self = serde_json::from_str(&contents)?;
        if pools.version != CACHE_VERSION {
            return Err(LooperError::UnsupportedCacheVersion {
                found: pools.version,
                expected: CACHE_VERSION,
            });
        }
        info!(
            path = %path.display(),
            pools = pools.pools.len(),
            records = pools.record_count(),
            "loaded record cache"
        );
        Ok(pools)
    }

    /// Write the cache to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Append records to a pool, creating it if needed.
    pub fn extend(&mut self, pool: &str, records: impl IntoIterator<Item = Record>) {
        self.pools
            .entry(pool.to_string())
            .or_default()
            .extend(records);
    }

    /// Replace a pool's records, creating it if needed.
    pub fn replace(&mut self, pool: &str, records: impl IntoIterator<Item = Record>) {
        self.pools.insert(pool.to_string(), records.into_iter().collect());
    }

    /// Parse upstream rows into `pool`, dropping rows that do not parse.
    ///
    /// Returns `(imported, dropped)`.
    pub fn import_rows(
        &mut self,
        pool: &str,
        rows: impl IntoIterator<Item = RawRecord>,
        mode: ImportMode,
    ) -> (usize, usize) {
        let (records, dropped) = parse_rows(rows);
        let imported = records.len();
        match mode {
            ImportMode::Replace => self.replace(pool, records),
            ImportMode::Append => self.extend(pool, records),
        }
        info!(pool, imported, dropped, ?mode, "imported rows");
        (imported, dropped)
    }

    /// Records of a single pool.
    pub fn pool(&self, name: &str) -> Result<&[Record]> {
        self.pools
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| LooperError::UnknownPool(name.to_string()))
    }

    /// The union of the named pools, duplicates preserved.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&Record>> {
        let mut selected = Vec::new();
        for name in names {
            selected.extend(self.pool(name.as_ref())?);
        }
        Ok(selected)
    }

    /// Every record paired with the name of its pool.
    pub fn tagged(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.pools
            .iter()
            .flat_map(|(name, records)| records.iter().map(move |r| (name.as_str(), r)))
    }

    /// Pool names with their record counts.
    pub fn summary(&self) -> impl Iterator<Item = (&str, usize)> {
        self.pools
            .iter()
            .map(|(name, records)| (name.as_str(), records.len()))
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(participant: &str, day: u32) -> Record {
        Record::new(
            participant,
            NaiveDate::from_ymd_opt(2022, 8, day).unwrap(),
            100,
            None,
        )
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let temp_dir = TempDir::new().unwrap();
        let pools = RecordPools::load(&temp_dir.path().join("records.json")).unwrap();
        assert!(pools.is_empty());
    }

    #[test]
    fn save_then_load_preserves_pools() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("records.json");

        let mut pools = RecordPools::new();
        pools.extend("casual", [record("a", 1), record("a", 1)]);
        pools.extend("normal", [record("b", 2)]);
        pools.save(&path).unwrap();

        let loaded = RecordPools::load(&path).unwrap();
        assert_eq!(loaded, pools);
        assert_eq!(loaded.record_count(), 3);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("records.json");
        std::fs::write(&path, "not json").unwrap();

        let result = RecordPools::load(&path);
        assert!(matches!(result, Err(LooperError::Serialization(_))));
    }

    #[test]
    fn select_unions_pools_and_keeps_duplicates() {
        let mut pools = RecordPools::new();
        pools.extend("normal", [record("a", 1)]);
        pools.extend("hardcore", [record("a", 1), record("b", 3)]);

        let selected = pools.select(&["normal", "hardcore"]).unwrap();
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn select_unknown_pool_fails() {
        let pools = RecordPools::new();
        let result = pools.select(&["casual"]);
        assert!(matches!(result, Err(LooperError::UnknownPool(name)) if name == "casual"));
    }

    #[test]
    fn import_rows_counts_dropped() {
        let mut pools = RecordPools::new();
        let rows = vec![
            RawRecord {
                participant: "a".into(),
                date: "2022-08-01".into(),
                magnitude: "512".into(),
                category: None,
            },
            RawRecord {
                participant: "b".into(),
                date: "soon".into(),
                magnitude: "512".into(),
                category: None,
            },
        ];

        let (imported, dropped) = pools.import_rows("casual", rows, ImportMode::Replace);

        assert_eq!((imported, dropped), (1, 1));
        assert_eq!(pools.pool("casual").unwrap().len(), 1);
    }

    fn raw(participant: &str, date: &str) -> RawRecord {
        RawRecord {
            participant: participant.into(),
            date: date.into(),
            magnitude: "100".into(),
            category: None,
        }
    }

    #[test]
    fn reimporting_replaces_the_pool() {
        let rows = vec![raw("x", "2022-08-01"), raw("x", "2022-08-03")];
        let mut pools = RecordPools::new();
        pools.extend("normal", [record("b", 2)]);

        pools.import_rows("casual", rows.clone(), ImportMode::Replace);
        let once = pools.clone();
        pools.import_rows("casual", rows, ImportMode::Replace);

        assert_eq!(pools, once);
        assert_eq!(pools.pool("casual").unwrap().len(), 2);
        assert_eq!(pools.pool("normal").unwrap().len(), 1);
    }

    #[test]
    fn append_mode_keeps_existing_records() {
        let rows = vec![raw("x", "2022-08-01"), raw("x", "2022-08-03")];
        let mut pools = RecordPools::new();

        pools.import_rows("casual", rows.clone(), ImportMode::Append);
        pools.import_rows("casual", rows, ImportMode::Append);

        assert_eq!(pools.pool("casual").unwrap().len(), 4);
    }

    #[test]
    fn replace_with_nothing_empties_the_pool() {
        let mut pools = RecordPools::new();
        pools.extend("casual", [record("a", 1)]);

        pools.replace("casual", Vec::new());

        assert!(pools.pool("casual").unwrap().is_empty());
    }

    #[test]
    fn load_rejects_other_cache_versions() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("records.json");
        std::fs::write(&path, r#"{"version": 99, "pools": {}}"#).unwrap();

        let result = RecordPools::load(&path);
        assert!(matches!(
            result,
            Err(LooperError::UnsupportedCacheVersion {
                found: 99,
                expected: CACHE_VERSION
            })
        ));
    }

    #[test]
    fn load_without_version_assumes_current() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("records.json");
        std::fs::write(&path, r#"{"pools": {"casual": []}}"#).unwrap();

        let pools = RecordPools::load(&path).unwrap();
        assert!(pools.pool("casual").unwrap().is_empty());
    }

    #[test]
    fn summary_lists_pools_in_name_order() {
        let mut pools = RecordPools::new();
        pools.extend("normal", [record("a", 1)]);
        pools.extend("casual", [record("a", 1), record("b", 2)]);

        let summary: Vec<_> = pools.summary().collect();
        assert_eq!(summary, vec![("casual", 2), ("normal", 1)]);
    }
}
