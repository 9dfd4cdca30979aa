use super::types::{
    CacheConfig, LoopersConfig, RangeConfig, RawCacheConfig, RawLoopersConfig, RawRangeConfig,
};
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use loopers_core::CohortPlan;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

/// One config file in the layering order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub name: &'static str,
    pub path: PathBuf,
}

impl ConfigLoader {
    /// Load merged configuration (user, then project, then explicit file)
    pub fn load(explicit: Option<&Path>) -> Result<LoopersConfig> {
        // --config must exist; the other layers are optional
        if let Some(path) = explicit
            && !path.exists()
        {
            bail!("Config file not found: {}", path.display());
        }

        let mut raw = RawLoopersConfig::default();
        for layer in Self::layers(explicit) {
            if layer.path.exists() {
                raw = Self::merge_raw(raw, Self::read_layer(&layer.path)?);
            }
        }

        // Convert to final config with defaults applied
        Ok(Self::finalize(raw))
    }

    /// Candidate config files, lowest precedence first
    pub fn layers(explicit: Option<&Path>) -> Vec<ConfigLayer> {
        let mut layers = Vec::new();
        if let Some(path) = Self::user_config_path() {
            layers.push(ConfigLayer { name: "user", path });
        }
        layers.push(ConfigLayer {
            name: "project",
            path: Self::project_config_path(),
        });
        if let Some(path) = explicit {
            layers.push(ConfigLayer {
                name: "explicit",
                path: path.to_path_buf(),
            });
        }
        layers
    }

    fn read_layer(path: &Path) -> Result<RawLoopersConfig> {
        debug!(path = %path.display(), "reading config layer");
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "loopers").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with LOOPERS_PROJECT_CONFIG_DIR env var (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("LOOPERS_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".loopers/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawLoopersConfig, overlay: RawLoopersConfig) -> RawLoopersConfig {
        RawLoopersConfig {
            range: RawRangeConfig {
                start: overlay.range.start.or(base.range.start),
                end: overlay.range.end.or(base.range.end),
            },
            cache: RawCacheConfig {
                records_path: overlay.cache.records_path.or(base.cache.records_path),
            },
            cohorts: overlay.cohorts.or(base.cohorts),
            composites: overlay.composites.or(base.composites),
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawLoopersConfig) -> LoopersConfig {
        let range = RangeConfig::default();
        let plan = CohortPlan::historical();
        LoopersConfig {
            range: RangeConfig {
                start: raw.range.start.unwrap_or(range.start),
                end: raw.range.end.unwrap_or(range.end),
            },
            cache: CacheConfig {
                records_path: raw
                    .cache
                    .records_path
                    .unwrap_or_else(|| CacheConfig::default().records_path),
            },
            cohorts: raw.cohorts.unwrap_or(plan.cohorts),
            composites: raw.composites.unwrap_or(plan.composites),
        }
    }

    /// Save config to a specific path
    ///
    /// Creates parent directories if they don't exist.
    #[cfg(test)]
    pub fn save_to_path(config: &LoopersConfig, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(config)?;
        std::fs::write(path, toml)?;

        Ok(())
    }

    /// Load a single config file with defaults applied (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<LoopersConfig> {
        if path.exists() {
            Ok(Self::finalize(Self::read_layer(path)?))
        } else {
            Ok(LoopersConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use loopers_core::{CohortDefinition, HISTORY_START};
    use serial_test::serial;
    use std::io::Write;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ==================== Save Tests ====================

    #[test]
    fn save_then_load_preserves_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = LoopersConfig::default();
        config.range.start = date(2020, 1, 1);
        config.cache.records_path = PathBuf::from("/tmp/records.json");
        config.composites.clear();

        ConfigLoader::save_to_path(&config, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("start = \"2020-01-01\""));

        let loaded = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(loaded.range.start, date(2020, 1, 1));
        assert_eq!(loaded.cache.records_path, PathBuf::from("/tmp/records.json"));
        assert_eq!(loaded.cohorts.len(), 3);
        assert!(loaded.composites.is_empty());
    }

    // ==================== Load Tests ====================

    #[test]
    fn load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.toml");

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.range.start, HISTORY_START);
        assert_eq!(config.plan(), CohortPlan::historical());
    }

    #[test]
    fn load_from_valid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[range]
end = "2021-06-01"

[[cohorts]]
name = "everyone"
pools = ["casual", "normal"]
"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.range.start, HISTORY_START);
        assert_eq!(config.range.end, date(2021, 6, 1));
        assert_eq!(config.cohorts.len(), 1);
        assert_eq!(config.cohorts[0].name, "everyone");
        // Composites were not set, so the defaults still apply
        assert_eq!(config.composites.len(), 2);
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("invalid.toml");

        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();

        let result = ConfigLoader::load_from_path(&path);
        assert!(result.is_err());
    }

    #[test]
    fn merge_raw_overlay_overrides_base() {
        let base = RawLoopersConfig {
            range: RawRangeConfig {
                start: Some(date(2010, 1, 1)),
                end: Some(date(2011, 1, 1)),
            },
            cache: RawCacheConfig {
                records_path: Some(PathBuf::from("/base/records.json")),
            },
            cohorts: Some(vec![CohortDefinition::new("base", ["casual"])]),
            composites: Some(Vec::new()),
        };

        let overlay = RawLoopersConfig {
            range: RawRangeConfig {
                start: Some(date(2012, 1, 1)),
                end: None, // Should preserve base value
            },
            cache: RawCacheConfig { records_path: None },
            cohorts: Some(vec![
                CohortDefinition::new("a", ["normal"]),
                CohortDefinition::new("b", ["hardcore"]),
            ]),
            composites: None,
        };

        let merged = ConfigLoader::merge_raw(base, overlay);

        assert_eq!(merged.range.start, Some(date(2012, 1, 1)));
        assert_eq!(merged.range.end, Some(date(2011, 1, 1)));
        assert_eq!(
            merged.cache.records_path,
            Some(PathBuf::from("/base/records.json"))
        );
        // Lists are replaced, never concatenated
        let names: Vec<_> = merged
            .cohorts
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(merged.composites, Some(Vec::new()));
    }

    #[test]
    #[serial]
    fn explicit_config_is_layered_last() {
        let temp_dir = TempDir::new().unwrap();
        let project_dir = temp_dir.path().join("project");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(
            project_dir.join("config.toml"),
            "[range]\nstart = \"2015-01-01\"\nend = \"2016-01-01\"\n",
        )
        .unwrap();
        let explicit = temp_dir.path().join("explicit.toml");
        std::fs::write(&explicit, "[range]\nend = \"2015-06-01\"\n").unwrap();

        unsafe {
            std::env::set_var("LOOPERS_PROJECT_CONFIG_DIR", &project_dir);
        }
        let result = ConfigLoader::load(Some(&explicit));
        unsafe {
            std::env::remove_var("LOOPERS_PROJECT_CONFIG_DIR");
        }

        let config = result.unwrap();
        assert_eq!(config.range.end, date(2015, 6, 1));
    }

    #[test]
    #[serial]
    fn missing_explicit_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigLoader::load(Some(&temp_dir.path().join("missing.toml")));
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn layers_are_ordered_by_precedence() {
        let explicit = PathBuf::from("/tmp/extra.toml");
        let layers = ConfigLoader::layers(Some(&explicit));

        let names: Vec<_> = layers.iter().map(|layer| layer.name).collect();
        assert_eq!(names, ["user", "project", "explicit"]);
        assert_eq!(layers[2].path, explicit);
        assert_eq!(ConfigLoader::layers(None).len(), 2);
    }

    #[test]
    fn user_config_path_returns_some() {
        let path = ConfigLoader::user_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("loopers"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    #[serial]
    fn project_config_path_defaults_to_dot_loopers() {
        let path = ConfigLoader::project_config_path();
        assert_eq!(path, PathBuf::from(".loopers/config.toml"));
    }

    #[test]
    #[serial]
    fn project_config_path_respects_env() {
        unsafe {
            std::env::set_var("LOOPERS_PROJECT_CONFIG_DIR", "/tmp/loopers-project");
        }
        let path = ConfigLoader::project_config_path();
        unsafe {
            std::env::remove_var("LOOPERS_PROJECT_CONFIG_DIR");
        }
        assert_eq!(path, PathBuf::from("/tmp/loopers-project/config.toml"));
    }
}
