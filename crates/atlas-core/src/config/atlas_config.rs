//! Top-level Atlas configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{BuildConfig, FederationConfig, LoggingConfig, SearchConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `apply_overrides`)
/// 2. Environment variables (`ATLAS_*`)
/// 3. Project config (`atlas.toml` in the project root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AtlasConfig {
    pub build: BuildConfig,
    pub federation: FederationConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// Override arguments that take precedence over every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub workers: Option<usize>,
    pub flush_threshold: Option<usize>,
    pub default_zoom: Option<u8>,
    pub log_level: Option<String>,
}

impl AtlasConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join("atlas.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(o) = overrides {
            Self::apply_overrides(&mut config, o);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &AtlasConfig) -> Result<(), ConfigError> {
        if config.build.flush_threshold == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "build.flush_threshold".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(zoom) = config.build.default_zoom {
            if zoom > 14 {
                return Err(ConfigError::ValidationFailed {
                    field: "build.default_zoom".to_string(),
                    message: "must be between 0 and 14".to_string(),
                });
            }
        }
        if config.federation.open_concurrency == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "federation.open_concurrency".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(threshold) = config.search.relev_threshold {
            if !(threshold > 0.0 && threshold < 1.0) {
                return Err(ConfigError::ValidationFailed {
                    field: "search.relev_threshold".to_string(),
                    message: "must be between 0.0 and 1.0 (exclusive)".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    fn merge_toml_file(config: &mut AtlasConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: AtlasConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a value.
    fn merge(base: &mut AtlasConfig, other: &AtlasConfig) {
        if other.build.workers.is_some() {
            base.build.workers = other.build.workers;
        }
        if other.build.flush_threshold.is_some() {
            base.build.flush_threshold = other.build.flush_threshold;
        }
        if other.build.default_zoom.is_some() {
            base.build.default_zoom = other.build.default_zoom;
        }
        if other.build.page_size.is_some() {
            base.build.page_size = other.build.page_size;
        }
        if other.federation.open_concurrency.is_some() {
            base.federation.open_concurrency = other.federation.open_concurrency;
        }
        if other.search.max_degens.is_some() {
            base.search.max_degens = other.search.max_degens;
        }
        if other.search.relev_threshold.is_some() {
            base.search.relev_threshold = other.search.relev_threshold;
        }
        if other.search.autocomplete.is_some() {
            base.search.autocomplete = other.search.autocomplete;
        }
        if other.logging.level.is_some() {
            base.logging.level = other.logging.level.clone();
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `ATLAS_BUILD_WORKERS`, `ATLAS_BUILD_FLUSH_THRESHOLD`, etc.
    fn apply_env_overrides(config: &mut AtlasConfig) {
        if let Ok(val) = std::env::var("ATLAS_BUILD_WORKERS") {
            if let Ok(v) = val.parse::<usize>() {
                config.build.workers = Some(v);
            }
        }
        if let Ok(val) = std::env::var("ATLAS_BUILD_FLUSH_THRESHOLD") {
            if let Ok(v) = val.parse::<usize>() {
                config.build.flush_threshold = Some(v);
            }
        }
        if let Ok(val) = std::env::var("ATLAS_BUILD_DEFAULT_ZOOM") {
            if let Ok(v) = val.parse::<u8>() {
                config.build.default_zoom = Some(v);
            }
        }
        if let Ok(val) = std::env::var("ATLAS_FEDERATION_OPEN_CONCURRENCY") {
            if let Ok(v) = val.parse::<usize>() {
                config.federation.open_concurrency = Some(v);
            }
        }
        if let Ok(val) = std::env::var("ATLAS_SEARCH_AUTOCOMPLETE") {
            if let Ok(v) = val.parse::<bool>() {
                config.search.autocomplete = Some(v);
            }
        }
        if let Ok(val) = std::env::var("ATLAS_LOG") {
            config.logging.level = Some(val);
        }
    }

    /// Apply explicit overrides (highest priority).
    pub fn apply_overrides(config: &mut AtlasConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.workers {
            config.build.workers = Some(v);
        }
        if let Some(v) = overrides.flush_threshold {
            config.build.flush_threshold = Some(v);
        }
        if let Some(v) = overrides.default_zoom {
            config.build.default_zoom = Some(v);
        }
        if let Some(ref v) = overrides.log_level {
            config.logging.level = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
