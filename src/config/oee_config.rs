//! OEE service configuration loaded from TOML
//!
//! Each section implements `Default` with the values in [`super::defaults`],
//! so a missing file or a partial file behaves like the built-in setup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use crate::engine::EngineSettings;
use crate::types::Interval;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "OEE_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "oee_config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config parse error ({}): {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with [`OeeConfig::load`], which searches:
/// 1. an explicit path (CLI `--config`)
/// 2. `$OEE_CONFIG`
/// 3. `./oee_config.toml`
/// 4. built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OeeConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OeeConfig {
    /// Load configuration using the standard search order.
    ///
    /// An explicit path that fails to load is an error; the implicit
    /// locations fall back to defaults with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!(path = %path.display(), "Loaded config from --config");
            return Ok(config);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", CONFIG_ENV_VAR);
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return Ok(config);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors = super::validation::validate_ranges(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// HTTP bind address. `OEE_SERVER_ADDR` or `--addr` take precedence.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::DEFAULT_SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory of the sled record database
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_STORAGE_PATH)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_assumed_efficiency")]
    pub assumed_efficiency_percent: f64,

    /// RFC 3339 instant used when a request has no `startDate`
    #[serde(default = "default_start")]
    pub default_start: String,

    #[serde(default)]
    pub default_interval: Interval,

    #[serde(default = "default_max_periods")]
    pub max_periods: usize,

    #[serde(default = "default_parallel_min_periods")]
    pub parallel_min_periods: usize,
}

fn default_assumed_efficiency() -> f64 {
    defaults::ASSUMED_EFFICIENCY_PERCENT
}

fn default_start() -> String {
    defaults::DEFAULT_START.to_string()
}

fn default_max_periods() -> usize {
    defaults::MAX_TIMELINE_PERIODS
}

fn default_parallel_min_periods() -> usize {
    defaults::PARALLEL_MIN_PERIODS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            assumed_efficiency_percent: default_assumed_efficiency(),
            default_start: default_start(),
            default_interval: Interval::default(),
            max_periods: default_max_periods(),
            parallel_min_periods: default_parallel_min_periods(),
        }
    }
}

impl EngineConfig {
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            assumed_efficiency_percent: self.assumed_efficiency_percent,
            parallel_min_periods: self.parallel_min_periods,
            max_periods: self.max_periods,
        }
    }

    /// Parsed `default_start`. Validation guarantees it parses.
    pub fn default_start_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.default_start)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(OeeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = OeeConfig::from_toml_str("").unwrap();
        assert_eq!(config, OeeConfig::default());
        assert_eq!(config.engine.settings(), EngineSettings::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = OeeConfig::from_toml_str(
            r#"
[engine]
assumed_efficiency_percent = 75.0
default_interval = "hourly"
"#,
        )
        .unwrap();
        assert_eq!(config.engine.assumed_efficiency_percent, 75.0);
        assert_eq!(config.engine.default_interval, Interval::Hourly);
        assert_eq!(config.server.addr, defaults::DEFAULT_SERVER_ADDR);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = OeeConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(OeeConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_default_start_parses() {
        let start = EngineConfig::default().default_start_instant().unwrap();
        assert_eq!(start.to_rfc3339(), "2023-01-01T00:00:00+00:00");
    }
}
