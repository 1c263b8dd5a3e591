//! Configuration loading and validation for tagwatch.
//!
//! This module handles:
//! - Loading the single `config.json` file
//! - Config resolution order (CLI > env > XDG > defaults)
//! - Shape checking via serde, semantic checks via [`validation`]

pub mod estimator;
pub mod validation;

pub use estimator::EstimatorParams;
pub use validation::{validate_config, ValidationError};

use crate::registry::EvictionPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default XDG config directory name.
const CONFIG_DIR_NAME: &str = "tagwatch";

/// Config file name inside the config directory.
const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "TAGWATCH_CONFIG";

/// Default registry capacity.
pub const DEFAULT_CAPACITY: usize = 10;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ConfigError> for tw_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => tw_common::Error::ConfigNotFound {
                path: path.display().to_string(),
            },
            ConfigError::ValidationError(inner) => inner.into(),
            other => tw_common::Error::Config(other.to_string()),
        }
    }
}

/// Full tracker configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub registry: RegistryConfig,
    pub estimator: EstimatorParams,
    pub transport: TransportConfig,
}

/// Registry sizing and housekeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Maximum number of tracked tags.
    pub capacity: usize,

    /// When tracked tags are dropped.
    pub eviction: EvictionPolicy,

    /// Fixed RNG seed for reproducible runs; OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            eviction: EvictionPolicy::Never,
            seed: None,
        }
    }
}

/// Reader connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    /// Reader device path, used when no input is given on the command line.
    pub device: Option<PathBuf>,

    /// Expected line rate of the device. Recorded for diagnostics; the
    /// device must already be configured at this rate.
    pub baud_rate: u32,

    /// Longest wait for a line before the cycle proceeds without one.
    pub read_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            device: None,
            baud_rate: 115_200,
            read_timeout_ms: 1000,
        }
    }
}

/// Resolved configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: Config,
    /// Path of the loaded file (None if using defaults).
    pub source_path: Option<PathBuf>,
}

/// Configuration resolution options.
#[derive(Debug, Default)]
pub struct ConfigOptions {
    /// Explicit config file (highest priority).
    pub config_path: Option<PathBuf>,
}

/// Load configuration with the standard resolution order.
///
/// Resolution order (highest to lowest priority):
/// 1. Explicit CLI flag (via ConfigOptions)
/// 2. Environment variable (TAGWATCH_CONFIG)
/// 3. XDG config home (~/.config/tagwatch/config.json)
/// 4. Built-in defaults
///
/// Explicit paths must exist; the XDG file is optional.
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    let explicit = options
        .config_path
        .clone()
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    let (config, source_path) = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound { path });
            }
            (load_config_from_file(&path)?, Some(path))
        }
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                (load_config_from_file(&default_path)?, Some(default_path))
            } else {
                (Config::default(), None)
            }
        }
    };

    validate_config(&config)?;

    Ok(ResolvedConfig {
        config,
        source_path,
    })
}

/// Location of the XDG config file.
pub fn default_config_path() -> PathBuf {
    let xdg_config = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });

    xdg_config.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Parse a config file without semantic validation.
pub fn load_config_from_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.registry.capacity, 10);
        assert_eq!(config.registry.eviction, EvictionPolicy::Never);
        assert_eq!(config.transport.baud_rate, 115_200);
        assert_eq!(config.transport.read_timeout_ms, 1000);
        assert!(config.transport.device.is_none());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"registry": {{"capacity": 3, "seed": 7}}, "estimator": {{"num_samples": 4}}}}"#
        )
        .unwrap();

        let resolved = load_config(&ConfigOptions {
            config_path: Some(file.path().to_path_buf()),
        })
        .unwrap();
        assert_eq!(resolved.config.registry.capacity, 3);
        assert_eq!(resolved.config.registry.seed, Some(7));
        assert_eq!(resolved.config.estimator.num_samples, 4);
        assert_eq!(resolved.source_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(&ConfigOptions {
            config_path: Some(PathBuf::from("/nonexistent/tagwatch/config.json")),
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
        let common: tw_common::Error = err.into();
        assert_eq!(common.code(), 12);
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_config_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_semantic_validation_runs() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"registry": {{"capacity": 0}}}}"#).unwrap();
        let err = load_config(&ConfigOptions {
            config_path: Some(file.path().to_path_buf()),
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_eviction_policy_json() {
        let config: Config =
            serde_json::from_str(r#"{"registry": {"eviction": {"idle_after_seconds": 30.0}}}"#)
                .unwrap();
        assert_eq!(
            config.registry.eviction,
            EvictionPolicy::IdleAfterSeconds(30.0)
        );
    }
}
