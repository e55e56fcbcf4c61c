//! Configuration file support for adapterkit.
//!
//! adapterkit supports two configuration file locations:
//! - Global: `~/.adapterkit/config.toml` - User-wide defaults
//! - Project: `.adapterkit/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. When no validation
//! mode is configured, the `ADAPTERKIT_ENV` environment variable decides:
//! `production` means lenient, anything else strict.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapter::validation::ValidationMode;

/// Environment variable naming the deployment environment.
pub const ENV_VAR: &str = "ADAPTERKIT_ENV";

/// adapterkit configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Validation settings
    pub validation: ValidationConfig,

    /// Adapter runtime settings
    pub adapter: AdapterConfig,
}

/// Validation-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// "strict" or "lenient"
    pub mode: Option<String>,
}

/// Adapter runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Simulate operations instead of dispatching them
    pub dry_run: Option<bool>,

    /// Per-operation timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.validation.mode.is_some() {
            self.validation.mode = other.validation.mode;
        }
        if other.adapter.dry_run.is_some() {
            self.adapter.dry_run = other.adapter.dry_run;
        }
        if other.adapter.timeout_ms.is_some() {
            self.adapter.timeout_ms = other.adapter.timeout_ms;
        }
    }

    /// Resolve the validation mode.
    ///
    /// An explicit `[validation] mode` wins; otherwise the environment name
    /// decides.
    pub fn validation_mode(&self, environment: Option<&str>) -> Result<ValidationMode> {
        match &self.validation.mode {
            Some(mode) => mode
                .parse()
                .with_context(|| "invalid `[validation] mode` in config"),
            None => Ok(ValidationMode::from_environment(environment)),
        }
    }

    /// Whether dry run is enabled.
    pub fn dry_run(&self) -> bool {
        self.adapter.dry_run.unwrap_or(false)
    }

    /// Per-operation timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.adapter.timeout_ms.map(Duration::from_millis)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.adapterkit/config.toml)
/// 2. Global config (~/.adapterkit/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global adapterkit config directory (~/.adapterkit).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".adapterkit"))
}

/// Get the global config path (~/.adapterkit/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.adapterkit/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".adapterkit").join("config.toml")
}
