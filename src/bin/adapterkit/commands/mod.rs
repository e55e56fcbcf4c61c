//! Command implementations

pub mod completions;
pub mod describe;
pub mod list;
pub mod simulate;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use adapterkit::adapter::{AdapterRegistry, ValidationMode};
use adapterkit::backends;
use adapterkit::util::config::{self, load_config, Config, ENV_VAR};

/// Load configuration (global + project) for the current directory.
pub(crate) fn load_settings() -> Result<Config> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let global = config::global_config_path();
    Ok(load_config(
        global.as_deref(),
        &config::project_config_path(&cwd),
    ))
}

/// Validation mode from config, falling back to `ADAPTERKIT_ENV`.
pub(crate) fn configured_mode(config: &Config) -> Result<ValidationMode> {
    let environment = std::env::var(ENV_VAR).ok();
    config.validation_mode(environment.as_deref())
}

/// The built-in backend catalog, frozen with the configured settings.
pub(crate) fn catalog(config: &Config, mode: ValidationMode) -> Result<AdapterRegistry> {
    Ok(backends::catalog(mode, config.timeout())?)
}

/// Read and parse a JSON file.
pub(crate) fn read_json(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}
