//! Project configuration module.
//!
//! Handles loading, validating and querying `config.toml`. The file lives in
//! the project directory and is sparse: stock defaults are overridden key by
//! key, so an empty or missing file is a valid configuration.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! root = "public"            # Public directory, relative to the project dir
//! images = "images"          # Source images, under root
//! thumbnails = "thumbnails"  # Generated thumbnails, under root
//!
//! [processing]
//! max_processes = 4          # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Key lookup
//!
//! [`SiteConfig::lookup`] resolves dotted keys (`"paths.images"`) against the
//! merged config, for callers that only need a single value as a string.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;

/// Name of the config file inside the project directory.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Where source images live and where thumbnails go.
    pub paths: PathsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

/// Directory layout, all relative to the project directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Public directory; generated paths are relative to it.
    pub root: String,
    /// Source image repository, under `root`.
    pub images: String,
    /// Thumbnail destination, under `root`.
    pub thumbnails: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: "public".to_string(),
            images: "images".to_string(),
            thumbnails: "thumbnails".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers for batch generation.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

fn is_plain_relative(dir: &str) -> bool {
    let path = Path::new(dir);
    !dir.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.root.is_empty() {
            return Err(ConfigError::Validation("paths.root must not be empty".into()));
        }
        for (key, value) in [
            ("paths.images", &self.paths.images),
            ("paths.thumbnails", &self.paths.thumbnails),
        ] {
            if !is_plain_relative(value) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a non-empty relative path without '..', got {value:?}"
                )));
            }
        }
        if self.paths.images == self.paths.thumbnails {
            return Err(ConfigError::Validation(
                "paths.images and paths.thumbnails must differ".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Look up a dotted key (`"paths.images"`) and render scalars as strings.
    ///
    /// Returns `None` for unknown keys and for tables.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let mut value = toml::Value::try_from(self).ok()?;
        for piece in key.split('.') {
            value = value.as_table_mut()?.remove(piece)?;
        }
        match value {
            toml::Value::String(s) => Some(s),
            toml::Value::Table(_) => None,
            other => Some(other.to_string()),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse a config document, merge it onto stock defaults and validate.
pub fn parse_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let config: SiteConfig = merge_toml(stock_defaults_value(), overlay).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `config.toml` from the given project directory.
///
/// A missing file yields the stock defaults. A present but invalid file is an
/// error, never silently ignored.
pub fn load_config(project_dir: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-thumb configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Directory layout (relative to the directory holding this file)
# ---------------------------------------------------------------------------
[paths]
# Public directory. Returned thumbnail paths are relative to it, so they can
# be used directly as URLs when this directory is the web root.
root = "public"

# Source images, under root. Requests name images relative to this folder.
images = "images"

# Generated thumbnails, under root. Mirrors the folder structure of images.
thumbnails = "thumbnails"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers when several images are generated in one run.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
