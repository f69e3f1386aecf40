//! Catalog configuration.
//!
//! Settings live in an optional `catalog.toml` in the config directory
//! (the working directory unless `--config-dir` says otherwise). The file is
//! sparse: stock defaults are serialized to TOML, the user file is merged on
//! top, and the result is deserialized and validated. Command-line flags
//! override the merged values.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! image_dir = "public/detail-glass"   # Directory scanned for part images
//! image_prefix = "/detail-glass/"     # URL prefix for each record's image_path
//!
//! [listing]
//! extensions = ["png", "jpg", "jpeg"] # Case-insensitive, no leading dot
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::naming::DEFAULT_IMAGE_PREFIX;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILENAME: &str = "catalog.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Catalog configuration loaded from `catalog.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Directory listed by `scan`, `check`, `stats` and `list`.
    pub image_dir: String,
    /// Prepended to each filename to build `image_path`.
    pub image_prefix: String,
    /// Which directory entries count as images.
    pub listing: ListingConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            image_dir: "public/detail-glass".to_string(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            listing: ListingConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "image_prefix must not be empty".into(),
            ));
        }
        if self.listing.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "listing.extensions must not be empty".into(),
            ));
        }
        if let Some(bad) = self
            .listing
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(ConfigError::Validation(format!(
                "listing.extensions entry {bad:?} must be a bare extension like \"png\""
            )));
        }
        Ok(())
    }
}

/// Directory listing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// File extensions treated as images, compared case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Built-in settings as a TOML table, the base every `catalog.toml` is laid over.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(CatalogConfig::default())?)
}

/// Lay `overlay` over `base`. Nested tables such as `[listing]` combine per
/// key; any other value in the overlay, arrays included, wins outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut merged), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                let value = match merged.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            toml::Value::Table(merged)
        }
        (_, value) => value,
    }
}

/// The user's `catalog.toml` in `dir`, unparsed into settings. A project
/// without one gets `None` and runs on the built-in settings.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    debug!(path = %path.display(), "loaded catalog config");
    Ok(Some(toml::from_str(&content)?))
}

/// Turn the layered TOML into checked settings. Unknown keys and invalid
/// values (an empty prefix, a dotted extension) are errors here.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CatalogConfig, ConfigError> {
    let layered = match overlay {
        Some(user) => merge_toml(base, user),
        None => base,
    };
    let config: CatalogConfig = layered.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Settings for the project whose `catalog.toml` lives in `dir`.
pub fn load_config(dir: &Path) -> Result<CatalogConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, load_raw_config(dir)?)
}

/// A fully-commented stock `catalog.toml`. Printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Glass Catalog Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# Image filenames follow the convention:
#   BRAND-MODEL-STARTYEAR-ENDYEAR-CODE-NUMBER-WIDTHxHEIGHT-DESCRIPTION.png
# e.g.
#   FORD-TRANSIT-CUSTOM-2017-2021-FD-28414-567X1199-PUERTA-DELANTERA-DERECHA.PNG

# Directory scanned for part images (overridden by --source).
image_dir = "public/detail-glass"

# URL prefix the website serves the images under. Each record's image_path
# is this prefix followed by the unchanged filename.
image_prefix = "/detail-glass/"

# ---------------------------------------------------------------------------
# Directory listing
# ---------------------------------------------------------------------------
[listing]
# Extensions treated as images (case-insensitive, without the dot).
# Files starting with "." or "_" are always skipped.
extensions = ["png", "jpg", "jpeg"]
"##
}
