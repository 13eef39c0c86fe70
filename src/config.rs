//! Gallery configuration.
//!
//! Settings come from an optional `folio.toml` in the gallery root, layered
//! over stock defaults. Command-line flags override both. The resulting
//! [`GalleryConfig`] is immutable for the lifetime of the server and is the
//! only state shared between requests.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "File Browser"       # Heading on the gallery page
//! # tip_url = "https://..."    # Shows a "Support via Tip" button when set
//!
//! [thumbnails]
//! dir = "thumbnails"           # Reserved subdirectory holding thumbnails
//!
//! [server]
//! bind = "127.0.0.1:8080"      # Listen address
//!
//! [archive]
//! # dir = "/var/tmp"           # Where bulk-download archives are staged
//! compression = "deflated"     # "stored" or "deflated"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::archive::Compression;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the gallery root.
pub const CONFIG_FILE: &str = "folio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `folio.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Heading shown on the gallery page.
    pub title: String,
    /// Optional external tip/donation link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip_url: Option<String>,
    pub thumbnails: ThumbnailsConfig,
    pub server: ServerConfig,
    pub archive: ArchiveConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            title: "File Browser".to_string(),
            tip_url: None,
            thumbnails: ThumbnailsConfig::default(),
            server: ServerConfig::default(),
            archive: ArchiveConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dir = self.thumbnails.dir.as_str();
        if dir.is_empty() || dir == "." || dir == ".." || dir.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "thumbnails.dir must be a single directory name".into(),
            ));
        }
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            )));
        }
        if let Some(url) = &self.tip_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(
                "tip_url must be an http(s) URL".into(),
            ));
        }
        Ok(())
    }

    /// Listen address. Only valid after [`validate`](Self::validate).
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|_| ConfigError::Validation(format!("bad bind address {}", self.server.bind)))
    }

    /// Absolute thumbnail directory for a gallery root.
    pub fn thumbnail_path(&self, root: &Path) -> PathBuf {
        root.join(&self.thumbnails.dir)
    }

    /// Directory where bulk-download archives are staged.
    pub fn archive_work_dir(&self) -> PathBuf {
        self.archive
            .dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Thumbnail lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Subdirectory of the gallery root that holds pre-built thumbnails.
    /// Never listed as a gallery entry.
    pub dir: String,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            dir: "thumbnails".to_string(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Bulk-download settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Staging directory for temporary archives. System temp dir when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    pub compression: Compression,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Base layer that user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
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

/// Load `folio.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config for a gallery root: stock defaults plus `folio.toml`.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `folio.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# Place this file in the gallery root as folio.toml.
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Heading shown on the gallery page.
title = "File Browser"

# External tip/donation link. Uncomment to show a "Support via Tip" button.
# tip_url = "https://example.com/tip"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Subdirectory of the gallery root holding pre-built thumbnails, one per
# image and named identically. It is never listed or archived.
dir = "thumbnails"

# ---------------------------------------------------------------------------
# Server
# ---------------------------------------------------------------------------
[server]
# Listen address. Overridden by --bind.
bind = "127.0.0.1:8080"

# ---------------------------------------------------------------------------
# Bulk download
# ---------------------------------------------------------------------------
[archive]
# Where temporary archives are written while they are streamed.
# Omit to use the system temp directory.
# dir = "/var/tmp"

# "deflated" (smaller) or "stored" (faster; most images are already compressed).
compression = "deflated"
"##
}
