//! Application configuration management

use crate::errors::{BundleError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Boot parameters written into every new manifest
    pub manifest: ManifestDefaults,
    /// Reader configuration
    pub inspect: InspectConfig,
}

/// Boot parameters seeding the manifest builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestDefaults {
    /// Kernel memory token, expanded on the device
    pub kernel_mem: String,
    pub set_total_mem: bool,
    /// MTD device name prefix for the kernel command line
    pub mtd_prefix: String,
    /// Memory reserved for the OS
    pub osmem: String,
}

/// Reader-related configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Aggregate output name used when concatenating partitions
    pub full_image_name: String,
}

impl Default for ManifestDefaults {
    fn default() -> Self {
        Self {
            kernel_mem: "${totalmem}".to_string(),
            set_total_mem: true,
            mtd_prefix: "hi_sfc:".to_string(),
            osmem: "32M".to_string(),
        }
    }
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            full_image_name: "ff.img".to_string(),
        }
    }
}

impl AppConfig {
    /// Per-user configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(crate::APP_NAME).join("config.toml"))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from an explicit file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BundleError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Explicit path if given, else the per-user file if present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            log::debug!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            _ => {
                log::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}
