//! Configuration for vmwiz.
//!
//! Settings come from a single TOML file, by default `~/.vmwiz/config.toml`
//! (`%LOCALAPPDATA%\vmwiz\config.toml` on Windows). Every section and key is
//! optional; a missing file means all defaults.
//!
//! ```toml
//! [catalog]
//! endpoint = "https://management.azure.com"
//! publisher = "MicrosoftSQLServer"
//! image_api_version = "2019-12-01"
//! sku_api_version = "2019-04-01"
//! timeout_secs = 30
//!
//! [scope]
//! subscription = "00000000-0000-0000-0000-000000000000"
//! region = "eastus"
//!
//! [images]
//! exclude = ["-byol"]
//!
//! [[images.labels]]
//! pattern = "^sql(.*?)-"
//! replacement = "SQL Server ${1} on "
//! uppercase_captures = true
//! ```
//!
//! The bearer token used for catalog lookups is never stored here; it is
//! read from the `VMWIZ_ACCESS_TOKEN` environment variable.

use crate::catalog::CatalogScope;
use crate::constants::{
    ACCESS_TOKEN_ENV, DEFAULT_CATALOG_TIMEOUT, DEFAULT_IMAGE_PUBLISHER, DEFAULT_MANAGEMENT_ENDPOINT,
    IMAGE_API_VERSION, RESOURCE_SKU_API_VERSION,
};
use crate::core::WizardError;
use crate::format::{FormatRules, SubstitutionSpec, default_image_labels};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Catalog connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Resource Manager endpoint every lookup path is joined onto
    pub endpoint: String,
    /// Image publisher whose offers are listed
    pub publisher: String,
    /// api-version for image offer, SKU and version lookups
    pub image_api_version: String,
    /// api-version for compute SKU (VM size) lookups
    pub sku_api_version: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_MANAGEMENT_ENDPOINT.to_string(),
            publisher: DEFAULT_IMAGE_PUBLISHER.to_string(),
            image_api_version: IMAGE_API_VERSION.to_string(),
            sku_api_version: RESOURCE_SKU_API_VERSION.to_string(),
            timeout_secs: DEFAULT_CATALOG_TIMEOUT.as_secs(),
        }
    }
}

impl CatalogConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Subscription and region the page starts with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub subscription: String,
    pub region: String,
}

impl From<&ScopeConfig> for CatalogScope {
    fn from(config: &ScopeConfig) -> Self {
        Self {
            subscription: config.subscription.clone(),
            region: config.region.clone(),
        }
    }
}

/// Filtering and labelling of image offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Offers whose id matches any of these patterns are hidden
    pub exclude: Vec<String>,
    /// Substitution table deriving labels from offer ids
    pub labels: Vec<SubstitutionSpec>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            exclude: vec!["-byol".to_string()],
            labels: default_image_labels(),
        }
    }
}

impl ImageConfig {
    /// Compiles the section into image formatting rules.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::ConfigError`] if a pattern does not compile.
    pub fn rules(&self) -> Result<FormatRules, WizardError> {
        FormatRules::images(&self.exclude, &self.labels)
    }
}

/// Complete vmwiz configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub catalog: CatalogConfig,
    pub scope: ScopeConfig,
    pub images: ImageConfig,
}

impl WizardConfig {
    /// Loads the configuration from the default location, or defaults if
    /// there is no file there.
    ///
    /// # Errors
    ///
    /// Returns an error if the default path cannot be determined, or the
    /// file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Loads from `path` when given; otherwise behaves like [`Self::load`].
    ///
    /// An explicitly given path must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(&path).await,
            None => Self::load().await,
        }
    }

    /// Loads the configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// does not match the expected schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Platform-specific default location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory is unknown.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("vmwiz")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".vmwiz")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Catalog scope of the `[scope]` section.
    #[must_use]
    pub fn scope(&self) -> CatalogScope {
        CatalogScope::from(&self.scope)
    }
}

/// Bearer token for catalog lookups, from `VMWIZ_ACCESS_TOKEN`.
///
/// Empty values count as unset.
#[must_use]
pub fn access_token() -> Option<String> {
    std::env::var(ACCESS_TOKEN_ENV).ok().filter(|token| !token.trim().is_empty())
}
