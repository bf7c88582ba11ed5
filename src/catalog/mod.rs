//! Catalog access for option lookups.
//!
//! A catalog is the remote source of selectable options. The cascade only
//! sees the [`CatalogClient`] trait: given a resource path it returns the raw
//! entries found there, or a [`CatalogError`]. [`ArmCatalogClient`] is the
//! production implementation backed by the Azure Resource Manager REST API.
//!
//! [`CatalogPaths`] builds the resource paths for the four lookups the VM
//! settings page performs:
//!
//! | lookup   | parameterized by                 |
//! |----------|----------------------------------|
//! | images   | subscription, region             |
//! | skus     | subscription, region, image      |
//! | versions | subscription, region, image, sku |
//! | sizes    | subscription, region             |

mod http;

pub use http::{ArmCatalogClient, parse_catalog_body};

use crate::config::CatalogConfig;
use crate::core::CatalogError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One capability of a compute SKU, e.g. `{ "name": "vCPUs", "value": "4" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Capability name
    pub name: String,
    /// Capability value; the catalog reports every value as a string
    pub value: String,
}

/// A catalog item as returned by the management API.
///
/// Image offers, SKUs and versions only carry a `name`. Compute SKUs (VM
/// sizes) additionally carry a `resourceType` and a capability list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    /// Canonical identifier of the entry
    pub name: String,
    /// Resource type, present on compute SKUs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Capabilities, present on compute SKUs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<Capability>>,
}

impl RawEntry {
    /// Creates an entry that only has a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the resource type.
    #[must_use]
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    /// Appends a capability.
    #[must_use]
    pub fn with_capability(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.capabilities.get_or_insert_with(Vec::new).push(Capability {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Looks up a capability value by name.
    #[must_use]
    pub fn capability(&self, name: &str) -> Option<&str> {
        self.capabilities
            .as_deref()?
            .iter()
            .find(|capability| capability.name == name)
            .map(|capability| capability.value.as_str())
    }
}

/// Performs catalog lookups.
///
/// Implementations receive an already-authenticated transport; the cascade
/// never constructs credentials. A lookup is fire-and-forget from the
/// cascade's point of view: it is never cancelled, its result is simply
/// discarded if the requesting field moved on.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Returns the entries found at `path`.
    async fn fetch(&self, path: &str) -> Result<Vec<RawEntry>, CatalogError>;
}

/// Subscription and region every lookup is scoped to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogScope {
    /// Azure subscription id
    pub subscription: String,
    /// Azure region (location)
    pub region: String,
}

/// Builds Azure Resource Manager paths for the page's lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    publisher: String,
    image_api_version: String,
    sku_api_version: String,
}

impl CatalogPaths {
    /// Creates a path builder from the `[catalog]` config section.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            publisher: config.publisher.clone(),
            image_api_version: config.image_api_version.clone(),
            sku_api_version: config.sku_api_version.clone(),
        }
    }

    fn offers_base(&self, scope: &CatalogScope) -> String {
        format!(
            "/subscriptions/{}/providers/Microsoft.Compute/locations/{}/publishers/{}/artifacttypes/vmimage/offers",
            scope.subscription, scope.region, self.publisher
        )
    }

    /// Image offers published in the scope's region.
    #[must_use]
    pub fn images(&self, scope: &CatalogScope) -> String {
        format!("{}?api-version={}", self.offers_base(scope), self.image_api_version)
    }

    /// SKUs of one image offer.
    #[must_use]
    pub fn skus(&self, scope: &CatalogScope, image: &str) -> String {
        format!("{}/{image}/skus?api-version={}", self.offers_base(scope), self.image_api_version)
    }

    /// Versions of one image SKU.
    #[must_use]
    pub fn versions(&self, scope: &CatalogScope, image: &str, sku: &str) -> String {
        format!(
            "{}/{image}/skus/{sku}/versions?api-version={}",
            self.offers_base(scope),
            self.image_api_version
        )
    }

    /// Compute SKUs available in the scope's region.
    #[must_use]
    pub fn sizes(&self, scope: &CatalogScope) -> String {
        format!(
            "/subscriptions/{}/providers/Microsoft.Compute/skus?api-version={}&$filter=location eq '{}'",
            scope.subscription, self.sku_api_version, scope.region
        )
    }
}
