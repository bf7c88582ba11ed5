//! Azure Resource Manager catalog client.

use super::{CatalogClient, RawEntry};
use crate::config::CatalogConfig;
use crate::core::{CatalogError, WizardError};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Response bodies come either as a bare array (image offers, SKUs,
/// versions) or wrapped in a `value` envelope (compute SKUs).
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogBody {
    List(Vec<RawEntry>),
    Envelope { value: Vec<RawEntry> },
}

/// Decodes a catalog response body for `path`.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedResponse`] when the body is neither an
/// entry array nor a `{ "value": [...] }` envelope.
pub fn parse_catalog_body(path: &str, body: &str) -> Result<Vec<RawEntry>, CatalogError> {
    match serde_json::from_str::<CatalogBody>(body) {
        Ok(CatalogBody::List(entries) | CatalogBody::Envelope { value: entries }) => Ok(entries),
        Err(e) => Err(CatalogError::MalformedResponse {
            path: path.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// [`CatalogClient`] over the Azure Resource Manager REST API.
///
/// The client is handed an already-issued bearer token; acquiring and
/// refreshing tokens is the host's business.
#[derive(Debug, Clone)]
pub struct ArmCatalogClient {
    http: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl ArmCatalogClient {
    /// Creates a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::ConfigError`] if the endpoint is not a valid URL
    /// or the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WizardError> {
        let endpoint = Url::parse(endpoint).map_err(|e| WizardError::ConfigError {
            message: format!("Invalid catalog endpoint '{endpoint}': {e}"),
        })?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("vmwiz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WizardError::ConfigError {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    /// Creates a client from the `[catalog]` config section.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_config(config: &CatalogConfig, token: Option<String>) -> Result<Self, WizardError> {
        Self::new(&config.endpoint, token, config.timeout())
    }

    fn url_for(&self, path: &str) -> Result<Url, CatalogError> {
        self.endpoint.join(path).map_err(|e| CatalogError::NetworkError {
            path: path.to_string(),
            reason: format!("invalid request URL: {e}"),
        })
    }
}

#[async_trait]
impl CatalogClient for ArmCatalogClient {
    async fn fetch(&self, path: &str) -> Result<Vec<RawEntry>, CatalogError> {
        let url = self.url_for(path)?;
        debug!("GET {}", url);

        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| CatalogError::NetworkError {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("Catalog path not found: {}", path);
            return Err(CatalogError::NotFound {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            warn!("Catalog request failed: HTTP {} for {}", status, path);
            return Err(CatalogError::NetworkError {
                path: path.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let body = response.text().await.map_err(|e| CatalogError::NetworkError {
            path: path.to_string(),
            reason: format!("failed to read response body: {e}"),
        })?;

        let entries = parse_catalog_body(path, &body)?;
        debug!("Catalog returned {} entries for {}", entries.len(), path);
        Ok(entries)
    }
}
