//! vmwiz - option resolver for the SQL Server VM settings page
//!
//! The VM settings page of a SQL Server deployment wizard offers four
//! catalog-backed dropdowns: image offer, image SKU, image version and VM
//! size. The first three form a cascade, each populated from a lookup
//! parameterized by the selections before it; the size list only depends on
//! the subscription and region. Lookups are asynchronous and may complete
//! out of order, so every response is tagged with the generation of the
//! field that requested it and dropped if the field has moved on.
//!
//! Before the wizard leaves the page a validator checks the collected values
//! and either allows navigation or blocks it with every failing message.
//!
//! # Core Modules
//!
//! - [`catalog`] - catalog client trait, Azure Resource Manager client, lookup paths
//! - [`format`] - raw entries to ordered, filtered, labelled options
//! - [`field`] - state of one dropdown, with its generation counter
//! - [`cascade`] - ordered chains of dependent fields
//! - [`validate`] - rule-based form validation and password policies
//! - [`model`] - the key/value record shared by the page's components
//! - [`page`] - the VM settings page wiring it all together
//!
//! ## Supporting Modules
//!
//! - [`cli`] - the `vmwiz` command-line interface
//! - [`config`] - `~/.vmwiz/config.toml`
//! - [`constants`] - defaults shared across modules
//! - [`core`] - error types and user-facing error reporting
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vmwiz::catalog::ArmCatalogClient;
//! use vmwiz::config::{WizardConfig, access_token};
//! use vmwiz::model::FieldKey;
//! use vmwiz::page::VmSettingsPage;
//! use vmwiz::validate::ComplexityPolicy;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = WizardConfig::load().await?;
//! let client = ArmCatalogClient::from_config(&config.catalog, access_token())?;
//! let policy = Arc::new(ComplexityPolicy::default());
//! let page = VmSettingsPage::new(&config, Arc::new(client), policy)?;
//!
//! for error in page.enter().await {
//!     eprintln!("{error}");
//! }
//! page.set_value(FieldKey::VmName, "sqlvm01").await?;
//! println!("{:?}", page.on_navigate(1, 2));
//! # Ok(())
//! # }
//! ```

pub mod cascade;
pub mod catalog;
pub mod field;
pub mod format;
pub mod model;
pub mod page;
pub mod validate;

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
