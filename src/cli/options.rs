//! Resolve the VM settings dropdowns against the live catalog.
//!
//! ```bash
//! vmwiz options
//! vmwiz options --image sql2019-ws2019 --sku enterprise
//! vmwiz options --format json
//! ```
//!
//! The subscription and region come from the `[scope]` config section; the
//! bearer token from `VMWIZ_ACCESS_TOKEN`.

use super::{CliConfig, OutputFormat};
use crate::catalog::ArmCatalogClient;
use crate::config::access_token;
use crate::core::WizardError;
use crate::field::FieldView;
use crate::model::FieldKey;
use crate::page::VmSettingsPage;
use crate::validate::ComplexityPolicy;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Arguments of `vmwiz options`.
#[derive(Args, Debug)]
pub struct OptionsCommand {
    /// Image offer to select before listing SKUs and versions
    #[arg(long)]
    pub image: Option<String>,

    /// Image SKU to select before listing versions
    #[arg(long)]
    pub sku: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct FieldReport<'a> {
    field: &'static str,
    label: &'static str,
    #[serde(flatten)]
    view: &'a FieldView,
}

impl OptionsCommand {
    /// Loads the config, resolves every dropdown and prints it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded, no scope is
    /// configured, a catalog lookup fails, or a requested id is not offered.
    pub async fn execute(self, cli: &CliConfig, quiet: bool) -> Result<()> {
        let config = cli.load_wizard_config().await?;
        let scope = config.scope();
        if scope.subscription.is_empty() || scope.region.is_empty() {
            return Err(WizardError::ConfigError {
                message: "[scope] subscription and region must both be set".to_string(),
            }
            .into());
        }

        let client = ArmCatalogClient::from_config(&config.catalog, access_token())?;
        let page =
            VmSettingsPage::new(&config, Arc::new(client), Arc::new(ComplexityPolicy::default()))?;

        let views = self.resolve(&page).await?;
        match self.format {
            OutputFormat::Json => {
                let report: Vec<FieldReport<'_>> = views
                    .iter()
                    .map(|(key, view)| FieldReport {
                        field: key.as_str(),
                        label: key.label(),
                        view,
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialize options")?
                );
            }
            OutputFormat::Text if !quiet => print_views(&views),
            OutputFormat::Text => {}
        }
        Ok(())
    }

    /// Enters the page and applies the requested selections.
    ///
    /// # Errors
    ///
    /// Returns the first catalog failure, or the error of a rejected
    /// selection.
    pub async fn resolve(&self, page: &VmSettingsPage) -> Result<Vec<(FieldKey, FieldView)>> {
        let mut errors = page.enter().await.into_iter();
        if let Some(first) = errors.next() {
            for other in errors {
                warn!("{}", other);
            }
            return Err(first.into());
        }

        for (key, id) in [(FieldKey::Image, &self.image), (FieldKey::ImageSku, &self.sku)] {
            if let Some(id) = id {
                info!("Selecting {} = {}", key, id);
                page.select(key, id).await?;
            }
        }

        Ok(page.snapshot())
    }
}

fn print_views(views: &[(FieldKey, FieldView)]) {
    for (key, view) in views {
        println!("{}", format!("{}:", key.label()).bold());
        if view.options.is_empty() {
            println!("  {}", "(no options)".dimmed());
        }
        for option in &view.options {
            let marker = if option.id == view.selected_id { "*".green() } else { " ".normal() };
            if option.label == option.id {
                println!("  {marker} {}", option.id);
            } else {
                println!("  {marker} {} ({})", option.label.replace('\t', "  "), option.id);
            }
        }
    }
}
