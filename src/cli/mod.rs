//! Command-line interface for vmwiz.
//!
//! # Available Commands
//!
//! - `options` - Resolve the image and size dropdowns against the live catalog
//! - `validate` - Check a settings file against the VM settings rules
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only report errors
//! - `--config` - Use a specific config file instead of `~/.vmwiz/config.toml`
//!
//! ```bash
//! VMWIZ_ACCESS_TOKEN=$(az account get-access-token --query accessToken -o tsv) \
//!     vmwiz options --image sql2019-ws2019
//! vmwiz validate settings.toml
//! ```

mod options;
mod validate;

pub use options::OptionsCommand;
pub use validate::ValidateCommand;

use crate::config::WizardConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Output format shared by every command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for scripts
    Json,
}

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` when only errors should be logged
    pub log_level: Option<String>,
    /// Config file given with `--config`
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over the flags when set. Calling this twice is
    /// harmless; the second subscriber is ignored.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = self.log_level.as_deref().unwrap_or("error");
            EnvFilter::new(format!("vmwiz={level}"))
        });

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Loads the wizard configuration this invocation should use.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load_wizard_config(&self) -> Result<WizardConfig> {
        WizardConfig::load_with_optional(self.config_path.clone()).await
    }
}

/// Resolve and validate SQL Server VM settings.
#[derive(Parser, Debug)]
#[command(
    name = "vmwiz",
    about = "Resolve and validate SQL Server virtual machine settings",
    version,
    long_about = "vmwiz resolves the cascading image, SKU and version dropdowns and the VM size list \
                  of the SQL Server VM settings page against the Azure catalog, and validates \
                  settings the way the page does before navigation."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file
    #[arg(short, long, global = true, env = "VMWIZ_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the dropdowns against the live catalog
    Options(OptionsCommand),

    /// Validate a settings file
    Validate(ValidateCommand),
}

impl Cli {
    /// Executes the selected command.
    ///
    /// # Errors
    ///
    /// Returns whatever the command reports; `main` turns it into a
    /// user-friendly message and a non-zero exit code.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Builds a [`CliConfig`] from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Executes the selected command with an explicit configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Options(cmd) => cmd.execute(&config, self.quiet).await,
            Commands::Validate(cmd) => cmd.execute(&config, self.quiet).await,
        }
    }
}
