//! Validate a settings file offline.
//!
//! The file is a flat TOML table keyed by field name, the same format a
//! [`FormModel`] serializes to:
//!
//! ```toml
//! vm_name = "sqlvm01"
//! admin_username = "sqladmin"
//! admin_password = "Str0ng!Passw0rd"
//! confirm_password = "Str0ng!Passw0rd"
//! vm_size = "Standard_D2s_v3"
//! ```
//!
//! The rules are the ones the VM settings page runs before navigating
//! forward. No catalog lookup is made, so dropdown values are checked for
//! presence only. Exits non-zero when any rule fails.

use super::{CliConfig, OutputFormat};
use crate::core::WizardError;
use crate::model::FormModel;
use crate::validate::{ComplexityPolicy, ValidationIssue, vm_settings_validator};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Arguments of `vmwiz validate`.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Settings file to validate
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ValidationReport {
    valid: bool,
    errors: Vec<IssueReport>,
}

#[derive(Serialize)]
struct IssueReport {
    field: &'static str,
    message: String,
}

impl From<ValidationIssue> for IssueReport {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            field: issue.field.as_str(),
            message: issue.message,
        }
    }
}

/// Reads a settings file into a model.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains unknown keys or
/// invalid TOML.
pub async fn load_settings(path: &Path) -> Result<FormModel> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse settings from {}", path.display()))
}

impl ValidateCommand {
    /// Validates the settings file and prints the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::ValidationFailure`] when any rule fails, or
    /// an error if the file cannot be loaded.
    pub async fn execute(self, _cli: &CliConfig, quiet: bool) -> Result<()> {
        let model = load_settings(&self.file).await?;
        debug!("Validating {}", self.file.display());

        let validator = vm_settings_validator(Arc::new(ComplexityPolicy::default()));
        let issues = validator.issues(&model);
        let messages: Vec<String> = issues.iter().map(|issue| issue.message.clone()).collect();

        match self.format {
            OutputFormat::Json => {
                let report = ValidationReport {
                    valid: issues.is_empty(),
                    errors: issues.into_iter().map(IssueReport::from).collect(),
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialize report")?
                );
            }
            OutputFormat::Text if messages.is_empty() && !quiet => {
                println!("{} {} is valid", "✓".green(), self.file.display());
            }
            OutputFormat::Text => {
                for issue in issues.iter().filter(|_| !quiet) {
                    println!("{} {}: {}", "✗".red(), issue.field.label(), issue.message);
                }
            }
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(WizardError::ValidationFailure { messages }.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldKey;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_settings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        tokio::fs::write(&path, "vm_name = \"sqlvm01\"\nvm_size = \"Standard_D2s_v3\"\n")
            .await
            .unwrap();

        let model = load_settings(&path).await.unwrap();
        assert_eq!(model.get(FieldKey::VmName), "sqlvm01");
        assert_eq!(model.get(FieldKey::AdminUsername), "");
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        tokio::fs::write(&path, "vm_nmae = \"sqlvm01\"\n").await.unwrap();

        let err = load_settings(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("unknown field 'vm_nmae'"));
    }

    #[tokio::test]
    async fn test_failure_carries_every_message() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        tokio::fs::write(&path, "vm_name = \"sqlvm01\"\n").await.unwrap();

        let command = ValidateCommand {
            file: path,
            format: OutputFormat::Json,
        };
        let err = command.execute(&CliConfig::new(), true).await.unwrap_err();
        let Some(WizardError::ValidationFailure { messages }) = err.downcast_ref::<WizardError>()
        else {
            panic!("expected a validation failure, got {err:#}");
        };
        assert_eq!(
            messages.first().map(String::as_str),
            Some("Username must be between 1 and 20 characters long.")
        );
        assert_eq!(messages.last().map(String::as_str), Some("Select a virtual machine size."));
    }
}
