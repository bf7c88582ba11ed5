//! Error handling for vmwiz
//!
//! Library code returns two strongly-typed error enums:
//! - [`CatalogError`] - failures of a single catalog lookup
//! - [`WizardError`] - failures of cascade and page operations
//!
//! Validation problems are never errors: the validator returns them as a
//! message list. [`WizardError::ValidationFailure`] exists only so the CLI
//! can turn a blocked navigation into a non-zero exit.
//!
//! [`ErrorContext`] wraps a [`WizardError`] with details and a suggestion for
//! terminal display, and [`user_friendly_error`] converts any
//! [`anyhow::Error`] into one.
//!
//! # Examples
//!
//! ```rust,no_run
//! use vmwiz::core::{ErrorContext, WizardError};
//!
//! let context = ErrorContext::new(WizardError::ConfigError {
//!     message: "missing subscription".to_string(),
//! })
//! .with_suggestion("Set [scope].subscription in the config file");
//!
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Failure of a single catalog lookup.
///
/// `NotFound` is not a user-facing failure: the cascade treats it as an
/// empty option set. Every other variant is surfaced to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Transport failure or a non-success HTTP status.
    #[error("Network error while fetching '{path}': {reason}")]
    NetworkError {
        /// Catalog path that was requested
        path: String,
        /// Reason for the failure
        reason: String,
    },

    /// The catalog has no resource at this path.
    #[error("Catalog resource not found: {path}")]
    NotFound {
        /// Catalog path that was requested
        path: String,
    },

    /// The response body could not be decoded into catalog entries.
    #[error("Malformed catalog response for '{path}': {reason}")]
    MalformedResponse {
        /// Catalog path that was requested
        path: String,
        /// Decoder error
        reason: String,
    },
}

impl CatalogError {
    /// Returns true for errors the cascade should treat as "zero options".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// The main error type for vmwiz operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// A catalog lookup for a cascade stage failed.
    #[error("Failed to load options for '{field}'")]
    Catalog {
        /// Display name of the field whose options failed to load
        field: String,
        /// Underlying catalog failure
        #[source]
        source: CatalogError,
    },

    /// An id was selected that the field does not offer.
    ///
    /// This is a programming error in the host: selections must come from
    /// the option set the field currently exposes.
    #[error("'{id}' is not an available option for '{field}'")]
    InvalidSelection {
        /// Display name of the field
        field: String,
        /// The rejected id
        id: String,
    },

    /// A stage index or field key that the cascade does not own.
    #[error("Unknown cascade field: {field}")]
    UnknownField {
        /// The requested field or stage
        field: String,
    },

    /// Configuration could not be used.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Navigation was blocked by validation messages.
    #[error("Settings are not valid ({} problem(s))", messages.len())]
    ValidationFailure {
        /// Every message reported by the validator, in rule order
        messages: Vec<String>,
    },
}

/// User-facing wrapper around a [`WizardError`].
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: WizardError,
    /// Optional suggestion for how to resolve the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Creates a context without details or suggestion.
    #[must_use]
    pub const fn new(error: WizardError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Adds a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Adds details about the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Converts any error into an [`ErrorContext`] with a suggestion.
///
/// Known [`WizardError`] and [`CatalogError`] values are mapped to tailored
/// suggestions; anything else is reported with its full context chain as
/// details.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(wizard_error) = error.downcast_ref::<WizardError>() {
        return context_for(wizard_error.clone());
    }

    if let Some(catalog_error) = error.downcast_ref::<CatalogError>() {
        return context_for(WizardError::Catalog {
            field: "catalog".to_string(),
            source: catalog_error.clone(),
        });
    }

    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    let mut context = ErrorContext::new(WizardError::ConfigError {
        message: error.to_string(),
    });
    if !chain.is_empty() {
        context = context.with_details(chain.join(": "));
    }
    context
}

fn context_for(error: WizardError) -> ErrorContext {
    match &error {
        WizardError::Catalog { source, .. } => {
            let details = source.to_string();
            let suggestion = match source {
                CatalogError::NetworkError { .. } => {
                    "Check your network connection and that the access token in VMWIZ_ACCESS_TOKEN is still valid"
                }
                CatalogError::NotFound { .. } => {
                    "Check the subscription and region in the [scope] section of the config"
                }
                CatalogError::MalformedResponse { .. } => {
                    "Check that [catalog].endpoint points at an Azure Resource Manager endpoint"
                }
            };
            ErrorContext::new(error).with_details(details).with_suggestion(suggestion)
        }
        WizardError::InvalidSelection { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'vmwiz options' to list the ids each field offers"),
        WizardError::UnknownField { .. } => ErrorContext::new(error),
        WizardError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the config file passed with --config or ~/.vmwiz/config.toml"),
        WizardError::ValidationFailure { messages } => {
            let details = messages.join("\n");
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Fix the listed settings and run the command again")
        }
    }
}
