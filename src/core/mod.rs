//! Core types for vmwiz
//!
//! This module holds the error types shared by every other module:
//!
//! - [`CatalogError`] - failures of one catalog lookup (`NetworkError`,
//!   `NotFound`, `MalformedResponse`)
//! - [`WizardError`] - failures of cascade, page and configuration operations
//! - [`ErrorContext`] - user-facing wrapper with details and a suggestion
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] for CLI display
//!
//! Rule violations are not errors: they are returned as message lists by
//! [`crate::validate`], never raised.

pub mod error;

pub use error::{CatalogError, ErrorContext, WizardError, user_friendly_error};
