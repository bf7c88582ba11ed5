//! Form validation at navigation checkpoints.
//!
//! A [`FormValidator`] is a list of [`ValidationRule`]s registered once when
//! the form is built. [`FormValidator::validate`] runs every rule against the
//! current [`FormModel`] in registration order and collects the message of
//! every failing rule; it never stops at the first failure. An empty list
//! means the form is valid.
//!
//! Validation problems are data, not errors. The page turns a non-empty list
//! into a blocked navigation; nothing is raised.
//!
//! # Examples
//!
//! ```rust
//! use vmwiz::model::{FieldKey, FormModel};
//! use vmwiz::validate::{FormValidator, ValidationRule};
//!
//! let validator = FormValidator::new().with_rule(ValidationRule::new(
//!     FieldKey::VmName,
//!     "Virtual machine name is required.",
//!     |model| !model.get(FieldKey::VmName).is_empty(),
//! ));
//!
//! assert_eq!(validator.validate(&FormModel::new()).len(), 1);
//! ```

mod password;
mod rules;

pub use password::{ComplexityPolicy, PasswordPolicy};
pub use rules::{SPECIAL_CHARACTERS, vm_settings_validator};

use crate::model::{FieldKey, FormModel};
use std::fmt;

type Check = Box<dyn Fn(&FormModel) -> Vec<String> + Send + Sync>;

/// One registered rule.
pub struct ValidationRule {
    field: FieldKey,
    check: Check,
}

impl ValidationRule {
    /// A rule that reports `message` when `is_valid` returns false.
    pub fn new(
        field: FieldKey,
        message: impl Into<String>,
        is_valid: impl Fn(&FormModel) -> bool + Send + Sync + 'static,
    ) -> Self {
        let message = message.into();
        Self {
            field,
            check: Box::new(move |model| {
                if is_valid(model) {
                    Vec::new()
                } else {
                    vec![message.clone()]
                }
            }),
        }
    }

    /// A rule whose messages come from an external check, e.g. a password
    /// policy. Every message the check returns is reported.
    pub fn delegated(
        field: FieldKey,
        check: impl Fn(&FormModel) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            field,
            check: Box::new(check),
        }
    }

    /// Field the rule is about.
    #[must_use]
    pub const fn field(&self) -> FieldKey {
        self.field
    }

    /// Messages for `model`; empty when the rule holds.
    #[must_use]
    pub fn evaluate(&self, model: &FormModel) -> Vec<String> {
        (self.check)(model)
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule").field("field", &self.field).finish_non_exhaustive()
    }
}

/// A failed rule, tied to the field it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Field to show the message next to
    pub field: FieldKey,
    /// User-facing message
    pub message: String,
}

/// Ordered set of rules evaluated together.
#[derive(Debug, Default)]
pub struct FormValidator {
    rules: Vec<ValidationRule>,
}

impl FormValidator {
    /// Creates a validator without rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `rule`.
    pub fn register(&mut self, rule: ValidationRule) {
        self.rules.push(rule);
    }

    /// Builder-style variant of [`Self::register`].
    #[must_use]
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.register(rule);
        self
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every failing rule with its field, in registration order.
    #[must_use]
    pub fn issues(&self, model: &FormModel) -> Vec<ValidationIssue> {
        self.rules
            .iter()
            .flat_map(|rule| {
                rule.evaluate(model).into_iter().map(|message| ValidationIssue {
                    field: rule.field(),
                    message,
                })
            })
            .collect()
    }

    /// Every failing rule's message, in registration order.
    #[must_use]
    pub fn validate(&self, model: &FormModel) -> Vec<String> {
        self.issues(model).into_iter().map(|issue| issue.message).collect()
    }
}
