//! Password policies.
//!
//! The validator only knows the [`PasswordPolicy`] trait; the host decides
//! which policy applies. [`ComplexityPolicy`] is the one Azure enforces for
//! virtual machine administrator passwords.

use crate::constants::{MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};

/// Checks a password and explains every way it falls short.
pub trait PasswordPolicy: Send + Sync {
    /// Messages for `password`; empty when acceptable.
    fn check(&self, password: &str) -> Vec<String>;
}

impl<F> PasswordPolicy for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn check(&self, password: &str) -> Vec<String> {
        self(password)
    }
}

/// Length bounds plus at least three of four character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityPolicy {
    /// Minimum length in characters
    pub min_len: usize,
    /// Maximum length in characters
    pub max_len: usize,
    /// How many of lower, upper, digit and special must be present
    pub required_classes: usize,
}

impl Default for ComplexityPolicy {
    fn default() -> Self {
        Self {
            min_len: MIN_PASSWORD_LEN,
            max_len: MAX_PASSWORD_LEN,
            required_classes: 3,
        }
    }
}

impl PasswordPolicy for ComplexityPolicy {
    fn check(&self, password: &str) -> Vec<String> {
        let mut messages = Vec::new();

        let len = password.chars().count();
        if len < self.min_len || len > self.max_len {
            messages.push(format!(
                "Password must be between {} and {} characters long.",
                self.min_len, self.max_len
            ));
        }

        let classes = [
            password.chars().any(char::is_lowercase),
            password.chars().any(char::is_uppercase),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
        ];
        if classes.iter().filter(|present| **present).count() < self.required_classes {
            messages.push(
                "Password must have 3 of the following: 1 lower case character, 1 upper case character, 1 number, and 1 special character."
                    .to_string(),
            );
        }

        messages
    }
}
