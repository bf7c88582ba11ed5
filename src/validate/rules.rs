//! Rule table of the VM settings page.
//!
//! Names follow the Azure restrictions for Windows computer names:
//! 1 to 15 characters, not only digits, no leading underscore, no trailing
//! period or hyphen, none of [`SPECIAL_CHARACTERS`]. Administrator usernames
//! are 1 to 20 characters from the same alphabet.

use super::{FormValidator, PasswordPolicy, ValidationRule};
use crate::constants::{MAX_USERNAME_LEN, MAX_VM_NAME_LEN};
use crate::model::FieldKey;
use std::sync::Arc;

/// Characters not allowed in VM names and usernames.
pub const SPECIAL_CHARACTERS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

fn has_special_character(value: &str) -> bool {
    value.chars().any(|c| SPECIAL_CHARACTERS.contains(c))
}

fn length_within(value: &str, max: usize) -> bool {
    (1..=max).contains(&value.chars().count())
}

/// Builds the validator run before leaving the VM settings page.
///
/// Rules are registered in the order their messages are reported: name,
/// username, password policy, password confirmation, size.
#[must_use]
pub fn vm_settings_validator(policy: Arc<dyn PasswordPolicy>) -> FormValidator {
    FormValidator::new()
        .with_rule(ValidationRule::new(
            FieldKey::VmName,
            "Virtual machine name must be between 1 and 15 characters long.",
            |model| length_within(model.get(FieldKey::VmName), MAX_VM_NAME_LEN),
        ))
        .with_rule(ValidationRule::new(
            FieldKey::VmName,
            "Virtual machine name cannot contain only numbers.",
            |model| {
                let name = model.get(FieldKey::VmName);
                name.is_empty() || !name.chars().all(|c| c.is_ascii_digit())
            },
        ))
        .with_rule(ValidationRule::new(
            FieldKey::VmName,
            "Virtual machine name Can't start with underscore. Can't end with period or hyphen",
            |model| {
                let name = model.get(FieldKey::VmName);
                !(name.starts_with('_') || name.ends_with('.') || name.ends_with('-'))
            },
        ))
        .with_rule(ValidationRule::new(
            FieldKey::VmName,
            r#"Virtual machine name cannot contain special characters \/""[]:|<>+=;,?* ."#,
            |model| !has_special_character(model.get(FieldKey::VmName)),
        ))
        .with_rule(ValidationRule::new(
            FieldKey::AdminUsername,
            "Username must be between 1 and 20 characters long.",
            |model| length_within(model.get(FieldKey::AdminUsername), MAX_USERNAME_LEN),
        ))
        .with_rule(ValidationRule::new(
            FieldKey::AdminUsername,
            r#"Username cannot contain special characters \/""[]:|<>+=;,?* ."#,
            |model| !has_special_character(model.get(FieldKey::AdminUsername)),
        ))
        .with_rule(ValidationRule::delegated(FieldKey::AdminPassword, move |model| {
            policy.check(model.get(FieldKey::AdminPassword))
        }))
        .with_rule(ValidationRule::new(
            FieldKey::ConfirmPassword,
            "Password and confirm password must match.",
            |model| model.get(FieldKey::ConfirmPassword) == model.get(FieldKey::AdminPassword),
        ))
        .with_rule(ValidationRule::new(
            FieldKey::VmSize,
            "Select a virtual machine size.",
            |model| !model.get(FieldKey::VmSize).is_empty(),
        ))
}
