//! Ordered token-substitution tables for label derivation.
//!
//! A table is data: a list of `(pattern, replacement)` pairs applied to the
//! raw id from left to right. Every rule runs, so an id may be rewritten by
//! several rules in sequence; each rule replaces only the first match.
//!
//! The default image table turns offer ids into readable names:
//!
//! | # | pattern      | replacement                             |
//! |---|--------------|-----------------------------------------|
//! | 1 | `^sql(.*?)-` | `SQL Server ${1} on ` (capture uppercased) |
//! | 2 | `ws`         | `Windows Server `                       |
//! | 3 | `ubuntu`     | `Ubuntu Server `                        |
//! | 4 | `sles`       | `SUSE Linux Enterprise Server (SLES) `  |
//! | 5 | `rhel`       | `Red Hat Enterprise Linux `             |

use crate::core::WizardError;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Serializable form of one substitution rule, as written in config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionSpec {
    /// Regular expression matched against the current label text
    pub pattern: String,
    /// Replacement; `${n}` refers to capture group `n`
    pub replacement: String,
    /// Uppercase the text of `${n}` captures before substituting
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub uppercase_captures: bool,
}

impl SubstitutionSpec {
    /// Creates a rule with a literal replacement.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            uppercase_captures: false,
        }
    }

    /// Marks the rule's captures for uppercasing.
    #[must_use]
    pub const fn uppercased(mut self) -> Self {
        self.uppercase_captures = true;
        self
    }
}

/// The substitution table used for SQL Server image offers.
#[must_use]
pub fn default_image_labels() -> Vec<SubstitutionSpec> {
    vec![
        SubstitutionSpec::new("^sql(.*?)-", "SQL Server ${1} on ").uppercased(),
        SubstitutionSpec::new("ws", "Windows Server "),
        SubstitutionSpec::new("ubuntu", "Ubuntu Server "),
        SubstitutionSpec::new("sles", "SUSE Linux Enterprise Server (SLES) "),
        SubstitutionSpec::new("rhel", "Red Hat Enterprise Linux "),
    ]
}

/// A compiled substitution rule.
#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: Regex,
    replacement: String,
    uppercase_captures: bool,
}

impl Substitution {
    /// Compiles `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::ConfigError`] if the pattern is not a valid
    /// regular expression.
    pub fn compile(spec: &SubstitutionSpec) -> Result<Self, WizardError> {
        let pattern = Regex::new(&spec.pattern).map_err(|e| WizardError::ConfigError {
            message: format!("Invalid label pattern '{}': {e}", spec.pattern),
        })?;
        Ok(Self {
            pattern,
            replacement: spec.replacement.clone(),
            uppercase_captures: spec.uppercase_captures,
        })
    }

    /// Rewrites the first match of the pattern in `input`.
    #[must_use]
    pub fn apply(&self, input: &str) -> String {
        if !self.uppercase_captures {
            return self.pattern.replacen(input, 1, self.replacement.as_str()).into_owned();
        }

        self.pattern
            .replacen(input, 1, |caps: &Captures<'_>| {
                let mut template = self.replacement.clone();
                for i in 1..caps.len() {
                    let text = caps.get(i).map_or("", |m| m.as_str()).to_uppercase();
                    template = template.replace(&format!("${{{i}}}"), &text.replace('$', "$$"));
                }
                let mut expanded = String::new();
                caps.expand(&template, &mut expanded);
                expanded
            })
            .into_owned()
    }
}

/// An ordered list of compiled substitutions.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionTable {
    rules: Vec<Substitution>,
    lowercase: bool,
}

impl SubstitutionTable {
    /// Compiles every rule of `specs`, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns the first pattern compilation error.
    pub fn compile(specs: &[SubstitutionSpec]) -> Result<Self, WizardError> {
        let rules = specs.iter().map(Substitution::compile).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            rules,
            lowercase: false,
        })
    }

    /// Lowercases the id before the first rule runs.
    #[must_use]
    pub const fn lowercase_input(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Runs every rule over `id` in order.
    #[must_use]
    pub fn apply(&self, id: &str) -> String {
        let start = if self.lowercase {
            id.to_lowercase()
        } else {
            id.to_string()
        };
        self.rules.iter().fold(start, |label, rule| rule.apply(&label))
    }
}
