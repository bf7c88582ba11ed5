//! Option formatting: raw catalog entries to display-ready options.
//!
//! [`format`] is a pure function. It applies, in this order:
//!
//! 1. the caller's [`EntryOrder`] to the raw entries;
//! 2. the resource-type filter and the exclusion patterns;
//! 3. the [`LabelRule`] to each surviving entry.
//!
//! The output keeps the order established in step 1; nothing is re-sorted
//! after labels are derived. An empty input is not an error.
//!
//! # Examples
//!
//! ```rust
//! use vmwiz::catalog::RawEntry;
//! use vmwiz::format::{FormatRules, format};
//!
//! let rules = FormatRules::default_images().unwrap();
//! let options = format(
//!     vec![RawEntry::named("SQL2019-byol-ubuntu"), RawEntry::named("sql2019-ws2019")],
//!     &rules,
//! );
//! assert_eq!(options.len(), 1);
//! assert_eq!(options[0].label, "SQL Server 2019 on Windows Server 2019");
//! ```

mod size;
mod substitution;

pub use size::vm_size_label;
pub use substitution::{Substitution, SubstitutionSpec, SubstitutionTable, default_image_labels};

use crate::catalog::RawEntry;
use crate::constants::VM_RESOURCE_TYPE;
use crate::core::WizardError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// The catalog's canonical key
    pub id: String,
    /// Display text
    pub label: String,
}

impl SelectOption {
    /// Creates an option.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Order applied to raw entries before they are formatted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrder {
    /// Keep the catalog's order
    #[default]
    AsReturned,
    /// Reverse the catalog's order (newest offers first)
    Reversed,
    /// Sort by entry name
    ByName,
}

/// How an option's label is derived from its raw entry.
#[derive(Debug, Clone, Default)]
pub enum LabelRule {
    /// The label is the id
    #[default]
    Identity,
    /// The id rewritten by a substitution table
    Substitutions(SubstitutionTable),
    /// Name plus core, memory and disk capabilities of a compute SKU
    VmSize,
}

/// Everything [`format`] needs to know about one field.
#[derive(Debug, Clone, Default)]
pub struct FormatRules {
    /// Order applied before formatting
    pub order: EntryOrder,
    /// Entries whose id matches any of these are dropped
    pub exclude: Vec<Regex>,
    /// When set, only entries of this resource type are kept
    pub resource_type: Option<String>,
    /// Label derivation
    pub label: LabelRule,
}

impl FormatRules {
    /// Rules that keep every entry in catalog order and use the id as label.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Rules for SQL Server image offers: newest first, bring-your-own-license
    /// offers excluded, labels from `labels` applied to the lowercased id.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::ConfigError`] if a pattern does not compile.
    pub fn images(exclude: &[String], labels: &[SubstitutionSpec]) -> Result<Self, WizardError> {
        let table = SubstitutionTable::compile(labels)?.lowercase_input(true);
        let mut rules = Self {
            order: EntryOrder::Reversed,
            label: LabelRule::Substitutions(table),
            ..Self::default()
        };
        for pattern in exclude {
            rules = rules.with_exclusion(pattern)?;
        }
        Ok(rules)
    }

    /// [`Self::images`] with the built-in exclusion and label table.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the built-in patterns are valid.
    pub fn default_images() -> Result<Self, WizardError> {
        Self::images(&["-byol".to_string()], &default_image_labels())
    }

    /// Rules for compute SKUs: virtual machines only, sorted by name, with
    /// capability labels.
    #[must_use]
    pub fn vm_sizes() -> Self {
        Self {
            order: EntryOrder::ByName,
            resource_type: Some(VM_RESOURCE_TYPE.to_string()),
            label: LabelRule::VmSize,
            ..Self::default()
        }
    }

    /// Sets the entry order.
    #[must_use]
    pub const fn with_order(mut self, order: EntryOrder) -> Self {
        self.order = order;
        self
    }

    /// Adds an exclusion pattern.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::ConfigError`] if `pattern` does not compile.
    pub fn with_exclusion(mut self, pattern: &str) -> Result<Self, WizardError> {
        let regex = Regex::new(pattern).map_err(|e| WizardError::ConfigError {
            message: format!("Invalid exclusion pattern '{pattern}': {e}"),
        })?;
        self.exclude.push(regex);
        Ok(self)
    }

    fn keeps(&self, entry: &RawEntry) -> bool {
        let type_matches = self
            .resource_type
            .as_deref()
            .is_none_or(|wanted| entry.resource_type.as_deref() == Some(wanted));
        type_matches
            && !self.exclude.iter().any(|pattern| pattern.is_match(&entry.name))
    }

    fn label(&self, entry: &RawEntry) -> Option<String> {
        match &self.label {
            LabelRule::Identity => Some(entry.name.clone()),
            LabelRule::Substitutions(table) => Some(table.apply(&entry.name)),
            LabelRule::VmSize => vm_size_label(entry),
        }
    }
}

/// Formats raw catalog entries into options.
#[must_use]
pub fn format(mut raw: Vec<RawEntry>, rules: &FormatRules) -> Vec<SelectOption> {
    match rules.order {
        EntryOrder::AsReturned => {}
        EntryOrder::Reversed => raw.reverse(),
        EntryOrder::ByName => raw.sort_by(|a, b| a.name.cmp(&b.name)),
    }

    raw.into_iter()
        .filter(|entry| rules.keeps(entry))
        .filter_map(|entry| {
            let label = rules.label(&entry)?;
            Some(SelectOption {
                id: entry.name,
                label,
            })
        })
        .collect()
}
