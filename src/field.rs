//! State of one dropdown-backed field.
//!
//! A [`DependentField`] holds the option set, the selected id, the loading
//! flag and a generation counter. The counter is bumped on every
//! invalidation; a catalog response is tagged with the generation it was
//! requested for and is only applied while that generation is current.
//!
//! While `loading` is true the option set is stale (empty) but the selected
//! id is retained, so the selection survives a refetch when the new option
//! set still contains it. Consumers must check `loading` before trusting
//! `selected_id` against `options`.

use crate::format::SelectOption;
use serde::Serialize;

/// Result of a successful [`DependentField::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The id is now the field's selection
    Applied,
    /// The field is loading; the id is retained and wins if the incoming
    /// option set contains it
    Pending,
}

/// Selecting an id the field does not offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSelection {
    /// The rejected id
    pub id: String,
}

/// One field's options, selection and loading state.
#[derive(Debug, Clone, Default)]
pub struct DependentField {
    options: Vec<SelectOption>,
    selected_id: String,
    loading: bool,
    generation: u64,
}

impl DependentField {
    /// Creates an empty, idle field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current options; stale while [`Self::is_loading`].
    #[must_use]
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// Selected id, or `""` when nothing is selected.
    #[must_use]
    pub fn selected_id(&self) -> &str {
        &self.selected_id
    }

    /// True between [`Self::invalidate`] and the next resolution.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Generation of the most recent invalidation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The option currently selected, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&SelectOption> {
        self.options.iter().find(|option| option.id == self.selected_id)
    }

    fn offers(&self, id: &str) -> bool {
        self.options.iter().any(|option| option.id == id)
    }

    /// Replaces the option set and clears the loading flag.
    ///
    /// A selection still offered by `options` is kept; otherwise the first
    /// option is selected, or nothing when `options` is empty.
    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
        self.loading = false;
        if !self.offers(&self.selected_id) {
            self.selected_id = self
                .options
                .first()
                .map(|option| option.id.clone())
                .unwrap_or_default();
        }
    }

    /// Marks the options stale and returns the new generation.
    ///
    /// The selected id is retained until the next [`Self::set_options`].
    pub fn invalidate(&mut self) -> u64 {
        self.loading = true;
        self.options.clear();
        self.generation += 1;
        self.generation
    }

    /// Selects `id`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSelection`] when the field is idle and does not offer
    /// `id`. While loading, any id is accepted as pending.
    pub fn select(&mut self, id: &str) -> Result<Selection, InvalidSelection> {
        if self.loading {
            self.selected_id = id.to_string();
            return Ok(Selection::Pending);
        }
        if !self.offers(id) {
            return Err(InvalidSelection { id: id.to_string() });
        }
        self.selected_id = id.to_string();
        Ok(Selection::Applied)
    }

    /// Resolves a failed lookup: idle, no options, no selection.
    pub fn fail(&mut self) {
        self.options.clear();
        self.selected_id.clear();
        self.loading = false;
    }

    /// Resolves to empty without a lookup and invalidates any lookup in
    /// flight for this field.
    pub fn settle_empty(&mut self) {
        self.generation += 1;
        self.fail();
    }

    /// Read-only copy for rendering.
    #[must_use]
    pub fn view(&self) -> FieldView {
        FieldView {
            options: self.options.clone(),
            selected_id: self.selected_id.clone(),
            loading: self.loading,
        }
    }
}

/// Plain data a host renders as a dropdown with a loading spinner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldView {
    /// Options to list
    pub options: Vec<SelectOption>,
    /// Id to show as selected
    pub selected_id: String,
    /// Whether to show the spinner
    pub loading: bool,
}
