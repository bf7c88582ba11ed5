//! Cascading dependent fields.
//!
//! A [`CascadeController`] owns an ordered chain of [`DependentField`]s
//! `F0..Fn`, where `Fi` is populated from a catalog path built from the
//! selections of `F0..F(i-1)`. When `Fk` changes:
//!
//! 1. `F(k+1)..Fn` are invalidated in one pass under one lock, before any
//!    lookup is dispatched;
//! 2. the catalog is queried for `F(k+1)` only, tagged with the field's
//!    generation at dispatch time;
//! 3. when the response arrives it is applied only if the field's generation
//!    still equals the tag, otherwise it is dropped;
//! 4. applying it resolves `F(k+1)` and continues the chain with `F(k+2)`.
//!
//! Stages therefore resolve strictly left to right, and of two lookups in
//! flight for the same field the one dispatched last wins, whatever order
//! the responses arrive in.
//!
//! Failures stop the chain: the failing field becomes idle and empty, the
//! fields after it stay invalidated, and the error is returned to the caller.
//! A `NotFound` response counts as an empty option set, not a failure.
//!
//! The controller is a cheap clonable handle. Field state lives behind a
//! mutex that is never held across an await, so several logical cascades can
//! be in flight at once on any tokio runtime.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vmwiz::cascade::{CascadeController, image_stages};
//! use vmwiz::catalog::{ArmCatalogClient, CatalogPaths};
//! use vmwiz::config::WizardConfig;
//! use vmwiz::format::FormatRules;
//! use vmwiz::model::{FieldKey, ModelHandle};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = WizardConfig::default();
//! let client = Arc::new(ArmCatalogClient::from_config(&config.catalog, None)?);
//! let model = ModelHandle::default();
//! let stages = image_stages(&CatalogPaths::new(&config.catalog), FormatRules::default_images()?);
//!
//! let cascade = CascadeController::new("image", client, model.clone(), stages);
//! cascade.initialize().await?;
//! println!("image: {}", model.get(FieldKey::Image));
//! # Ok(())
//! # }
//! ```

mod stage;

pub use stage::{Stage, image_stages, size_stages};

use crate::catalog::{CatalogClient, RawEntry};
use crate::core::{CatalogError, WizardError};
use crate::field::{DependentField, FieldView, Selection};
use crate::format::format;
use crate::model::{FieldKey, ModelHandle};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// A lookup dispatched for one stage.
#[derive(Debug)]
struct Ticket {
    stage: usize,
    generation: u64,
    path: String,
}

enum Dispatch {
    Fetch(Ticket),
    Done,
}

enum Applied {
    Continue(usize),
    Stale,
}

struct Inner {
    name: String,
    client: Arc<dyn CatalogClient>,
    model: ModelHandle,
    stages: Vec<Stage>,
    fields: Mutex<Vec<DependentField>>,
}

/// Handle to a cascade of dependent fields.
#[derive(Clone)]
pub struct CascadeController {
    inner: Arc<Inner>,
}

impl CascadeController {
    /// Creates a cascade over `stages`; every field starts idle and empty.
    pub fn new(
        name: impl Into<String>,
        client: Arc<dyn CatalogClient>,
        model: ModelHandle,
        stages: Vec<Stage>,
    ) -> Self {
        let fields = stages.iter().map(|_| DependentField::new()).collect();
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                client,
                model,
                stages,
                fields: Mutex::new(fields),
            }),
        }
    }

    /// Name used in log output.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.stages.len()
    }

    /// True for a cascade without stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.stages.is_empty()
    }

    /// Index of the stage feeding `key`.
    #[must_use]
    pub fn stage_of(&self, key: FieldKey) -> Option<usize> {
        self.inner.stages.iter().position(|stage| stage.key() == key)
    }

    fn fields(&self) -> MutexGuard<'_, Vec<DependentField>> {
        self.inner.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Populates the first field and cascades through all the others.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Catalog`] for the first stage whose lookup
    /// fails.
    pub async fn initialize(&self) -> Result<(), WizardError> {
        debug!("[{}] initializing {} stage(s)", self.inner.name, self.len());
        self.resolve_from(0).await
    }

    /// Re-resolves every field after `stage`.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::UnknownField`] for an out-of-range stage and
    /// [`WizardError::Catalog`] for the first downstream lookup that fails.
    pub async fn on_field_changed(&self, stage: usize) -> Result<(), WizardError> {
        if stage >= self.len() {
            return Err(WizardError::UnknownField {
                field: format!("{} stage {stage}", self.inner.name),
            });
        }
        self.resolve_from(stage + 1).await
    }

    /// Selects `id` in `stage` and re-resolves the fields after it.
    ///
    /// Selecting the id that is already selected does nothing. While the
    /// field is loading the id is kept as a pending selection and no lookup is
    /// started; the lookup in flight continues the chain.
    ///
    /// A field after a failed stage also reports loading, but nothing is in
    /// flight for it. A pending selection there only takes effect once an
    /// earlier stage is re-resolved, e.g. through [`Self::on_field_changed`].
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::InvalidSelection`] if the idle field does not
    /// offer `id`, plus any error of [`Self::on_field_changed`].
    pub async fn select(&self, stage: usize, id: &str) -> Result<Selection, WizardError> {
        let changed = {
            let mut fields = self.fields();
            let Some(field) = fields.get_mut(stage) else {
                return Err(WizardError::UnknownField {
                    field: format!("{} stage {stage}", self.inner.name),
                });
            };
            let key = self.inner.stages[stage].key();
            let previous = field.selected_id().to_string();

            match field.select(id) {
                Ok(Selection::Pending) => {
                    debug!(
                        "[{}] {} = '{}' pending until stage {} resolves",
                        self.inner.name, key, id, stage
                    );
                    return Ok(Selection::Pending);
                }
                Ok(Selection::Applied) => {
                    self.inner.model.set(key, id);
                    previous != id
                }
                Err(e) => {
                    return Err(WizardError::InvalidSelection {
                        field: key.label().to_string(),
                        id: e.id,
                    });
                }
            }
        };

        if changed {
            self.on_field_changed(stage).await?;
        }
        Ok(Selection::Applied)
    }

    /// [`Self::select`] addressed by model key.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::UnknownField`] if no stage feeds `key`.
    pub async fn select_key(&self, key: FieldKey, id: &str) -> Result<Selection, WizardError> {
        let stage = self.stage_of(key).ok_or_else(|| WizardError::UnknownField {
            field: key.to_string(),
        })?;
        self.select(stage, id).await
    }

    /// Render data for every field, in stage order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(FieldKey, FieldView)> {
        let fields = self.fields();
        self.inner
            .stages
            .iter()
            .zip(fields.iter())
            .map(|(stage, field)| (stage.key(), field.view()))
            .collect()
    }

    async fn resolve_from(&self, mut start: usize) -> Result<(), WizardError> {
        loop {
            let ticket = match self.dispatch(start) {
                Dispatch::Fetch(ticket) => ticket,
                Dispatch::Done => return Ok(()),
            };

            debug!(
                "[{}] fetching stage {} (generation {}): {}",
                self.inner.name, ticket.stage, ticket.generation, ticket.path
            );
            let result = self.inner.client.fetch(&ticket.path).await;

            match self.apply(&ticket, result)? {
                Applied::Continue(next) => start = next,
                Applied::Stale => return Ok(()),
            }
        }
    }

    /// Invalidates `start..n` and builds the lookup for `start`.
    ///
    /// Runs entirely under the field lock. If an earlier stage has no
    /// selection there is nothing to look up: the remaining fields settle to
    /// empty instead.
    fn dispatch(&self, start: usize) -> Dispatch {
        if start >= self.len() {
            return Dispatch::Done;
        }
        let scope = self.inner.model.scope();

        let mut fields = self.fields();
        for field in &mut fields[start..] {
            field.invalidate();
        }

        let parents: Vec<String> =
            fields[..start].iter().map(|field| field.selected_id().to_string()).collect();
        if parents.iter().any(String::is_empty) {
            debug!("[{}] stage {} has no parent selection, settling empty", self.inner.name, start);
            for (stage, field) in self.inner.stages[start..].iter().zip(&mut fields[start..]) {
                field.settle_empty();
                self.inner.model.set(stage.key(), "");
            }
            return Dispatch::Done;
        }

        Dispatch::Fetch(Ticket {
            stage: start,
            generation: fields[start].generation(),
            path: self.inner.stages[start].path(&scope, &parents),
        })
    }

    /// Applies a lookup result if its ticket is still current.
    fn apply(
        &self,
        ticket: &Ticket,
        result: Result<Vec<RawEntry>, CatalogError>,
    ) -> Result<Applied, WizardError> {
        let stage = &self.inner.stages[ticket.stage];
        let mut fields = self.fields();
        let field = &mut fields[ticket.stage];

        if field.generation() != ticket.generation {
            debug!(
                "[{}] discarding stale response for stage {} (generation {}, current {})",
                self.inner.name,
                ticket.stage,
                ticket.generation,
                field.generation()
            );
            return Ok(Applied::Stale);
        }

        match result {
            Ok(raw) => field.set_options(format(raw, stage.rules())),
            Err(e) if e.is_not_found() => {
                debug!("[{}] {} not found, no options", self.inner.name, ticket.path);
                field.set_options(Vec::new());
            }
            Err(e) => {
                warn!("[{}] failed to load {}: {}", self.inner.name, stage.key(), e);
                field.fail();
                for stage in &self.inner.stages[ticket.stage..] {
                    self.inner.model.set(stage.key(), "");
                }
                return Err(WizardError::Catalog {
                    field: stage.key().label().to_string(),
                    source: e,
                });
            }
        }

        debug!(
            "[{}] stage {} resolved with {} option(s), selected '{}'",
            self.inner.name,
            ticket.stage,
            field.options().len(),
            field.selected_id()
        );
        self.inner.model.set(stage.key(), field.selected_id());
        Ok(Applied::Continue(ticket.stage + 1))
    }
}

impl std::fmt::Debug for CascadeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeController")
            .field("name", &self.inner.name)
            .field("stages", &self.inner.stages)
            .finish_non_exhaustive()
    }
}
