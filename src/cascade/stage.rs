//! Stage definitions: which model key a field feeds, where its options come
//! from and how they are formatted.

use crate::catalog::{CatalogPaths, CatalogScope};
use crate::format::FormatRules;
use crate::model::FieldKey;
use std::fmt;

type PathBuilder = Box<dyn Fn(&CatalogScope, &[String]) -> String + Send + Sync>;

/// One link of a cascade.
///
/// The path builder receives the catalog scope and the resolved selections
/// of every earlier stage, in stage order.
pub struct Stage {
    key: FieldKey,
    rules: FormatRules,
    path: PathBuilder,
}

impl Stage {
    /// Creates a stage feeding `key`.
    pub fn new(
        key: FieldKey,
        rules: FormatRules,
        path: impl Fn(&CatalogScope, &[String]) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            key,
            rules,
            path: Box::new(path),
        }
    }

    /// Model key the stage's selection is written to.
    #[must_use]
    pub const fn key(&self) -> FieldKey {
        self.key
    }

    /// Formatting rules for the stage's options.
    #[must_use]
    pub const fn rules(&self) -> &FormatRules {
        &self.rules
    }

    /// Catalog path for the given scope and predecessor selections.
    #[must_use]
    pub fn path(&self, scope: &CatalogScope, parents: &[String]) -> String {
        (self.path)(scope, parents)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage").field("key", &self.key).field("rules", &self.rules).finish()
    }
}

/// The image cascade: offer, then SKU of the offer, then version of the SKU.
#[must_use]
pub fn image_stages(paths: &CatalogPaths, image_rules: FormatRules) -> Vec<Stage> {
    let images = paths.clone();
    let skus = paths.clone();
    let versions = paths.clone();
    vec![
        Stage::new(FieldKey::Image, image_rules, move |scope, _| images.images(scope)),
        Stage::new(FieldKey::ImageSku, FormatRules::identity(), move |scope, parents| {
            skus.skus(scope, &parents[0])
        }),
        Stage::new(FieldKey::ImageVersion, FormatRules::identity(), move |scope, parents| {
            versions.versions(scope, &parents[0], &parents[1])
        }),
    ]
}

/// The size "cascade": a single stage with no predecessors.
#[must_use]
pub fn size_stages(paths: &CatalogPaths) -> Vec<Stage> {
    let sizes = paths.clone();
    vec![Stage::new(FieldKey::VmSize, FormatRules::vm_sizes(), move |scope, _| sizes.sizes(scope))]
}
