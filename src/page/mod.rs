//! The VM settings page.
//!
//! [`VmSettingsPage`] wires the pieces together: one [`ModelHandle`], the
//! image cascade (image, SKU, version), the independent single-stage size
//! cascade and the settings validator. The host drives it:
//!
//! 1. [`VmSettingsPage::enter`] when the page is shown, which populates both
//!    cascades concurrently;
//! 2. [`VmSettingsPage::set_value`] and [`VmSettingsPage::select`] as the user
//!    edits fields;
//! 3. [`VmSettingsPage::on_navigate`] when the user tries to leave.
//!
//! Rendering is the host's concern; it reads [`VmSettingsPage::snapshot`]
//! and the validator messages.

use crate::cascade::{CascadeController, image_stages, size_stages};
use crate::catalog::{CatalogClient, CatalogPaths};
use crate::config::WizardConfig;
use crate::core::WizardError;
use crate::field::{FieldView, Selection};
use crate::model::{FieldKey, FormModel, ModelHandle};
use crate::validate::{FormValidator, PasswordPolicy, vm_settings_validator};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Leave the page
    Allow,
    /// Stay on the page and show these messages
    Block(Vec<String>),
}

impl NavigationDecision {
    /// True for [`Self::Allow`].
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// State and behaviour of the VM settings page.
pub struct VmSettingsPage {
    model: ModelHandle,
    images: CascadeController,
    sizes: CascadeController,
    validator: FormValidator,
}

impl VmSettingsPage {
    /// Builds the page with the scope from `config` as its initial model.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::ConfigError`] if the `[images]` patterns do not
    /// compile.
    pub fn new(
        config: &WizardConfig,
        client: Arc<dyn CatalogClient>,
        policy: Arc<dyn PasswordPolicy>,
    ) -> Result<Self, WizardError> {
        let scope = config.scope();
        let model = FormModel::new()
            .with(FieldKey::Subscription, scope.subscription)
            .with(FieldKey::Region, scope.region);
        Self::with_model(config, client, policy, model)
    }

    /// Builds the page around an existing model, e.g. loaded from a
    /// settings file.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn with_model(
        config: &WizardConfig,
        client: Arc<dyn CatalogClient>,
        policy: Arc<dyn PasswordPolicy>,
        model: FormModel,
    ) -> Result<Self, WizardError> {
        let paths = CatalogPaths::new(&config.catalog);
        let model = ModelHandle::new(model);

        let images = CascadeController::new(
            "image",
            client.clone(),
            model.clone(),
            image_stages(&paths, config.images.rules()?),
        );
        let sizes = CascadeController::new("size", client, model.clone(), size_stages(&paths));

        Ok(Self {
            model,
            images,
            sizes,
            validator: vm_settings_validator(policy),
        })
    }

    /// Populates both cascades concurrently.
    ///
    /// Each cascade runs to completion or to its first failure independently
    /// of the other. Returns the failures, image cascade first; empty when
    /// every field resolved.
    pub async fn enter(&self) -> Vec<WizardError> {
        let scope = self.model.scope();
        info!("Loading options for {} in {}", scope.subscription, scope.region);

        let (images, sizes) = tokio::join!(self.images.initialize(), self.sizes.initialize());
        [(&self.images, images), (&self.sizes, sizes)]
            .into_iter()
            .filter_map(|(cascade, result)| {
                let error = result.err()?;
                debug!("{} options failed to load: {}", cascade.name(), error);
                Some(error)
            })
            .collect()
    }

    fn cascade_for(&self, key: FieldKey) -> Option<&CascadeController> {
        [&self.images, &self.sizes].into_iter().find(|cascade| cascade.stage_of(key).is_some())
    }

    /// Writes a free-text field.
    ///
    /// Dropdown-backed keys are routed to [`Self::select`]. Changing the
    /// subscription or the region re-populates both cascades, since every
    /// lookup is scoped by them.
    ///
    /// # Errors
    ///
    /// Returns the error of [`Self::select`] for dropdown keys, or the first
    /// cascade failure after a scope change.
    pub async fn set_value(&self, key: FieldKey, value: &str) -> Result<(), WizardError> {
        if self.cascade_for(key).is_some() {
            return self.select(key, value).await.map(|_| ());
        }

        let previous = self.model.get(key);
        self.model.set(key, value);

        let scope_changed = matches!(key, FieldKey::Subscription | FieldKey::Region);
        if scope_changed && previous != value {
            debug!("{} changed, reloading options", key);
            let mut errors = self.enter().await.into_iter();
            if let Some(first) = errors.next() {
                for other in errors {
                    warn!("{}", other);
                }
                return Err(first);
            }
        }
        Ok(())
    }

    /// Selects `id` in the dropdown feeding `key`.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::UnknownField`] if no dropdown feeds `key`,
    /// otherwise whatever the owning cascade reports.
    pub async fn select(&self, key: FieldKey, id: &str) -> Result<Selection, WizardError> {
        let cascade = self.cascade_for(key).ok_or_else(|| WizardError::UnknownField {
            field: key.to_string(),
        })?;
        cascade.select_key(key, id).await
    }

    /// Handle to the page's model.
    #[must_use]
    pub fn model(&self) -> ModelHandle {
        self.model.clone()
    }

    /// Render data for every dropdown: image fields, then size.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(FieldKey, FieldView)> {
        let mut views = self.images.snapshot();
        views.extend(self.sizes.snapshot());
        views
    }

    /// Runs the validator against the current model.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        self.model.read(|model| self.validator.validate(model))
    }

    /// Navigation checkpoint.
    ///
    /// Moving back never validates. Moving forward is blocked while the
    /// validator reports anything.
    #[must_use]
    pub fn on_navigate(&self, last_page: usize, new_page: usize) -> NavigationDecision {
        if new_page < last_page {
            return NavigationDecision::Allow;
        }

        let messages = self.validate();
        if messages.is_empty() {
            NavigationDecision::Allow
        } else {
            debug!(
                "Navigation {} -> {} blocked by {} problem(s)",
                last_page,
                new_page,
                messages.len()
            );
            NavigationDecision::Block(messages)
        }
    }
}

impl std::fmt::Debug for VmSettingsPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VmSettingsPage")
            .field("images", &self.images)
            .field("sizes", &self.sizes)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogScope, RawEntry};
    use crate::core::CatalogError;
    use crate::test_utils::{MockCatalog, init_test_logging};
    use crate::validate::ComplexityPolicy;

    struct Fixture {
        catalog: Arc<MockCatalog>,
        paths: CatalogPaths,
        page: VmSettingsPage,
    }

    fn config() -> WizardConfig {
        let mut config = WizardConfig::default();
        config.scope.subscription = "sub".to_string();
        config.scope.region = "eastus".to_string();
        config
    }

    fn scope(region: &str) -> CatalogScope {
        CatalogScope {
            subscription: "sub".to_string(),
            region: region.to_string(),
        }
    }

    fn d2s_v3() -> RawEntry {
        RawEntry::named("Standard_D2s_v3")
            .with_resource_type("virtualMachines")
            .with_capability("vCPUs", "2")
            .with_capability("MemoryGB", "8")
            .with_capability("MaxDataDiskCount", "4")
            .with_capability("MaxResourceVolumeMB", "16384")
    }

    fn script(catalog: &MockCatalog, paths: &CatalogPaths, region: &str) {
        let scope = scope(region);
        catalog.respond_names(&paths.images(&scope), &["sql2017-ws2016", "sql2019-ws2019"]);
        catalog.respond_names(&paths.skus(&scope, "sql2019-ws2019"), &["enterprise", "standard"]);
        catalog.respond_names(&paths.versions(&scope, "sql2019-ws2019", "enterprise"), &["15.0.1"]);
        catalog.respond_names(&paths.skus(&scope, "sql2017-ws2016"), &["web"]);
        catalog.respond_names(&paths.versions(&scope, "sql2017-ws2016", "web"), &["14.0.1"]);
        catalog.respond(&paths.sizes(&scope), vec![d2s_v3()]);
    }

    fn fixture() -> Fixture {
        init_test_logging(None);
        let config = config();
        let catalog = Arc::new(MockCatalog::new());
        let paths = CatalogPaths::new(&config.catalog);
        script(&catalog, &paths, "eastus");
        let page =
            VmSettingsPage::new(&config, catalog.clone(), Arc::new(ComplexityPolicy::default()))
                .unwrap();
        Fixture {
            catalog,
            paths,
            page,
        }
    }

    async fn fill_text_fields(page: &VmSettingsPage) {
        for (key, value) in [
            (FieldKey::VmName, "sqlvm01"),
            (FieldKey::AdminUsername, "sqladmin"),
            (FieldKey::AdminPassword, "Str0ng!Passw0rd"),
            (FieldKey::ConfirmPassword, "Str0ng!Passw0rd"),
        ] {
            page.set_value(key, value).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_enter_populates_both_cascades() {
        let fx = fixture();
        assert!(fx.page.enter().await.is_empty());

        let model = fx.page.model();
        // Offers are listed newest first.
        assert_eq!(model.get(FieldKey::Image), "sql2019-ws2019");
        assert_eq!(model.get(FieldKey::ImageSku), "enterprise");
        assert_eq!(model.get(FieldKey::ImageVersion), "15.0.1");
        assert_eq!(model.get(FieldKey::VmSize), "Standard_D2s_v3");

        let snapshot = fx.page.snapshot();
        let keys: Vec<FieldKey> = snapshot.iter().map(|(key, _)| *key).collect();
        assert_eq!(
            keys,
            vec![FieldKey::Image, FieldKey::ImageSku, FieldKey::ImageVersion, FieldKey::VmSize]
        );
        assert_eq!(
            snapshot[0].1.options[0].label,
            "SQL Server 2019 on Windows Server 2019"
        );
    }

    #[tokio::test]
    async fn test_select_is_routed_to_owning_cascade() {
        let fx = fixture();
        fx.page.enter().await;

        fx.page.select(FieldKey::Image, "sql2017-ws2016").await.unwrap();
        let model = fx.page.model();
        assert_eq!(model.get(FieldKey::ImageSku), "web");
        assert_eq!(model.get(FieldKey::ImageVersion), "14.0.1");
        assert_eq!(model.get(FieldKey::VmSize), "Standard_D2s_v3");

        assert!(matches!(
            fx.page.select(FieldKey::VmName, "x").await,
            Err(WizardError::UnknownField { .. })
        ));
    }

    #[tokio::test]
    async fn test_region_change_reloads_options() {
        let fx = fixture();
        fx.page.enter().await;
        script(&fx.catalog, &fx.paths, "westus");
        fx.catalog.clear_requests();

        fx.page.set_value(FieldKey::Region, "westus").await.unwrap();

        let requests = fx.catalog.requests();
        assert!(requests.contains(&fx.paths.images(&scope("westus"))));
        assert!(requests.contains(&fx.paths.sizes(&scope("westus"))));

        fx.catalog.clear_requests();
        fx.page.set_value(FieldKey::Region, "westus").await.unwrap();
        assert!(fx.catalog.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_reported_per_cascade() {
        let fx = fixture();
        fx.catalog.fail(
            &fx.paths.sizes(&scope("eastus")),
            CatalogError::NetworkError {
                path: "sizes".to_string(),
                reason: "connection reset".to_string(),
            },
        );

        let errors = fx.page.enter().await;
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], WizardError::Catalog { field, .. } if field == "Size"));
        // The image cascade is unaffected.
        assert_eq!(fx.page.model().get(FieldKey::ImageVersion), "15.0.1");
    }

    #[tokio::test]
    async fn test_empty_size_catalog_blocks_navigation() {
        let fx = fixture();
        fx.catalog.respond(&fx.paths.sizes(&scope("eastus")), Vec::new());
        fx.page.enter().await;
        fill_text_fields(&fx.page).await;

        let (_, size) = fx.page.snapshot().pop().unwrap();
        assert!(size.options.is_empty());
        assert_eq!(size.selected_id, "");
        assert!(!size.loading);

        assert_eq!(
            fx.page.on_navigate(1, 2),
            NavigationDecision::Block(vec!["Select a virtual machine size.".to_string()])
        );
    }

    #[tokio::test]
    async fn test_navigation_checkpoint() {
        let fx = fixture();
        fx.page.enter().await;

        // Backward navigation never validates.
        assert!(fx.page.on_navigate(2, 1).is_allowed());
        assert!(!fx.page.on_navigate(1, 2).is_allowed());

        fill_text_fields(&fx.page).await;
        assert!(fx.page.validate().is_empty());
        assert!(fx.page.on_navigate(1, 2).is_allowed());
    }
}
