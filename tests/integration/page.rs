//! The VM settings page driven through its public API.

use std::sync::Arc;
use std::time::Duration;
use vmwiz::catalog::{CatalogPaths, CatalogScope, RawEntry};
use vmwiz::config::WizardConfig;
use vmwiz::core::{CatalogError, WizardError};
use vmwiz::field::Selection;
use vmwiz::model::FieldKey;
use vmwiz::page::{NavigationDecision, VmSettingsPage};
use vmwiz::test_utils::{MockCatalog, init_test_logging};
use vmwiz::validate::ComplexityPolicy;

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    catalog: Arc<MockCatalog>,
    paths: CatalogPaths,
    scope: CatalogScope,
    page: Arc<VmSettingsPage>,
}

fn harness() -> Harness {
    init_test_logging(None);
    let mut config = WizardConfig::default();
    config.scope.subscription = "sub-1".to_string();
    config.scope.region = "eastus".to_string();

    let catalog = Arc::new(MockCatalog::new());
    let paths = CatalogPaths::new(&config.catalog);
    let scope = config.scope();

    catalog.respond_names(
        &paths.images(&scope),
        &["sql2017-ws2016", "sql2019-byol-ws2019", "sql2019-ubuntu1804", "sql2019-ws2019"],
    );
    for (image, skus) in [
        ("sql2019-ws2019", &["enterprise", "sqldev"][..]),
        ("sql2019-ubuntu1804", &["standard"][..]),
        ("sql2017-ws2016", &["web"][..]),
    ] {
        catalog.respond_names(&paths.skus(&scope, image), skus);
        for sku in skus {
            catalog.respond_names(&paths.versions(&scope, image, sku), &[format!("{sku}-1")]);
        }
    }
    catalog.respond(
        &paths.sizes(&scope),
        vec![
            RawEntry::named("Standard_E4s_v3")
                .with_resource_type("virtualMachines")
                .with_capability("vCPUs", "4")
                .with_capability("MemoryGB", "32")
                .with_capability("MaxDataDiskCount", "8")
                .with_capability("MaxResourceVolumeMB", "65536"),
            RawEntry::named("Standard_D2s_v3")
                .with_resource_type("virtualMachines")
                .with_capability("vCPUs", "2")
                .with_capability("MemoryGB", "8")
                .with_capability("MaxDataDiskCount", "4")
                .with_capability("MaxResourceVolumeMB", "16384"),
        ],
    );

    let page =
        VmSettingsPage::new(&config, catalog.clone(), Arc::new(ComplexityPolicy::default()))
            .unwrap();
    Harness {
        catalog,
        paths,
        scope,
        page: Arc::new(page),
    }
}

async fn fill_credentials(page: &VmSettingsPage) {
    page.set_value(FieldKey::VmName, "sqlvm01").await.unwrap();
    page.set_value(FieldKey::AdminUsername, "sqladmin").await.unwrap();
    page.set_value(FieldKey::AdminPassword, "Str0ng!Passw0rd").await.unwrap();
    page.set_value(FieldKey::ConfirmPassword, "Str0ng!Passw0rd").await.unwrap();
}

#[tokio::test]
async fn test_options_are_formatted_for_display() {
    let h = harness();
    assert!(h.page.enter().await.is_empty());

    let snapshot = h.page.snapshot();
    let images: Vec<&str> =
        snapshot[0].1.options.iter().map(|option| option.label.as_str()).collect();
    assert_eq!(
        images,
        vec![
            "SQL Server 2019 on Windows Server 2019",
            "SQL Server 2019 on Ubuntu Server 1804",
            "SQL Server 2017 on Windows Server 2016",
        ]
    );

    let sizes: Vec<&str> = snapshot[3].1.options.iter().map(|option| option.id.as_str()).collect();
    assert_eq!(sizes, vec!["Standard_D2s_v3", "Standard_E4s_v3"]);
    assert_eq!(
        snapshot[3].1.options[0].label,
        "Standard_D2s_v3\tCores: 2\tMemory: 8GB\tdiscCount: 4\tdiscSize: 16GB"
    );
}

#[tokio::test]
async fn test_sizes_resolve_while_image_cascade_is_blocked() {
    let h = harness();
    let held = h.catalog.hold(&h.paths.images(&h.scope));

    let page = h.page.clone();
    let entering = tokio::spawn(async move { page.enter().await });
    tokio::time::timeout(WAIT, h.catalog.wait_for_request(&h.paths.sizes(&h.scope)))
        .await
        .unwrap();

    // Wait until the size cascade has applied its response.
    tokio::time::timeout(WAIT, async {
        while h.page.model().get(FieldKey::VmSize).is_empty() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    assert!(h.page.snapshot()[0].1.loading);

    held.release_names(&["sql2019-ws2019"]);
    assert!(entering.await.unwrap().is_empty());
    assert_eq!(h.page.model().get(FieldKey::ImageVersion), "enterprise-1");
}

#[tokio::test]
async fn test_latest_image_selection_wins() {
    let h = harness();
    h.page.enter().await;

    let first = h.catalog.hold(&h.paths.skus(&h.scope, "sql2019-ubuntu1804"));
    let second = h.catalog.hold(&h.paths.skus(&h.scope, "sql2017-ws2016"));

    let page = h.page.clone();
    let to_ubuntu =
        tokio::spawn(async move { page.select(FieldKey::Image, "sql2019-ubuntu1804").await });
    tokio::time::timeout(
        WAIT,
        h.catalog.wait_for_request(&h.paths.skus(&h.scope, "sql2019-ubuntu1804")),
    )
    .await
    .unwrap();

    let page = h.page.clone();
    let to_2017 =
        tokio::spawn(async move { page.select(FieldKey::Image, "sql2017-ws2016").await });
    tokio::time::timeout(
        WAIT,
        h.catalog.wait_for_request(&h.paths.skus(&h.scope, "sql2017-ws2016")),
    )
    .await
    .unwrap();

    second.release_names(&["web"]);
    assert_eq!(to_2017.await.unwrap().unwrap(), Selection::Applied);
    first.release_names(&["standard"]);
    assert_eq!(to_ubuntu.await.unwrap().unwrap(), Selection::Applied);

    let model = h.page.model();
    assert_eq!(model.get(FieldKey::Image), "sql2017-ws2016");
    assert_eq!(model.get(FieldKey::ImageSku), "web");
    assert_eq!(model.get(FieldKey::ImageVersion), "web-1");
}

#[tokio::test]
async fn test_catalog_failure_keeps_page_usable() {
    let h = harness();
    h.page.enter().await;
    h.catalog.fail(
        &h.paths.versions(&h.scope, "sql2019-ws2019", "sqldev"),
        CatalogError::NetworkError {
            path: "versions".to_string(),
            reason: "timed out".to_string(),
        },
    );

    let err = h.page.select(FieldKey::ImageSku, "sqldev").await.unwrap_err();
    assert!(matches!(err, WizardError::Catalog { ref field, .. } if field == "Image Version"));
    assert_eq!(h.page.model().get(FieldKey::ImageVersion), "");

    // Picking another SKU recovers.
    h.page.select(FieldKey::ImageSku, "enterprise").await.unwrap();
    assert_eq!(h.page.model().get(FieldKey::ImageVersion), "enterprise-1");
}

#[tokio::test]
async fn test_navigation_is_blocked_until_settings_are_valid() {
    let h = harness();
    h.page.enter().await;

    match h.page.on_navigate(1, 2) {
        NavigationDecision::Block(messages) => {
            assert_eq!(
                messages[0],
                "Virtual machine name must be between 1 and 15 characters long."
            );
            assert!(!messages.contains(&"Select a virtual machine size.".to_string()));
        }
        NavigationDecision::Allow => panic!("empty form must not pass"),
    }
    assert_eq!(h.page.on_navigate(1, 0), NavigationDecision::Allow);

    fill_credentials(&h.page).await;
    assert_eq!(h.page.on_navigate(1, 2), NavigationDecision::Allow);
}
