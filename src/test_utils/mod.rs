//! Test utilities for vmwiz
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration tests under `tests/`.
//!
//! - [`init_test_logging`] - one-time tracing setup for test output
//! - [`MockCatalog`] - scripted [`crate::catalog::CatalogClient`] whose
//!   responses can be held back and released in any order
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vmwiz::test_utils::MockCatalog;
//!
//! # async fn example() {
//! let catalog = Arc::new(MockCatalog::new());
//! catalog.respond_names("/offers", &["sql2019-ws2019"]);
//!
//! let held = catalog.hold("/offers/sql2019-ws2019/skus");
//! // ... start a lookup, inspect the loading state ...
//! held.release_names(&["enterprise"]);
//! # }
//! ```

mod catalog;

pub use catalog::{HeldResponse, MockCatalog};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// the `RUST_LOG` environment variable; with neither, tests stay silent.
///
/// ```bash
/// RUST_LOG=vmwiz=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
