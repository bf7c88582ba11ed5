//! Global constants used throughout the vmwiz codebase.
//!
//! Catalog endpoints, REST api versions and timeouts live here so the
//! configuration defaults and the tests agree on the same values.

use std::time::Duration;

/// Default Azure Resource Manager endpoint.
pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// Publisher whose VM image offers populate the image dropdown.
pub const DEFAULT_IMAGE_PUBLISHER: &str = "MicrosoftSQLServer";

/// REST api version for the `artifacttypes/vmimage` family of endpoints.
pub const IMAGE_API_VERSION: &str = "2019-12-01";

/// REST api version for the `Microsoft.Compute/skus` endpoint.
pub const RESOURCE_SKU_API_VERSION: &str = "2019-04-01";

/// Resource type of the compute SKUs that describe VM sizes.
pub const VM_RESOURCE_TYPE: &str = "virtualMachines";

/// Default timeout for a single catalog request (30 seconds).
///
/// The catalog is queried without retry, so this bounds how long a field
/// can stay in the loading state.
pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding an already-issued bearer token.
pub const ACCESS_TOKEN_ENV: &str = "VMWIZ_ACCESS_TOKEN";

/// Maximum virtual machine name length (NetBIOS limit).
pub const MAX_VM_NAME_LEN: usize = 15;

/// Maximum administrator username length.
pub const MAX_USERNAME_LEN: usize = 20;

/// Minimum administrator password length.
pub const MIN_PASSWORD_LEN: usize = 12;

/// Maximum administrator password length.
pub const MAX_PASSWORD_LEN: usize = 123;
