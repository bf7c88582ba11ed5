//! The form model shared by the page, the cascades and the validator.
//!
//! [`FormModel`] is a plain key/value record keyed by [`FieldKey`]. The page
//! owns it and hands out a [`ModelHandle`]; the cascades write resolved
//! selections through the handle and the validator reads it under the lock,
//! so nobody keeps a private copy that could drift.
//!
//! A model serializes as a flat TOML table, which is also the format of the
//! settings files accepted by `vmwiz validate`:
//!
//! ```toml
//! subscription = "00000000-0000-0000-0000-000000000000"
//! region = "eastus"
//! vm_name = "sqlvm01"
//! admin_username = "sqladmin"
//! admin_password = "Str0ng!Passw0rd"
//! confirm_password = "Str0ng!Passw0rd"
//! vm_size = "Standard_D2s_v3"
//! ```

use crate::catalog::CatalogScope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Every value the VM settings page collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    /// Azure subscription id the catalog is queried in
    Subscription,
    /// Azure region (location) the catalog is queried in
    Region,
    /// Virtual machine name
    VmName,
    /// Administrator account name
    AdminUsername,
    /// Administrator password
    AdminPassword,
    /// Password confirmation; never sent anywhere, only compared
    ConfirmPassword,
    /// SQL Server image offer
    Image,
    /// SKU of the selected image offer
    ImageSku,
    /// Version of the selected image SKU
    ImageVersion,
    /// Virtual machine size
    VmSize,
}

impl FieldKey {
    /// All keys in page order.
    pub const ALL: [Self; 10] = [
        Self::Subscription,
        Self::Region,
        Self::VmName,
        Self::AdminUsername,
        Self::AdminPassword,
        Self::ConfirmPassword,
        Self::Image,
        Self::ImageSku,
        Self::ImageVersion,
        Self::VmSize,
    ];

    /// The key as written in settings files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::Region => "region",
            Self::VmName => "vm_name",
            Self::AdminUsername => "admin_username",
            Self::AdminPassword => "admin_password",
            Self::ConfirmPassword => "confirm_password",
            Self::Image => "image",
            Self::ImageSku => "image_sku",
            Self::ImageVersion => "image_version",
            Self::VmSize => "vm_size",
        }
    }

    /// Form label shown next to the field.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Subscription => "Subscription",
            Self::Region => "Region",
            Self::VmName => "Virtual machine name",
            Self::AdminUsername => "Administrator account username",
            Self::AdminPassword => "Administrator account password",
            Self::ConfirmPassword => "Confirm password",
            Self::Image => "Image",
            Self::ImageSku => "Image SKU",
            Self::ImageVersion => "Image Version",
            Self::VmSize => "Size",
        }
    }

    /// True for values that must never be echoed back to a terminal.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::AdminPassword | Self::ConfirmPassword)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|key| key.as_str() == s).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|key| key.as_str()).collect();
            format!("unknown field '{s}' (expected one of: {})", known.join(", "))
        })
    }
}

/// Mutable key/value record of the page's current values.
///
/// Missing keys read as the empty string, which is also the "unselected"
/// sentinel for dropdown-backed keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct FormModel {
    values: BTreeMap<FieldKey, String>,
}

impl FormModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value of `key`, or `""` when unset.
    #[must_use]
    pub fn get(&self, key: FieldKey) -> &str {
        self.values.get(&key).map_or("", String::as_str)
    }

    /// Replaces the value of `key`.
    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Builder-style variant of [`Self::set`].
    #[must_use]
    pub fn with(mut self, key: FieldKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// The subscription/region pair catalog paths are built from.
    #[must_use]
    pub fn scope(&self) -> CatalogScope {
        CatalogScope {
            subscription: self.get(FieldKey::Subscription).to_string(),
            region: self.get(FieldKey::Region).to_string(),
        }
    }
}

impl TryFrom<BTreeMap<String, String>> for FormModel {
    type Error = String;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut model = Self::new();
        for (key, value) in raw {
            model.set(key.parse()?, value);
        }
        Ok(model)
    }
}

impl From<FormModel> for BTreeMap<String, String> {
    fn from(model: FormModel) -> Self {
        model.values.into_iter().map(|(key, value)| (key.as_str().to_string(), value)).collect()
    }
}

/// Shared, single-owner handle to a [`FormModel`].
///
/// Cloning the handle shares the same model. The lock is only ever held for
/// the duration of one accessor call, never across an await.
#[derive(Debug, Clone, Default)]
pub struct ModelHandle {
    inner: Arc<Mutex<FormModel>>,
}

impl ModelHandle {
    /// Wraps `model` in a new handle.
    #[must_use]
    pub fn new(model: FormModel) -> Self {
        Self {
            inner: Arc::new(Mutex::new(model)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormModel> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns an owned copy of the value of `key`.
    #[must_use]
    pub fn get(&self, key: FieldKey) -> String {
        self.lock().get(key).to_string()
    }

    /// Replaces the value of `key`.
    pub fn set(&self, key: FieldKey, value: impl Into<String>) {
        self.lock().set(key, value);
    }

    /// Runs `f` against the model under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&FormModel) -> R) -> R {
        f(&self.lock())
    }

    /// The subscription/region pair catalog paths are built from.
    #[must_use]
    pub fn scope(&self) -> CatalogScope {
        self.lock().scope()
    }
}
