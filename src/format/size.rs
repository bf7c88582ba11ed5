//! Labels for virtual machine sizes.

use crate::catalog::RawEntry;
use tracing::debug;

/// Builds the tab-separated label of a compute SKU:
///
/// ```text
/// Standard_D2s_v3	Cores: 2	Memory: 8GB	discCount: 4	discSize: 16GB
/// ```
///
/// Cores come from `vCPUsAvailable` when the SKU restricts them, otherwise
/// from `vCPUs`. The temporary disk size is reported in GB.
///
/// Returns `None` for entries without a capability list or missing one of
/// the capabilities the label needs; such entries are not offered.
#[must_use]
pub fn vm_size_label(entry: &RawEntry) -> Option<String> {
    let label = capability_label(entry);
    if label.is_none() {
        debug!("Skipping size '{}': incomplete capabilities", entry.name);
    }
    label
}

fn capability_label(entry: &RawEntry) -> Option<String> {
    entry.capabilities.as_ref()?;

    let cores = entry.capability("vCPUsAvailable").or_else(|| entry.capability("vCPUs"))?;
    let memory = entry.capability("MemoryGB")?;
    let disc_count = entry.capability("MaxDataDiskCount")?;
    let disc_size = entry.capability("MaxResourceVolumeMB")?.parse::<f64>().ok()? / 1024.0;

    Some(format!(
        "{}\tCores: {cores}\tMemory: {memory}GB\tdiscCount: {disc_count}\tdiscSize: {disc_size}GB",
        entry.name
    ))
}
