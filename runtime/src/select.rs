//! Device and queue family selection.

use spindle_device::{PhysicalDevice, QueueFamilyProperties};

/// A physical device and the queue family the session submits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSelection {
    pub physical: PhysicalDevice,
    pub family: u32,
    pub properties: QueueFamilyProperties,
}

/// Picks the queue family to run on across all devices.
///
/// `(device, family)` pairs are scanned in enumeration order, first for a
/// compute-only family and then for any family supporting compute. The first
/// hit wins; there is no scoring. On a single device this is the first
/// compute-only family, else the first compute family.
pub fn select_compute_queue(candidates: &[(PhysicalDevice, Vec<QueueFamilyProperties>)]) -> Option<QueueSelection> {
    let first = |accept: fn(&QueueFamilyProperties) -> bool| {
        candidates.iter().find_map(|(physical, families)| {
            let (index, properties) = families.iter().enumerate().find(|(_, family)| accept(family))?;
            Some(QueueSelection { physical: *physical, family: u32::try_from(index).ok()?, properties: *properties })
        })
    };
    first(QueueFamilyProperties::is_compute_only).or_else(|| first(QueueFamilyProperties::supports_compute))
}
