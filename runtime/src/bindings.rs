//! Host buffers exposed to a shader, keyed by descriptor set and binding.

use std::collections::BTreeMap;
use std::fmt;

use snafu::{OptionExt, ensure};
use spindle_device::DescriptorType;
use spindle_dtype::StorageClass;

use crate::error::*;

/// Position of a resource in the shader interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingKey {
    pub set: u32,
    pub binding: u32,
}

impl BindingKey {
    pub const fn new(set: u32, binding: u32) -> Self {
        Self { set, binding }
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "set {}, binding {}", self.set, self.binding)
    }
}

/// Host slices a session uploads before dispatch and overwrites on read back.
///
/// Data and storage classes are tracked separately: [`insert`](Self::insert)
/// records both, with the storage-buffer class, while
/// [`insert_data`](Self::insert_data) leaves the class to a later
/// [`set_storage_class`](Self::set_storage_class).
#[derive(Debug, Default)]
pub struct ResourceBindings<'a> {
    data: BTreeMap<BindingKey, &'a mut [u8]>,
    storage_classes: BTreeMap<BindingKey, StorageClass>,
}

impl<'a> ResourceBindings<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `data` at `key` as a storage buffer.
    pub fn insert(&mut self, key: BindingKey, data: &'a mut [u8]) -> &mut Self {
        self.data.insert(key, data);
        self.storage_classes.insert(key, StorageClass::StorageBuffer);
        self
    }

    pub fn insert_data(&mut self, key: BindingKey, data: &'a mut [u8]) -> &mut Self {
        self.data.insert(key, data);
        self
    }

    pub fn set_storage_class(&mut self, key: BindingKey, class: StorageClass) -> &mut Self {
        self.storage_classes.insert(key, class);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = BindingKey> + '_ {
        self.data.keys().copied()
    }

    /// Descriptor sets in ascending order.
    pub fn sets(&self) -> impl Iterator<Item = u32> + '_ {
        let mut last = None;
        self.data.keys().filter_map(move |key| (last.replace(key.set) != Some(key.set)).then_some(key.set))
    }

    pub fn data(&self, key: BindingKey) -> Option<&[u8]> {
        self.data.get(&key).map(|data| &**data)
    }

    pub fn data_mut(&mut self, key: BindingKey) -> Option<&mut [u8]> {
        self.data.get_mut(&key).map(|data| &mut **data)
    }

    /// Total byte size of all resources. Every resource must be non-empty.
    pub fn footprint(&self) -> Result<u64> {
        self.data.iter().try_fold(0u64, |total, (&key, data)| {
            ensure!(!data.is_empty(), ZeroSizedResourceSnafu { key });
            Ok(total + data.len() as u64)
        })
    }

    /// Descriptor type for the resource at `key`, from its storage class.
    pub fn descriptor_type(&self, key: BindingKey) -> Result<DescriptorType> {
        let class = *self.storage_classes.get(&key).context(MissingStorageClassSnafu { key })?;
        DescriptorType::from_storage_class(class).context(UnsupportedStorageClassSnafu { key, class })
    }
}
