//! Plain data the driver reports about devices, and descriptions the session
//! passes back when creating objects.

use enumset::{EnumSet, EnumSetType};
use spindle_dtype::StorageClass;

use crate::handle::{Buffer, DescriptorSet};

/// Capability bits of a queue family.
#[derive(Debug, Hash, strum::Display, EnumSetType)]
pub enum QueueFlag {
    Graphics,
    Compute,
    Transfer,
    SparseBinding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyProperties {
    pub flags: EnumSet<QueueFlag>,
    pub queue_count: u32,
    /// Zero means the family cannot write timestamps.
    pub timestamp_valid_bits: u32,
}

impl QueueFamilyProperties {
    pub fn supports_compute(&self) -> bool {
        self.flags.contains(QueueFlag::Compute)
    }

    /// Compute without graphics, usually a dedicated async compute family.
    pub fn is_compute_only(&self) -> bool {
        self.supports_compute() && !self.flags.contains(QueueFlag::Graphics)
    }

    pub fn supports_timestamps(&self) -> bool {
        self.timestamp_valid_bits != 0
    }
}

/// Property bits of a memory type.
#[derive(Debug, Hash, strum::Display, EnumSetType)]
pub enum MemoryProperty {
    DeviceLocal,
    HostVisible,
    HostCoherent,
    HostCached,
    LazilyAllocated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryType {
    pub properties: EnumSet<MemoryProperty>,
    pub heap_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryHeap {
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryProperties {
    pub types: Vec<MemoryType>,
    pub heaps: Vec<MemoryHeap>,
}

impl MemoryProperties {
    /// First memory type that the host can map without explicit flushes and
    /// whose heap can hold `footprint` bytes.
    pub fn host_coherent_type(&self, footprint: u64) -> Option<u32> {
        let wanted = MemoryProperty::HostVisible | MemoryProperty::HostCoherent;
        self.types
            .iter()
            .position(|ty| {
                let heap = self.heaps.get(ty.heap_index as usize);
                ty.properties.is_superset(wanted) && heap.is_some_and(|heap| footprint <= heap.size)
            })
            .and_then(|index| u32::try_from(index).ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceProperties {
    pub name: String,
    /// Nanoseconds per timestamp tick.
    pub timestamp_period: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
pub enum DescriptorType {
    StorageBuffer,
    UniformBuffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum BufferUsage {
    StorageBuffer,
    UniformBuffer,
}

impl DescriptorType {
    /// Descriptor that exposes a resource of `class` to a shader, for the
    /// classes that can be bound from the host.
    pub const fn from_storage_class(class: StorageClass) -> Option<Self> {
        match class {
            StorageClass::StorageBuffer => Some(Self::StorageBuffer),
            StorageClass::Uniform => Some(Self::UniformBuffer),
            _ => None,
        }
    }

    pub const fn buffer_usage(self) -> BufferUsage {
        match self {
            Self::StorageBuffer => BufferUsage::StorageBuffer,
            Self::UniformBuffer => BufferUsage::UniformBuffer,
        }
    }
}

/// One compute-stage binding inside a descriptor set layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutBinding {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorPoolSize {
    pub descriptor_type: DescriptorType,
    pub count: u32,
}

/// Points one binding of `set` at the whole of `buffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferWrite {
    pub set: DescriptorSet,
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    pub buffer: Buffer,
}

/// Pipeline stage at which a timestamp is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PipelineStage {
    ComputeShader,
    BottomOfPipe,
}
