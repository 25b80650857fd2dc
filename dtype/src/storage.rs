//! Storage classes and target capabilities.

/// SPIR-V storage class of a pointer or resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumString, strum::VariantArray)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageClass {
    UniformConstant,
    Input,
    Uniform,
    Output,
    Workgroup,
    CrossWorkgroup,
    Private,
    Function,
    PushConstant,
    StorageBuffer,
}

impl StorageClass {
    /// Storage class for a numeric memref memory space.
    pub const fn from_memory_space(space: u32) -> Option<Self> {
        Some(match space {
            0 => Self::StorageBuffer,
            1 => Self::CrossWorkgroup,
            2 => Self::Uniform,
            3 => Self::Workgroup,
            4 => Self::PushConstant,
            6 => Self::Private,
            7 => Self::Function,
            _ => return None,
        })
    }

    /// Classes that describe interface resources bound from the host.
    pub const fn is_interface_storage(self) -> bool {
        matches!(self, Self::StorageBuffer | Self::Uniform | Self::PushConstant)
    }
}

/// Optional features of the target environment.
///
/// 32-bit integers and floats are always available; everything else has to be
/// declared.
#[derive(Debug, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumString, strum::VariantArray)]
#[derive(enumset::EnumSetType)]
#[cfg_attr(feature = "proptest", derive(proptest_derive::Arbitrary))]
#[enumset(repr = "u32")]
pub enum Capability {
    Int8,
    Int16,
    Int64,
    Float16,
    Float64,
    StorageBuffer8BitAccess,
    StorageBuffer16BitAccess,
}
