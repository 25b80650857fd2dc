//! Opaque API object handles.
//!
//! Every handle is a `Copy` newtype over the raw 64-bit value the driver hands
//! out. Zero is the null handle for every kind.

use std::fmt;

macro_rules! handles {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub u64);

            impl $name {
                pub const NULL: Self = Self(0);

                pub const fn raw(self) -> u64 {
                    self.0
                }

                pub const fn is_null(self) -> bool {
                    self.0 == 0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!(stringify!($name), "({:#x})"), self.0)
                }
            }
        )*
    };
}

handles! {
    /// Connection to the compute API.
    Instance,
    /// An enumerated device, before a logical device is created on it.
    PhysicalDevice,
    /// Logical device.
    Device,
    Queue,
    DeviceMemory,
    Buffer,
    ShaderModule,
    DescriptorSetLayout,
    PipelineLayout,
    Pipeline,
    DescriptorPool,
    DescriptorSet,
    CommandPool,
    CommandBuffer,
    /// Pool of timestamp queries.
    QueryPool,
}
