//! Error types for device sessions.

use snafu::Snafu;
use spindle_device::ResultCode;
use spindle_dtype::StorageClass;

use crate::bindings::BindingKey;
use crate::session::Stage;

/// Result type for device sessions.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A device API call reported failure.
    #[snafu(display("{call} failed with {source}"))]
    DeviceCall { call: &'static str, source: ResultCode },

    #[snafu(display("a session needs at least one resource binding"))]
    NoResources,

    #[snafu(display("shader binary is empty"))]
    EmptyShader,

    #[snafu(display("invalid shader binary: {source}"))]
    Shader { source: spindle_device::Error },

    #[snafu(display("resource at {key} has zero size"))]
    ZeroSizedResource { key: BindingKey },

    #[snafu(display("no storage class recorded for resource at {key}"))]
    MissingStorageClass { key: BindingKey },

    #[snafu(display("storage class {class} of resource at {key} cannot be bound as a buffer"))]
    UnsupportedStorageClass { key: BindingKey, class: StorageClass },

    #[snafu(display("no physical device found"))]
    NoPhysicalDevice,

    #[snafu(display("no queue family supports compute"))]
    NoComputeQueue,

    #[snafu(display("no host-visible, host-coherent memory type can hold {footprint} bytes"))]
    NoSuitableMemoryType { footprint: u64 },

    #[snafu(display("allocated {actual} descriptor sets for {expected} layouts"))]
    DescriptorSetMismatch { expected: usize, actual: usize },

    /// A step was called out of order.
    #[snafu(display("step needs stage {expected}, session is at {actual}"))]
    InvalidStage { expected: Stage, actual: Stage },

    /// An earlier step failed; only teardown is allowed.
    #[snafu(display("session aborted after {stage}; only destroy is allowed"))]
    Aborted { stage: Stage },
}
