use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Shader binaries are consumed as 32-bit words.
    #[snafu(display("shader binary of {len} bytes is not a whole number of 32-bit words"))]
    MisalignedShader { len: usize },

    #[cfg(feature = "vulkan")]
    /// The Vulkan loader could not be found or opened.
    #[snafu(display("failed to load the Vulkan library: {source}"))]
    Loading { source: ash::LoadingError },
}
