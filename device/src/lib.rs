//! Compute device seam for spindle.
//!
//! A device session never talks to a compute API directly. It drives a
//! [`Driver`], whose methods mirror the API entry points one to one, and only
//! ever sees the opaque [`handle`] values and plain [`info`] structs defined
//! here. Failed calls surface as the raw [`ResultCode`] the API returned.
//!
//! With the `vulkan` feature, [`vulkan::AshDriver`] implements the seam over
//! the system Vulkan loader.

pub mod driver;
pub mod error;
pub mod handle;
pub mod info;
pub mod result;
#[cfg(feature = "vulkan")]
pub mod vulkan;

#[cfg(test)]
pub mod test;

pub use driver::{Driver, DriverResult, shader_words};
pub use error::{Error, Result};
pub use handle::*;
pub use info::*;
pub use result::ResultCode;
#[cfg(feature = "vulkan")]
pub use vulkan::AshDriver;
