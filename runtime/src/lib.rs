//! Compute dispatch runtime for spindle.
//!
//! Takes a compiled shader binary and a set of host buffers, runs the shader
//! once on a compute device through a [`spindle_device::Driver`], and writes
//! the results back into the host buffers.
//!
//! # Module Organization
//!
//! - [`config`] - dispatch configuration ([`RuntimeConfig`], [`WorkGroups`])
//! - [`bindings`] - host buffers keyed by descriptor set and binding
//! - [`select`] - physical device and queue family choice
//! - [`arena`] - reverse-order release of acquired device objects
//! - [`session`] - the [`Session`] state machine and its [`Timings`]
//!
//! # Example
//!
//! ```ignore
//! let mut output = vec![0u8; 16];
//! let mut bindings = ResourceBindings::new();
//! bindings.insert(BindingKey::new(0, 0), &mut output);
//!
//! let config = RuntimeConfig::builder().shader(spirv).work_groups(WorkGroups::new(4, 1, 1)).build();
//! let mut session = Session::new(AshDriver::new()?, config, bindings)?;
//! let timings = session.run()?;
//! session.destroy()?;
//! ```

pub mod arena;
pub mod bindings;
pub mod config;
pub mod error;
pub mod select;
pub mod session;

#[cfg(test)]
pub mod test;

pub use arena::{Resource, ResourceArena};
pub use bindings::{BindingKey, ResourceBindings};
pub use config::{RuntimeConfig, WorkGroups};
pub use error::*;
pub use select::{QueueSelection, select_compute_queue};
pub use session::{Session, Stage, Timings};
