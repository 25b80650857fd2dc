//! Standard to SPIR-V lowering.
//!
//! Converts a [`Function`] built from standard ops into SPIR-V ops legal for
//! a [`TargetEnv`]. Types the target cannot express are widened; sub-word
//! integers in buffers are packed into 32-bit words and accessed through
//! shift-and-mask sequences with atomic read-modify-write stores.
//!
//! # Module Organization
//!
//! - [`target`] - Capability set of the target device
//! - [`types`] - Type converter
//! - [`attr`] - Constant attribute conversion
//! - [`access`] - Element addressing into lowered memrefs
//! - [`bitwidth`] - Sub-word load/store emulation
//! - [`patterns`] - Rule catalog
//! - [`error`] - Error types and result handling
//!
//! ```ignore
//! let env = TargetEnv::builder().capabilities(Capability::Int8 | Capability::Int64).build();
//! let mut diagnostics = Diagnostics::new();
//! lower_to_spirv(&mut func, &env, &mut diagnostics)?;
//! ```

pub mod access;
pub mod attr;
pub mod bitwidth;
pub mod error;
pub mod patterns;
pub mod target;
pub mod types;

#[cfg(test)]
pub mod test;

use std::sync::OnceLock;

use snafu::ResultExt;
use spindle_ir::{Diagnostics, Function, PatternSet, apply_full_conversion};

pub use bitwidth::BitPacking;
pub use error::{Error, Result};
pub use patterns::populate_std_to_spirv_patterns;
pub use target::{CAPS_ENV, TargetEnv};
pub use types::TypeConverter;

/// The full rule catalog. Rules hold no target state, so one set serves
/// every conversion.
pub fn std_to_spirv_patterns() -> &'static PatternSet {
    static PATTERNS: OnceLock<PatternSet> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let mut patterns = PatternSet::new();
        populate_std_to_spirv_patterns(&mut patterns);
        patterns
    })
}

/// Lowers every op of `func` to SPIR-V for `env`.
///
/// Diagnostics for lossy constant conversions and for the op that failed to
/// legalize are recorded in `diagnostics`.
#[tracing::instrument(skip_all, fields(function = %func.name))]
pub fn lower_to_spirv(func: &mut Function, env: &TargetEnv, diagnostics: &mut Diagnostics) -> Result<()> {
    let converter = TypeConverter::new(env.clone());
    let function = func.name.clone();
    apply_full_conversion(func, std_to_spirv_patterns(), &converter, diagnostics).context(error::ConversionSnafu { function })?;
    tracing::debug!(ops = func.len(), "lowered to spirv");
    Ok(())
}
