//! Standard to SPIR-V conversion rules.
//!
//! Every rule converts exactly one standard op kind, or a family sharing one
//! shape (the elementwise and cast tables). Rules decline through
//! [`ConversionRewriter::notify_match_failure`]; anything they created before
//! declining is rolled back by the pattern set.
//!
//! Where two rules share a key they are tried in registration order: the
//! specialised rule first (boolean compare, integer memory access, composite
//! constant), the general one second.

/// Unwraps a rule step, returning its `NoMatch` from the rule on failure.
macro_rules! matched {
    ($step:expr) => {
        match $step {
            Ok(value) => value,
            Err(no_match) => return no_match,
        }
    };
}

mod cast;
mod compare;
mod constant;
mod control;
mod elementwise;
mod memory;

use spindle_ir::{ConversionRewriter, Operation, PatternSet, RewriteResult, StdOp};

pub use cast::CAST_TABLE;
pub use compare::{cmpf_to_spirv, cmpi_to_spirv};
pub use elementwise::ELEMENTWISE_TABLE;

/// Registers every standard to SPIR-V rule.
pub fn populate_std_to_spirv_patterns(patterns: &mut PatternSet) {
    elementwise::populate(patterns);
    compare::populate(patterns);
    constant::populate(patterns);
    memory::populate(patterns);
    control::populate(patterns);
    cast::populate(patterns);
    tracing::debug!(rules = patterns.len(), "std to spirv patterns registered");
}

/// Standard kind of the op under conversion.
///
/// Rules are only dispatched for standard ops, so this never fails in
/// practice; it still declines rather than panicking.
fn std_kind(op: &Operation, rewriter: &mut ConversionRewriter<'_>) -> Result<StdOp, RewriteResult> {
    op.kind.as_std().ok_or_else(|| rewriter.notify_match_failure("not a standard op"))
}

/// Converted type of the op's single result.
fn result_type(op: &Operation, rewriter: &mut ConversionRewriter<'_>) -> Result<spindle_dtype::Type, RewriteResult> {
    match rewriter.convert_result_type(op) {
        Some(ty) => Ok(ty),
        None => {
            let ty = op.result().map(|v| rewriter.value_type(v).to_string()).unwrap_or_default();
            Err(rewriter.notify_match_failure(format_args!("result type '{ty}' has no legal form")))
        }
    }
}
