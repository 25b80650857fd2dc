//! One-to-one arithmetic, math and bit ops.

use spindle_ir::{PatternSet, SpvOp, StdOpKey};

use super::result_type;

/// Standard ops that map onto a single SPIR-V op with the same operands.
pub const ELEMENTWISE_TABLE: &[(StdOpKey, SpvOp)] = &[
    (StdOpKey::AbsF, SpvOp::GlslFAbs),
    (StdOpKey::AddF, SpvOp::FAdd),
    (StdOpKey::AddI, SpvOp::IAdd),
    (StdOpKey::CeilF, SpvOp::GlslCeil),
    (StdOpKey::Cos, SpvOp::GlslCos),
    (StdOpKey::DivF, SpvOp::FDiv),
    (StdOpKey::Exp, SpvOp::GlslExp),
    (StdOpKey::Log, SpvOp::GlslLog),
    (StdOpKey::MulF, SpvOp::FMul),
    (StdOpKey::MulI, SpvOp::IMul),
    (StdOpKey::NegF, SpvOp::FNegate),
    (StdOpKey::RemF, SpvOp::FRem),
    (StdOpKey::Rsqrt, SpvOp::GlslInverseSqrt),
    (StdOpKey::ShiftLeft, SpvOp::ShiftLeftLogical),
    (StdOpKey::SignedDivI, SpvOp::SDiv),
    (StdOpKey::SignedRemI, SpvOp::SRem),
    (StdOpKey::SignedShiftRight, SpvOp::ShiftRightArithmetic),
    (StdOpKey::Sin, SpvOp::GlslSin),
    (StdOpKey::Sqrt, SpvOp::GlslSqrt),
    (StdOpKey::SubF, SpvOp::FSub),
    (StdOpKey::SubI, SpvOp::ISub),
    (StdOpKey::Tanh, SpvOp::GlslTanh),
    (StdOpKey::UnsignedDivI, SpvOp::UDiv),
    (StdOpKey::UnsignedRemI, SpvOp::UMod),
    (StdOpKey::UnsignedShiftRight, SpvOp::ShiftRightLogical),
];

pub(super) fn populate(patterns: &mut PatternSet) {
    for &(key, spv) in ELEMENTWISE_TABLE {
        patterns.add("elementwise", &[key], move |op, operands, rewriter| {
            let ty = matched!(result_type(op, rewriter));
            rewriter.replace_op_with_new(spv, operands, &[ty])
        });
    }

    // `and`/`or` on booleans are logical ops; SPIR-V bitwise ops reject bools.
    patterns.add("bitwise_or_logical", &[StdOpKey::And, StdOpKey::Or], |op, operands, rewriter| {
        let ty = matched!(result_type(op, rewriter));
        let is_bool = op.operands.first().is_some_and(|&lhs| rewriter.value_type(lhs).is_bool_scalar_or_vector());
        let is_and = op.kind.as_std().is_some_and(|k| k.key() == StdOpKey::And);
        let spv = match (is_and, is_bool) {
            (true, true) => SpvOp::LogicalAnd,
            (true, false) => SpvOp::BitwiseAnd,
            (false, true) => SpvOp::LogicalOr,
            (false, false) => SpvOp::BitwiseOr,
        };
        rewriter.replace_op_with_new(spv, operands, &[ty])
    });

    // Boolean `xor` is left for a dedicated not-equal lowering.
    patterns.add("xor", &[StdOpKey::Xor], |op, operands, rewriter| {
        if op.operands.first().is_some_and(|&lhs| rewriter.value_type(lhs).is_bool_scalar_or_vector()) {
            return rewriter.notify_match_failure("xor on booleans");
        }
        let ty = matched!(result_type(op, rewriter));
        rewriter.replace_op_with_new(SpvOp::BitwiseXor, operands, &[ty])
    });
}
