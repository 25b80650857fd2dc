//! Integer and float casts.

use spindle_ir::{PatternSet, SpvOp, StdOpKey};

pub const CAST_TABLE: &[(StdOpKey, SpvOp)] = &[
    (StdOpKey::IndexCast, SpvOp::SConvert),
    (StdOpKey::SIToFP, SpvOp::ConvertSToF),
    (StdOpKey::ZeroExtendI, SpvOp::UConvert),
    (StdOpKey::SignExtendI, SpvOp::SConvert),
    (StdOpKey::TruncateI, SpvOp::SConvert),
    (StdOpKey::FPToSI, SpvOp::ConvertFToS),
    (StdOpKey::FPExt, SpvOp::FConvert),
    (StdOpKey::FPTrunc, SpvOp::FConvert),
];

pub(super) fn populate(patterns: &mut PatternSet) {
    for &(key, spv) in CAST_TABLE {
        patterns.add("cast", &[key], move |op, operands, rewriter| {
            let [operand] = operands[..] else {
                return rewriter.notify_match_failure("cast takes one operand");
            };
            let dst = matched!(super::result_type(op, rewriter));
            // Both sides can land on the same type, e.g. `index_cast` from i32.
            if *rewriter.value_type(operand) == dst {
                return rewriter.replace_op(&[operand]);
            }
            rewriter.replace_op_with_new(spv, &[operand], &[dst])
        });
    }
}
