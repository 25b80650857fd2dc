//! `return` and `select`.

use spindle_ir::{PatternSet, SpvOp, StdOpKey};

pub(super) fn populate(patterns: &mut PatternSet) {
    // Returned values would need an entry point ABI that kernels do not have.
    patterns.add("return", &[StdOpKey::Return], |_, operands, rewriter| {
        if !operands.is_empty() {
            return rewriter.notify_match_failure(format_args!("return with {} operands", operands.len()));
        }
        rewriter.create(SpvOp::Return, &[], &[]);
        rewriter.erase_op()
    });

    patterns.add("select", &[StdOpKey::Select], |op, operands, rewriter| {
        let ty = matched!(super::result_type(op, rewriter));
        rewriter.replace_op_with_new(SpvOp::Select, operands, &[ty])
    });
}
