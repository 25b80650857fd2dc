//! Float and integer comparisons.

use spindle_ir::{CmpFPredicate, CmpIPredicate, PatternSet, SpvOp, StdOp, StdOpKey};

use super::{result_type, std_kind};

/// SPIR-V op for an ordered or unordered float predicate.
///
/// `false`, `true`, `ord` and `uno` have no single-op counterpart.
pub fn cmpf_to_spirv(predicate: CmpFPredicate) -> Option<SpvOp> {
    use CmpFPredicate::*;
    Some(match predicate {
        Oeq => SpvOp::FOrdEqual,
        Ogt => SpvOp::FOrdGreaterThan,
        Oge => SpvOp::FOrdGreaterThanEqual,
        Olt => SpvOp::FOrdLessThan,
        Ole => SpvOp::FOrdLessThanEqual,
        One => SpvOp::FOrdNotEqual,
        Ueq => SpvOp::FUnordEqual,
        Ugt => SpvOp::FUnordGreaterThan,
        Uge => SpvOp::FUnordGreaterThanEqual,
        Ult => SpvOp::FUnordLessThan,
        Ule => SpvOp::FUnordLessThanEqual,
        Une => SpvOp::FUnordNotEqual,
        AlwaysFalse | AlwaysTrue | Ord | Uno => return None,
    })
}

pub fn cmpi_to_spirv(predicate: CmpIPredicate) -> SpvOp {
    use CmpIPredicate::*;
    match predicate {
        Eq => SpvOp::IEqual,
        Ne => SpvOp::INotEqual,
        Slt => SpvOp::SLessThan,
        Sle => SpvOp::SLessThanEqual,
        Sgt => SpvOp::SGreaterThan,
        Sge => SpvOp::SGreaterThanEqual,
        Ult => SpvOp::ULessThan,
        Ule => SpvOp::ULessThanEqual,
        Ugt => SpvOp::UGreaterThan,
        Uge => SpvOp::UGreaterThanEqual,
    }
}

pub(super) fn populate(patterns: &mut PatternSet) {
    patterns.add("cmpf", &[StdOpKey::CmpF], |op, operands, rewriter| {
        let StdOp::CmpF(predicate) = matched!(std_kind(op, rewriter)) else {
            return rewriter.notify_match_failure("not a cmpf");
        };
        let Some(spv) = cmpf_to_spirv(predicate) else {
            return rewriter.notify_match_failure(format_args!("unsupported predicate '{predicate}'"));
        };
        let ty = matched!(result_type(op, rewriter));
        rewriter.replace_op_with_new(spv, operands, &[ty])
    });

    // Only equality has a logical counterpart on booleans.
    patterns.add("bool_cmpi", &[StdOpKey::CmpI], |op, operands, rewriter| {
        let StdOp::CmpI(predicate) = matched!(std_kind(op, rewriter)) else {
            return rewriter.notify_match_failure("not a cmpi");
        };
        if !op.operands.first().is_some_and(|&lhs| rewriter.value_type(lhs).is_bool_scalar_or_vector()) {
            return rewriter.notify_match_failure("operands are not boolean");
        }
        let spv = match predicate {
            CmpIPredicate::Eq => SpvOp::LogicalEqual,
            CmpIPredicate::Ne => SpvOp::LogicalNotEqual,
            other => return rewriter.notify_match_failure(format_args!("predicate '{other}' on booleans")),
        };
        let ty = matched!(result_type(op, rewriter));
        rewriter.replace_op_with_new(spv, operands, &[ty])
    });

    patterns.add("cmpi", &[StdOpKey::CmpI], |op, operands, rewriter| {
        let StdOp::CmpI(predicate) = matched!(std_kind(op, rewriter)) else {
            return rewriter.notify_match_failure("not a cmpi");
        };
        if op.operands.first().is_some_and(|&lhs| rewriter.value_type(lhs).is_bool_scalar_or_vector()) {
            return rewriter.notify_match_failure("boolean operands");
        }
        let ty = matched!(result_type(op, rewriter));
        rewriter.replace_op_with_new(cmpi_to_spirv(predicate), operands, &[ty])
    });
}
