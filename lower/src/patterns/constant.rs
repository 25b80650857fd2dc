//! Scalar and composite constants.

use spindle_dtype::Type;
use spindle_ir::{Attribute, ConversionRewriter, PatternSet, RewriteResult, SpvOp, StdOpKey};

use crate::attr::{convert_bool_attr, convert_float_attr, convert_integer_attr};

pub(super) fn populate(patterns: &mut PatternSet) {
    patterns.add("composite_constant", &[StdOpKey::Constant], |op, _, rewriter| {
        let Some(result) = op.result() else {
            return rewriter.notify_match_failure("constant without result");
        };
        let src_ty = rewriter.value_type(result).clone();
        if !(src_ty.is_vector() || src_ty.is_tensor()) {
            return rewriter.notify_match_failure("not a composite constant");
        }
        let Some(dense) = op.attr("value").and_then(Attribute::as_dense).cloned() else {
            return rewriter.notify_match_failure("composite value is not dense elements");
        };

        // Attributes keep standard element types; the op result gets the converted type.
        let mut attr_ty = dense.ty().clone();
        if src_ty.rank().is_some_and(|rank| rank > 1) {
            if src_ty.is_vector() {
                return rewriter.notify_match_failure("multi-dimensional vector constant");
            }
            let Some(linear) = src_ty.num_elements().and_then(|n| attr_ty.with_shape(&[n])) else {
                return rewriter.notify_match_failure("dynamic tensor constant");
            };
            attr_ty = linear;
        }

        let Some(dst_ty) = rewriter.convert_type(&src_ty) else {
            return rewriter.notify_match_failure(format_args!("no legal form for '{src_ty}'"));
        };
        let (Some(src_elem), Some(dst_elem)) = (src_ty.element_type().cloned(), dst_ty.element_type().cloned()) else {
            return rewriter.notify_match_failure("composite without element type");
        };

        let converted = if src_elem == dst_elem {
            dense.try_map(attr_ty, |element| Some(element.clone()))
        } else {
            if src_elem.is_bool() {
                return rewriter.notify_match_failure("boolean element type changes");
            }
            let Some(attr_ty) = attr_ty.with_element(dst_elem.clone()) else {
                return rewriter.notify_match_failure("attribute type has no element");
            };
            let location = rewriter.location().clone();
            let diagnostics = rewriter.diagnostics();
            dense.try_map(attr_ty, |element| match element {
                Attribute::Integer(int) if src_elem.is_integer() || src_elem.is_index() => {
                    convert_integer_attr(int, &dst_elem, diagnostics, &location).map(Attribute::Integer)
                }
                Attribute::Float(float) if src_elem.is_float() => {
                    convert_float_attr(float, &dst_elem, diagnostics, &location).map(Attribute::Float)
                }
                _ => None,
            })
        };
        let Some(converted) = converted else {
            return rewriter.notify_match_failure("element does not fit the converted type");
        };

        emit_constant(rewriter, dst_ty, Attribute::DenseElements(converted))
    });

    patterns.add("constant", &[StdOpKey::Constant], |op, _, rewriter| {
        let Some(result) = op.result() else {
            return rewriter.notify_match_failure("constant without result");
        };
        let src_ty = rewriter.value_type(result).clone();
        if src_ty.is_shaped() {
            return rewriter.notify_match_failure("composite constant");
        }
        let dst_ty = matched!(super::result_type(op, rewriter));
        let Some(value) = op.attr("value").cloned() else {
            return rewriter.notify_match_failure("constant without value");
        };

        let location = rewriter.location().clone();
        let converted = if src_ty.is_bool() {
            convert_bool_attr(&value).map(Attribute::Bool)
        } else if src_ty.is_float() {
            match value.as_float() {
                Some(_) if src_ty == dst_ty => Some(value.clone()),
                Some(float) => convert_float_attr(float, &dst_ty, rewriter.diagnostics(), &location).map(Attribute::Float),
                None => None,
            }
        } else if src_ty.is_integer() || src_ty.is_index() {
            value
                .as_integer()
                .and_then(|int| convert_integer_attr(int, &dst_ty, rewriter.diagnostics(), &location))
                .map(Attribute::Integer)
        } else {
            None
        };
        let Some(converted) = converted else {
            return rewriter.notify_match_failure(format_args!("cannot convert constant of type '{src_ty}'"));
        };

        emit_constant(rewriter, dst_ty, converted)
    });
}

fn emit_constant(rewriter: &mut ConversionRewriter<'_>, ty: Type, value: Attribute) -> RewriteResult {
    let constant = rewriter.create(SpvOp::Constant, &[], &[ty]);
    rewriter.set_attr(constant, "value", value);
    let result = rewriter.op(constant).results[0];
    rewriter.replace_op(&[result])
}
