//! Element addressing into lowered memrefs.
//!
//! A lowered memref is a pointer to a struct whose only member is a one
//! dimensional array, so every element is reached through two indices: the
//! struct member (always 0) and the row-major linear index.

use smallvec::{SmallVec, smallvec};
use spindle_dtype::{StorageClass, Type};
use spindle_ir::{Attribute, ConversionRewriter, IntegerAttr, SpvOp, ValueId};

/// Emits a `spv.constant` of integer type `ty`.
pub fn int_constant(rewriter: &mut ConversionRewriter<'_>, ty: Type, value: i64) -> ValueId {
    let attr = IntegerAttr::new(ty.clone(), value);
    let op = rewriter.create(SpvOp::Constant, &[], &[ty]);
    rewriter.set_attr(op, "value", Attribute::Integer(attr));
    rewriter.op(op).results[0]
}

/// Base pointer plus access chain indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementAddress {
    pub base: ValueId,
    pub indices: SmallVec<[ValueId; 2]>,
}

impl ElementAddress {
    pub fn last_index(&self) -> Option<ValueId> {
        self.indices.last().copied()
    }

    /// Emits `spv.AccessChain` yielding a pointer to `element`.
    pub fn emit(&self, rewriter: &mut ConversionRewriter<'_>, element: &Type, storage_class: StorageClass) -> ValueId {
        let mut operands: SmallVec<[ValueId; 4]> = smallvec![self.base];
        operands.extend_from_slice(&self.indices);
        rewriter.create_value(SpvOp::AccessChain, &operands, Type::pointer(element.clone(), storage_class))
    }
}

/// Row-major element strides of a memref. Only the outermost dim may be dynamic.
pub fn memref_strides(memref: &Type) -> Option<SmallVec<[usize; 4]>> {
    if let Some(strides) = memref.row_major_strides() {
        return Some(strides);
    }
    let dims = memref.dims()?;
    let mut strides: SmallVec<[usize; 4]> = SmallVec::from_elem(1, dims.len());
    for i in (0..dims.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1].as_static()?;
    }
    Some(strides)
}

/// Linearizes `indices` into a two-level address `[0, linear]` into `base`.
///
/// `indices` are already converted to `i32`. A rank-0 memref is addressed at
/// linear index 0.
pub fn element_address(
    rewriter: &mut ConversionRewriter<'_>,
    memref: &Type,
    base: ValueId,
    indices: &[ValueId],
) -> Option<ElementAddress> {
    let strides = memref_strides(memref)?;
    if strides.len() != indices.len() {
        return None;
    }

    let index_ty = Type::i32();
    let zero = int_constant(rewriter, index_ty.clone(), 0);

    let mut linear: Option<ValueId> = None;
    for (&index, &stride) in indices.iter().zip(&strides) {
        let term = match stride {
            1 => index,
            stride => {
                let stride = int_constant(rewriter, index_ty.clone(), i64::try_from(stride).ok()?);
                rewriter.create_value(SpvOp::IMul, &[index, stride], index_ty.clone())
            }
        };
        linear = Some(match linear {
            Some(acc) => rewriter.create_value(SpvOp::IAdd, &[acc, term], index_ty.clone()),
            None => term,
        });
    }

    Some(ElementAddress { base, indices: smallvec![zero, linear.unwrap_or(zero)] })
}
