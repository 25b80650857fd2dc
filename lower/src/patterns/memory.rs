//! `load` and `store` through an access chain.
//!
//! Integer elements narrower than the word the buffer was declared with go
//! through the sub-word emulation in [`crate::bitwidth`]. Everything else is a
//! plain access chain followed by a load or store.

use spindle_dtype::{StorageClass, Type};
use spindle_ir::{Attribute, ConversionRewriter, Operation, PatternSet, RewriteResult, SpvOp, StdOpKey, ValueId};

use crate::access::{ElementAddress, element_address};
use crate::bitwidth::{BitPacking, copy_attrs, emulate_load, emulate_store};

/// Memory operand attributes carried over to the emitted access.
const MEMORY_ATTRS: [&str; 2] = ["memory_access", "alignment"];

/// Everything a memory rule needs to know about the accessed buffer.
struct Access {
    /// Element type of the source memref.
    element: Type,
    /// Element type the lowered buffer stores.
    stored: Type,
    storage_class: StorageClass,
    address: ElementAddress,
}

fn memory_attrs(op: &Operation) -> Vec<(&'static str, Attribute)> {
    MEMORY_ATTRS.iter().filter_map(|&name| Some((name, op.attr(name)?.clone()))).collect()
}

/// Resolves the buffer behind `memref` and addresses the element at `indices`.
///
/// `want_integer` selects which rule family the access belongs to; the other
/// family declines.
fn resolve(
    rewriter: &mut ConversionRewriter<'_>,
    memref: ValueId,
    base: ValueId,
    indices: &[ValueId],
    want_integer: bool,
) -> Result<Access, RewriteResult> {
    let memref_ty = rewriter.value_type(memref).clone();
    let Some(element) = memref_ty.element_type().cloned() else {
        return Err(rewriter.notify_match_failure(format_args!("'{memref_ty}' is not a memref")));
    };
    if element.is_signless_integer() != want_integer {
        return Err(rewriter.notify_match_failure("element kind handled by another rule"));
    }
    let Some(pointer) = rewriter.convert_type(&memref_ty) else {
        return Err(rewriter.notify_match_failure(format_args!("no legal form for '{memref_ty}'")));
    };
    let (Some(stored), Some(storage_class)) = (pointer.pointer_storage_element().cloned(), pointer.storage_class()) else {
        return Err(rewriter.notify_match_failure("converted memref is not a buffer pointer"));
    };
    let Some(address) = element_address(rewriter, &memref_ty, base, indices) else {
        return Err(rewriter.notify_match_failure("cannot linearize indices"));
    };
    Ok(Access { element, stored, storage_class, address })
}

/// Packing for an integer access, `None` when no emulation is needed.
fn packing(rewriter: &mut ConversionRewriter<'_>, access: &Access) -> Result<Option<BitPacking>, RewriteResult> {
    let (Some(src_bits), Some(target_bits)) =
        (access.element.int_or_float_bit_width(), access.stored.int_or_float_bit_width())
    else {
        return Err(rewriter.notify_match_failure("element has no bit width"));
    };
    if src_bits == target_bits {
        return Ok(None);
    }
    match BitPacking::new(src_bits, target_bits) {
        Some(packing) => Ok(Some(packing)),
        None => Err(rewriter.notify_match_failure(format_args!("i{src_bits} does not pack into i{target_bits}"))),
    }
}

fn direct_load(rewriter: &mut ConversionRewriter<'_>, access: &Access, attrs: &[(&'static str, Attribute)]) -> ValueId {
    let ptr = access.address.emit(rewriter, &access.stored, access.storage_class);
    let load = rewriter.create(SpvOp::Load, &[ptr], std::slice::from_ref(&access.stored));
    copy_attrs(rewriter, load, attrs);
    rewriter.op(load).results[0]
}

fn direct_store(rewriter: &mut ConversionRewriter<'_>, access: &Access, value: ValueId, attrs: &[(&'static str, Attribute)]) {
    let ptr = access.address.emit(rewriter, &access.stored, access.storage_class);
    let store = rewriter.create(SpvOp::Store, &[ptr, value], &[]);
    copy_attrs(rewriter, store, attrs);
}

pub(super) fn populate(patterns: &mut PatternSet) {
    patterns.add("int_load", &[StdOpKey::Load], |op, operands, rewriter| {
        let [memref, ..] = op.operands[..] else {
            return rewriter.notify_match_failure("load without memref");
        };
        let access = matched!(resolve(rewriter, memref, operands[0], &operands[1..], true));
        let result_ty = matched!(super::result_type(op, rewriter));
        let attrs = memory_attrs(op);

        let loaded = match matched!(packing(rewriter, &access)) {
            None => direct_load(rewriter, &access, &attrs),
            Some(packing) => {
                let Some(word) = emulate_load(rewriter, &access.address, access.storage_class, packing, &attrs) else {
                    return rewriter.notify_match_failure("cannot address the containing word");
                };
                word
            }
        };
        let loaded = if result_ty == access.stored {
            loaded
        } else {
            rewriter.create_value(SpvOp::SConvert, &[loaded], result_ty)
        };
        rewriter.replace_op(&[loaded])
    });

    patterns.add("load", &[StdOpKey::Load], |op, operands, rewriter| {
        let [memref, ..] = op.operands[..] else {
            return rewriter.notify_match_failure("load without memref");
        };
        let access = matched!(resolve(rewriter, memref, operands[0], &operands[1..], false));
        let loaded = direct_load(rewriter, &access, &memory_attrs(op));
        rewriter.replace_op(&[loaded])
    });

    patterns.add("int_store", &[StdOpKey::Store], |op, operands, rewriter| {
        let [_, memref, ..] = op.operands[..] else {
            return rewriter.notify_match_failure("store without value and memref");
        };
        let access = matched!(resolve(rewriter, memref, operands[1], &operands[2..], true));
        let attrs = memory_attrs(op);

        let mut value = operands[0];
        if *rewriter.value_type(value) != access.stored {
            value = rewriter.create_value(SpvOp::UConvert, &[value], access.stored.clone());
        }

        match matched!(packing(rewriter, &access)) {
            None => direct_store(rewriter, &access, value, &attrs),
            Some(packing) => {
                if emulate_store(rewriter, &access.address, access.storage_class, value, packing).is_none() {
                    return rewriter.notify_match_failure("cannot address the containing word");
                }
            }
        }
        rewriter.erase_op()
    });

    patterns.add("store", &[StdOpKey::Store], |op, operands, rewriter| {
        let [_, memref, ..] = op.operands[..] else {
            return rewriter.notify_match_failure("store without value and memref");
        };
        let access = matched!(resolve(rewriter, memref, operands[1], &operands[2..], false));
        direct_store(rewriter, &access, operands[0], &memory_attrs(op));
        rewriter.erase_op()
    });
}
