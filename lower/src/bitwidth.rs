//! Sub-word load and store emulation.
//!
//! When the target cannot address elements of `src_bits` in a buffer, the
//! buffer is declared with `target_bits` words and `target_bits / src_bits`
//! elements are packed into each word. Element `i` lives in word
//! `i / (target_bits / src_bits)` at bit offset `(i mod (target_bits / src_bits)) * src_bits`.
//!
//! Stores are read-modify-write on a word other invocations may be writing at
//! the same time, so they are done with one atomic AND that clears the
//! element's bits followed by one atomic OR that sets them.

use spindle_dtype::{StorageClass, Type};
use spindle_ir::{Attribute, ConversionRewriter, MemorySemantics, OpId, Scope, SpvOp, ValueId};

use crate::access::{ElementAddress, int_constant};

/// Packing of `src_bits` elements into `target_bits` words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitPacking {
    src_bits: u32,
    target_bits: u32,
}

impl BitPacking {
    /// `None` unless `target_bits` is a multiple of `src_bits` and at most 64.
    pub fn new(src_bits: u32, target_bits: u32) -> Option<Self> {
        (src_bits > 0 && target_bits <= 64 && target_bits >= src_bits && target_bits % src_bits == 0)
            .then_some(Self { src_bits, target_bits })
    }

    pub fn src_bits(&self) -> u32 {
        self.src_bits
    }

    pub fn target_bits(&self) -> u32 {
        self.target_bits
    }

    /// Same widths: loads and stores are emitted directly.
    pub fn is_identity(&self) -> bool {
        self.src_bits == self.target_bits
    }

    pub fn elements_per_word(&self) -> u32 {
        self.target_bits / self.src_bits
    }

    pub fn offset_of(&self, index: u64) -> u32 {
        (index % u64::from(self.elements_per_word())) as u32 * self.src_bits
    }

    pub fn word_index(&self, index: u64) -> u64 {
        index / u64::from(self.elements_per_word())
    }

    fn word_mask(&self) -> u64 {
        if self.target_bits >= 64 { u64::MAX } else { (1u64 << self.target_bits) - 1 }
    }

    /// Low `src_bits` set.
    pub fn element_mask(&self) -> u64 {
        if self.src_bits >= 64 { u64::MAX } else { (1u64 << self.src_bits) - 1 }
    }

    /// Word with every bit set except those of element `index`.
    pub fn clear_mask(&self, index: u64) -> u64 {
        !(self.element_mask() << self.offset_of(index)) & self.word_mask()
    }

    fn word_type(&self) -> Type {
        Type::int(self.target_bits)
    }
}

/// Bit offset of the element at `index` within its word:
/// `(index smod elements_per_word) * src_bits`.
pub fn emit_bit_offset(rewriter: &mut ConversionRewriter<'_>, index: ValueId, packing: BitPacking) -> ValueId {
    let ty = packing.word_type();
    let per_word = int_constant(rewriter, ty.clone(), packing.elements_per_word().into());
    let src_bits = int_constant(rewriter, ty.clone(), packing.src_bits().into());
    let slot = rewriter.create_value(SpvOp::SMod, &[index, per_word], ty.clone());
    rewriter.create_value(SpvOp::IMul, &[slot, src_bits], ty)
}

/// Address of the word holding the element: the last index divided by
/// `elements_per_word`.
pub fn adjust_address(
    rewriter: &mut ConversionRewriter<'_>,
    address: &ElementAddress,
    packing: BitPacking,
) -> Option<ElementAddress> {
    let last = address.last_index()?;
    let ty = packing.word_type();
    let per_word = int_constant(rewriter, ty.clone(), packing.elements_per_word().into());
    let word = rewriter.create_value(SpvOp::SDiv, &[last, per_word], ty);

    let mut adjusted = address.clone();
    if let Some(slot) = adjusted.indices.last_mut() {
        *slot = word;
    }
    Some(adjusted)
}

/// `(value & mask) << offset`.
pub fn shift_into_place(
    rewriter: &mut ConversionRewriter<'_>,
    value: ValueId,
    offset: ValueId,
    mask: ValueId,
    packing: BitPacking,
) -> ValueId {
    let ty = packing.word_type();
    let masked = rewriter.create_value(SpvOp::BitwiseAnd, &[value, mask], ty.clone());
    rewriter.create_value(SpvOp::ShiftLeftLogical, &[masked, offset], ty)
}

/// Memory operand attributes carried from the source op.
pub type MemoryAttrs<'a> = &'a [(&'a str, Attribute)];

pub(crate) fn copy_attrs(rewriter: &mut ConversionRewriter<'_>, op: OpId, attrs: MemoryAttrs<'_>) {
    for (name, attr) in attrs {
        rewriter.set_attr(op, *name, attr.clone());
    }
}

/// Loads one packed element: loads its word, shifts the element down and masks it.
///
/// The result is a `target_bits` integer holding the element in its low bits.
pub fn emulate_load(
    rewriter: &mut ConversionRewriter<'_>,
    address: &ElementAddress,
    storage_class: StorageClass,
    packing: BitPacking,
    attrs: MemoryAttrs<'_>,
) -> Option<ValueId> {
    let ty = packing.word_type();
    let index = address.last_index()?;

    let adjusted = adjust_address(rewriter, address, packing)?;
    let ptr = adjusted.emit(rewriter, &ty, storage_class);
    let load = rewriter.create(SpvOp::Load, &[ptr], std::slice::from_ref(&ty));
    copy_attrs(rewriter, load, attrs);
    let word = rewriter.op(load).results[0];

    let offset = emit_bit_offset(rewriter, index, packing);
    let shifted = rewriter.create_value(SpvOp::ShiftRightArithmetic, &[word, offset], ty.clone());
    let mask = int_constant(rewriter, ty.clone(), packing.element_mask() as i64);
    Some(rewriter.create_value(SpvOp::BitwiseAnd, &[shifted, mask], ty))
}

/// Stores one packed element with an atomic AND clearing its bits followed
/// by an atomic OR setting them, both on the same word pointer.
pub fn emulate_store(
    rewriter: &mut ConversionRewriter<'_>,
    address: &ElementAddress,
    storage_class: StorageClass,
    value: ValueId,
    packing: BitPacking,
) -> Option<()> {
    let ty = packing.word_type();
    let index = address.last_index()?;

    let offset = emit_bit_offset(rewriter, index, packing);
    let mask = int_constant(rewriter, ty.clone(), packing.element_mask() as i64);
    let shifted_mask = rewriter.create_value(SpvOp::ShiftLeftLogical, &[mask, offset], ty.clone());
    let clear = rewriter.create_value(SpvOp::Not, &[shifted_mask], ty.clone());
    let shifted_value = shift_into_place(rewriter, value, offset, mask, packing);

    let adjusted = adjust_address(rewriter, address, packing)?;
    let ptr = adjusted.emit(rewriter, &ty, storage_class);

    let (scope, semantics) = (Scope::Device, MemorySemantics::AcquireRelease);
    rewriter.create_value(SpvOp::AtomicAnd { scope, semantics }, &[ptr, clear], ty.clone());
    rewriter.create_value(SpvOp::AtomicOr { scope, semantics }, &[ptr, shifted_value], ty);
    Some(())
}
