//! Constant attribute conversion to the widths and precisions of converted types.

use spindle_dtype::{FloatKind, Type};
use spindle_ir::{Attribute, Diagnostics, FloatAttr, IntegerAttr, Location};

/// Converts an integer constant to the integer type `dst`.
///
/// The conversion is silent when the bit pattern fits `dst` as an unsigned
/// number. Failing that, the value is read as signed in its original width
/// and kept if that fits;
/// standard integers are signless, so this reinterpretation is lossy for
/// values meant as unsigned and a remark records it.
pub fn convert_integer_attr(
    attr: &IntegerAttr,
    dst: &Type,
    diagnostics: &mut Diagnostics,
    location: &Location,
) -> Option<IntegerAttr> {
    let Type::Integer { width } = *dst else { return None };

    // Either way the sign-extended value is what gets stored.
    let converted = IntegerAttr::new(dst.clone(), attr.as_signed());
    if attr.fits_unsigned(width) {
        return Some(converted);
    }

    if attr.fits_signed(width) {
        tracing::debug!(from = attr.as_signed(), %dst, "integer attribute reinterpreted as signed");
        let (src_text, dst_text) = (Attribute::from(attr.clone()), Attribute::from(converted.clone()));
        diagnostics.remark(location, format!("attribute '{src_text}' converted to '{dst_text}' for type '{dst}'"));
        return Some(converted);
    }

    diagnostics.remark(
        location,
        format!("attribute '{}' illegal: cannot fit into target type '{dst}'", Attribute::from(attr.clone())),
    );
    None
}

const F64_MANTISSA_BITS: u32 = 52;
const F32_MANTISSA_BITS: u32 = 23;
const F64_QUIET_BIT: u64 = 1 << (F64_MANTISSA_BITS - 1);

/// Narrowing of an `f64` to `f32` that is exact, or `None`.
///
/// Mirrors IEEE conversion with round-toward-zero: any inexact result,
/// overflow or signalling NaN fails. A quiet NaN passes when its payload
/// survives the shorter mantissa.
pub fn narrow_to_f32(value: f64) -> Option<f32> {
    if value.is_nan() {
        let mantissa = value.to_bits() & ((1u64 << F64_MANTISSA_BITS) - 1);
        let dropped = mantissa & ((1u64 << (F64_MANTISSA_BITS - F32_MANTISSA_BITS)) - 1);
        if mantissa & F64_QUIET_BIT == 0 || dropped != 0 {
            return None;
        }
        let sign = ((value.to_bits() >> 63) as u32) << 31;
        let payload = (mantissa >> (F64_MANTISSA_BITS - F32_MANTISSA_BITS)) as u32;
        return Some(f32::from_bits(sign | (0xff << F32_MANTISSA_BITS) | payload));
    }
    let narrowed = value as f32;
    ((narrowed as f64).to_bits() == value.to_bits()).then_some(narrowed)
}

/// Converts a float constant to `f32`, the only precision this target narrows to.
pub fn convert_float_attr(
    attr: &FloatAttr,
    dst: &Type,
    diagnostics: &mut Diagnostics,
    location: &Location,
) -> Option<FloatAttr> {
    if *dst != Type::Float(FloatKind::F32) {
        return None;
    }
    if narrow_to_f32(attr.value()).is_none() {
        diagnostics.remark(
            location,
            format!("attribute '{}' illegal: cannot fit into converted type '{dst}'", Attribute::from(attr.clone())),
        );
        return None;
    }
    // The value is exactly representable in single precision; the f64 holds it unchanged.
    Some(FloatAttr::new(dst.clone(), attr.value()))
}

/// Reads a boolean constant, accepting integer encodings by truth test.
pub fn convert_bool_attr(attr: &Attribute) -> Option<bool> {
    match attr {
        Attribute::Bool(value) => Some(*value),
        Attribute::Integer(int) => Some(!int.is_zero()),
        _ => None,
    }
}
