//! Bit widths and byte layout of types.

use super::*;

impl Type {
    /// Bit width of an integer or float scalar. `index` has no fixed width.
    pub fn int_or_float_bit_width(&self) -> Option<u32> {
        match self {
            Self::Integer { width } => Some(*width),
            Self::Float(kind) => Some(kind.width()),
            _ => None,
        }
    }

    /// Size in bytes when stored in memory.
    ///
    /// Booleans occupy one byte. Vectors are tightly packed. Runtime arrays and
    /// pointers have no storage size.
    pub fn byte_size(&self) -> Option<u32> {
        match self {
            Self::Integer { width: 1 } => Some(1),
            Self::Integer { width } => Some(width.div_ceil(8)),
            Self::Float(kind) => Some(kind.width() / 8),
            Self::Vector { shape, element } => {
                let count: usize = shape.iter().product();
                Some(element.byte_size()? * u32::try_from(count).ok()?)
            }
            Self::Array { element, count, stride } => {
                let stride = match stride {
                    Some(stride) => *stride,
                    None => element.byte_size()?,
                };
                Some(stride * u32::try_from(*count).ok()?)
            }
            Self::Struct { members, offsets } => {
                // Size is the end of the last member; layouts here are never padded at the tail.
                let (last, offset) = members.iter().zip(offsets).last()?;
                Some(offset + last.byte_size()?)
            }
            _ => None,
        }
    }

    /// Row-major strides (in elements) of a statically shaped type.
    pub fn row_major_strides(&self) -> Option<SmallVec<[usize; 4]>> {
        let shape = self.static_shape()?;
        let mut strides: SmallVec<[usize; 4]> = SmallVec::from_elem(1, shape.len());
        for i in (0..shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        Some(strides)
    }
}
