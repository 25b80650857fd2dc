//! Constant attributes attached to operations.
//!
//! Integers keep their raw bit pattern truncated to the width of their type;
//! whether that pattern is read as signed or unsigned is up to the consumer,
//! the same way signless integer types leave it open.

use std::fmt;

use snafu::ensure;
use spindle_dtype::Type;

use crate::error::{DenseElementCountSnafu, DenseElementTypeSnafu, Result};

/// Width used to store integer attributes of `index` type.
pub const INDEX_ATTR_WIDTH: u32 = 64;

#[inline]
fn truncate(bits: u64, width: u32) -> u64 {
    if width >= 64 { bits } else { bits & ((1u64 << width) - 1) }
}

#[inline]
fn sign_extend(bits: u64, width: u32) -> i64 {
    if width == 0 || width >= 64 {
        return bits as i64;
    }
    let shift = 64 - width;
    ((bits << shift) as i64) >> shift
}

/// Integer constant of a signless integer or `index` type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntegerAttr {
    bits: u64,
    ty: Type,
}

impl IntegerAttr {
    /// Integer attribute holding `value` truncated to the width of `ty`.
    pub fn new(ty: Type, value: i64) -> Self {
        Self::from_bits(ty, value as u64)
    }

    pub fn from_bits(ty: Type, bits: u64) -> Self {
        let width = Self::width_of(&ty);
        Self { bits: truncate(bits, width), ty }
    }

    fn width_of(ty: &Type) -> u32 {
        match ty {
            Type::Integer { width } => *width,
            _ => INDEX_ATTR_WIDTH,
        }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn width(&self) -> u32 {
        Self::width_of(&self.ty)
    }

    /// Zero-extended value.
    pub fn as_unsigned(&self) -> u64 {
        self.bits
    }

    /// Sign-extended value.
    pub fn as_signed(&self) -> i64 {
        sign_extend(self.bits, self.width())
    }

    /// True when the value, read as unsigned, has no set bits at or above `width`.
    pub fn fits_unsigned(&self, width: u32) -> bool {
        width >= 64 || self.bits >> width == 0
    }

    /// True when the value, read as signed, is representable in `width` bits.
    pub fn fits_signed(&self, width: u32) -> bool {
        if width >= 64 {
            return true;
        }
        if width == 0 {
            return false;
        }
        let value = self.as_signed();
        let bound = 1i64 << (width - 1);
        (-bound..bound).contains(&value)
    }

    /// Same bit pattern reinterpreted in (and truncated to) another type.
    pub fn with_type(&self, ty: Type) -> Self {
        Self::from_bits(ty, self.bits)
    }

    pub fn is_zero(&self) -> bool {
        self.bits == 0
    }
}

/// Floating-point constant. The value is held in double precision whatever
/// the type says; narrowing happens on conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatAttr {
    value: f64,
    ty: Type,
}

impl FloatAttr {
    pub fn new(ty: Type, value: f64) -> Self {
        Self { value, ty }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Constant elements of a statically shaped vector or tensor, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseElementsAttr {
    ty: Type,
    elements: Vec<Attribute>,
}

impl DenseElementsAttr {
    pub fn new(ty: Type, elements: Vec<Attribute>) -> Result<Self> {
        ensure!(matches!(ty, Type::Vector { .. } | Type::Tensor { .. }), DenseElementTypeSnafu { ty });
        let Some(expected) = ty.num_elements() else {
            return DenseElementTypeSnafu { ty }.fail();
        };
        ensure!(expected == elements.len(), DenseElementCountSnafu { ty, expected, actual: elements.len() });
        Ok(Self { ty, elements })
    }

    /// Every element equal to `value`.
    pub fn splat(ty: Type, value: Attribute) -> Result<Self> {
        let count = ty.num_elements().unwrap_or(0);
        Self::new(ty, vec![value; count])
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn element_type(&self) -> Option<&Type> {
        self.ty.element_type()
    }

    pub fn elements(&self) -> &[Attribute] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is_splat(&self) -> bool {
        self.elements.windows(2).all(|w| w[0] == w[1])
    }

    /// Rebuilds the attribute with a new type, converting every element.
    ///
    /// Stops at the first element `f` rejects. No element count check is
    /// needed: callers pick a type with the same number of elements.
    pub fn try_map(&self, ty: Type, mut f: impl FnMut(&Attribute) -> Option<Attribute>) -> Option<Self> {
        let elements = self.elements.iter().map(&mut f).collect::<Option<Vec<_>>>()?;
        Some(Self { ty, elements })
    }
}

/// Compile-time constant attached to an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Bool(bool),
    Integer(IntegerAttr),
    Float(FloatAttr),
    DenseElements(DenseElementsAttr),
    Str(String),
}

impl Attribute {
    pub fn int(ty: Type, value: i64) -> Self {
        Self::Integer(IntegerAttr::new(ty, value))
    }

    pub fn float(ty: Type, value: f64) -> Self {
        Self::Float(FloatAttr::new(ty, value))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// Type of the constant, `None` for strings.
    pub fn ty(&self) -> Option<Type> {
        match self {
            Self::Bool(_) => Some(Type::bool_()),
            Self::Integer(attr) => Some(attr.ty().clone()),
            Self::Float(attr) => Some(attr.ty().clone()),
            Self::DenseElements(attr) => Some(attr.ty().clone()),
            Self::Str(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<&IntegerAttr> {
        match self {
            Self::Integer(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<&FloatAttr> {
        match self {
            Self::Float(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn as_dense(&self) -> Option<&DenseElementsAttr> {
        match self {
            Self::DenseElements(attr) => Some(attr),
            _ => None,
        }
    }
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<IntegerAttr> for Attribute {
    fn from(attr: IntegerAttr) -> Self {
        Self::Integer(attr)
    }
}

impl From<FloatAttr> for Attribute {
    fn from(attr: FloatAttr) -> Self {
        Self::Float(attr)
    }
}

impl From<DenseElementsAttr> for Attribute {
    fn from(attr: DenseElementsAttr) -> Self {
        Self::DenseElements(attr)
    }
}

fn write_scalar(f: &mut fmt::Formatter<'_>, attr: &Attribute) -> fmt::Result {
    match attr {
        Attribute::Bool(v) => write!(f, "{v}"),
        Attribute::Integer(attr) if attr.width() == 1 => write!(f, "{}", attr.as_unsigned() != 0),
        Attribute::Integer(attr) => write!(f, "{}", attr.as_signed()),
        Attribute::Float(attr) => write!(f, "{:?}", attr.value()),
        other => write!(f, "{other}"),
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Integer(attr) => {
                write_scalar(f, self)?;
                write!(f, " : {}", attr.ty())
            }
            Self::Float(attr) => {
                write_scalar(f, self)?;
                write!(f, " : {}", attr.ty())
            }
            Self::DenseElements(attr) => {
                write!(f, "dense<[")?;
                for (i, element) in attr.elements().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_scalar(f, element)?;
                }
                write!(f, "]> : {}", attr.ty())
            }
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}
