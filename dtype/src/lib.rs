//! Type system shared by the standard and SPIR-V dialects.
//!
//! Both dialects live in one [`Type`] enum, the same way a conversion pass sees
//! them side by side: builtin scalars, vectors, tensors and memrefs on the
//! source side, arrays, structs and pointers on the target side. Signless
//! integers and floats are common to both; `i1` is the boolean type of both.

pub mod ext;
pub mod layout;
pub mod storage;


use std::fmt;

use smallvec::SmallVec;

pub use storage::{Capability, StorageClass};

/// Floating-point precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumIter, strum::VariantArray, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FloatKind {
    #[strum(serialize = "f16")]
    F16,
    #[strum(serialize = "bf16")]
    BF16,
    #[strum(serialize = "f32")]
    F32,
    #[strum(serialize = "f64")]
    F64,
}

impl FloatKind {
    pub const fn width(self) -> u32 {
        match self {
            Self::F16 | Self::BF16 => 16,
            Self::F32 => 32,
            Self::F64 => 64,
        }
    }
}

/// One dimension of a tensor or memref shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dim {
    Static(usize),
    Dynamic,
}

impl Dim {
    pub const fn as_static(self) -> Option<usize> {
        match self {
            Self::Static(n) => Some(n),
            Self::Dynamic => None,
        }
    }
}

impl From<usize> for Dim {
    fn from(n: usize) -> Self {
        Self::Static(n)
    }
}

/// Shape of a tensor or memref (stack-allocated up to rank 4).
pub type Shape = SmallVec<[Dim; 4]>;

/// A type of either dialect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    /// Signless integer. Width 1 is the boolean type.
    Integer { width: u32 },

    /// Target-dependent index type.
    Index,

    /// Floating point.
    Float(FloatKind),

    /// Fixed-size vector with a static shape.
    Vector { shape: SmallVec<[usize; 4]>, element: Box<Type> },

    /// Ranked tensor.
    Tensor { shape: Shape, element: Box<Type> },

    /// Memory reference with a numeric memory space.
    MemRef { shape: Shape, element: Box<Type>, memory_space: u32 },

    /// SPIR-V array with an optional byte stride decoration.
    Array { element: Box<Type>, count: usize, stride: Option<u32> },

    /// SPIR-V runtime-sized array.
    RuntimeArray { element: Box<Type>, stride: Option<u32> },

    /// SPIR-V struct with per-member byte offsets.
    Struct { members: Vec<Type>, offsets: Vec<u32> },

    /// SPIR-V pointer.
    Pointer { pointee: Box<Type>, storage_class: StorageClass },
}

// =========================================================================
// Constructors
// =========================================================================

impl Type {
    pub const fn int(width: u32) -> Self {
        Self::Integer { width }
    }

    pub const fn bool_() -> Self {
        Self::Integer { width: 1 }
    }

    pub const fn i8() -> Self {
        Self::int(8)
    }

    pub const fn i16() -> Self {
        Self::int(16)
    }

    pub const fn i32() -> Self {
        Self::int(32)
    }

    pub const fn i64() -> Self {
        Self::int(64)
    }

    pub const fn index() -> Self {
        Self::Index
    }

    pub const fn f16() -> Self {
        Self::Float(FloatKind::F16)
    }

    pub const fn bf16() -> Self {
        Self::Float(FloatKind::BF16)
    }

    pub const fn f32() -> Self {
        Self::Float(FloatKind::F32)
    }

    pub const fn f64() -> Self {
        Self::Float(FloatKind::F64)
    }

    /// Vector type. Panics on an empty shape, which no dialect allows.
    pub fn vector(shape: &[usize], element: Type) -> Self {
        assert!(!shape.is_empty(), "vector type needs at least one dimension");
        Self::Vector { shape: SmallVec::from_slice(shape), element: Box::new(element) }
    }

    /// Statically shaped tensor.
    pub fn tensor(shape: &[usize], element: Type) -> Self {
        Self::Tensor { shape: shape.iter().copied().map(Dim::Static).collect(), element: Box::new(element) }
    }

    /// Tensor with explicit (possibly dynamic) dims.
    pub fn tensor_dims(shape: &[Dim], element: Type) -> Self {
        Self::Tensor { shape: SmallVec::from_slice(shape), element: Box::new(element) }
    }

    /// Statically shaped memref in the default memory space.
    pub fn memref(shape: &[usize], element: Type) -> Self {
        Self::memref_in(shape, element, 0)
    }

    pub fn memref_in(shape: &[usize], element: Type, memory_space: u32) -> Self {
        Self::MemRef { shape: shape.iter().copied().map(Dim::Static).collect(), element: Box::new(element), memory_space }
    }

    pub fn memref_dims(shape: &[Dim], element: Type, memory_space: u32) -> Self {
        Self::MemRef { shape: SmallVec::from_slice(shape), element: Box::new(element), memory_space }
    }

    pub fn array(element: Type, count: usize, stride: Option<u32>) -> Self {
        Self::Array { element: Box::new(element), count, stride }
    }

    pub fn runtime_array(element: Type, stride: Option<u32>) -> Self {
        Self::RuntimeArray { element: Box::new(element), stride }
    }

    pub fn struct_(members: Vec<Type>, offsets: Vec<u32>) -> Self {
        Self::Struct { members, offsets }
    }

    pub fn pointer(pointee: Type, storage_class: StorageClass) -> Self {
        Self::Pointer { pointee: Box::new(pointee), storage_class }
    }
}

// =========================================================================
// Type Properties
// =========================================================================

impl Type {
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer { .. })
    }

    /// Integer of any width except 1.
    pub fn is_signless_integer(&self) -> bool {
        matches!(self, Self::Integer { width } if *width != 1)
    }

    pub fn is_integer_of(&self, width: u32) -> bool {
        matches!(self, Self::Integer { width: w } if *w == width)
    }

    pub fn is_bool(&self) -> bool {
        self.is_integer_of(1)
    }

    /// True for `i1` and vectors of `i1`.
    pub fn is_bool_scalar_or_vector(&self) -> bool {
        match self {
            Self::Vector { element, .. } => element.is_bool(),
            other => other.is_bool(),
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Self::Index)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }

    pub fn is_int_or_index_or_float(&self) -> bool {
        self.is_integer() || self.is_index() || self.is_float()
    }

    /// Vectors and tensors: the shaped types a composite constant may have.
    pub fn is_shaped(&self) -> bool {
        matches!(self, Self::Vector { .. } | Self::Tensor { .. } | Self::MemRef { .. })
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector { .. })
    }

    pub fn is_tensor(&self) -> bool {
        matches!(self, Self::Tensor { .. })
    }

    pub fn is_memref(&self) -> bool {
        matches!(self, Self::MemRef { .. })
    }

    /// Element type of shaped and array types.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Self::Vector { element, .. }
            | Self::Tensor { element, .. }
            | Self::MemRef { element, .. }
            | Self::Array { element, .. }
            | Self::RuntimeArray { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Dimensions of a shaped type. Vector dims are always static.
    pub fn dims(&self) -> Option<Shape> {
        match self {
            Self::Vector { shape, .. } => Some(shape.iter().copied().map(Dim::Static).collect()),
            Self::Tensor { shape, .. } | Self::MemRef { shape, .. } => Some(shape.clone()),
            _ => None,
        }
    }

    pub fn rank(&self) -> Option<usize> {
        match self {
            Self::Vector { shape, .. } => Some(shape.len()),
            Self::Tensor { shape, .. } | Self::MemRef { shape, .. } => Some(shape.len()),
            _ => None,
        }
    }

    /// Static dims of a shaped type; `None` if any dim is dynamic.
    pub fn static_shape(&self) -> Option<SmallVec<[usize; 4]>> {
        self.dims()?.iter().map(|d| d.as_static()).collect()
    }

    pub fn has_static_shape(&self) -> bool {
        self.static_shape().is_some()
    }

    /// Element count of a statically shaped type (1 for rank 0).
    pub fn num_elements(&self) -> Option<usize> {
        Some(self.static_shape()?.iter().product())
    }

    /// Same shaped kind with a different shape, keeping the element type.
    pub fn with_shape(&self, shape: &[usize]) -> Option<Self> {
        match self {
            Self::Vector { element, .. } => Some(Self::vector(shape, (**element).clone())),
            Self::Tensor { element, .. } => Some(Self::tensor(shape, (**element).clone())),
            Self::MemRef { element, memory_space, .. } => Some(Self::memref_in(shape, (**element).clone(), *memory_space)),
            _ => None,
        }
    }

    /// Same shaped kind and shape with a different element type.
    pub fn with_element(&self, element: Type) -> Option<Self> {
        match self {
            Self::Vector { shape, .. } => Some(Self::Vector { shape: shape.clone(), element: Box::new(element) }),
            Self::Tensor { shape, .. } => Some(Self::Tensor { shape: shape.clone(), element: Box::new(element) }),
            Self::MemRef { shape, memory_space, .. } => {
                Some(Self::MemRef { shape: shape.clone(), element: Box::new(element), memory_space: *memory_space })
            }
            _ => None,
        }
    }

    /// For `!spv.ptr<!spv.struct<[array<T>]>>` returns `T`: the element type a
    /// lowered memref actually stores.
    pub fn pointer_storage_element(&self) -> Option<&Type> {
        let Self::Pointer { pointee, .. } = self else { return None };
        let Self::Struct { members, .. } = pointee.as_ref() else { return None };
        members.first()?.element_type()
    }

    pub fn storage_class(&self) -> Option<StorageClass> {
        match self {
            Self::Pointer { storage_class, .. } => Some(*storage_class),
            _ => None,
        }
    }
}

impl From<FloatKind> for Type {
    fn from(kind: FloatKind) -> Self {
        Self::Float(kind)
    }
}

// =========================================================================
// Printing
// =========================================================================

fn write_dims(f: &mut fmt::Formatter<'_>, dims: impl IntoIterator<Item = Dim>) -> fmt::Result {
    for dim in dims {
        match dim {
            Dim::Static(n) => write!(f, "{n}x")?,
            Dim::Dynamic => write!(f, "?x")?,
        }
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer { width } => write!(f, "i{width}"),
            Self::Index => write!(f, "index"),
            Self::Float(kind) => write!(f, "{kind}"),
            Self::Vector { shape, element } => {
                write!(f, "vector<")?;
                write_dims(f, shape.iter().copied().map(Dim::Static))?;
                write!(f, "{element}>")
            }
            Self::Tensor { shape, element } => {
                write!(f, "tensor<")?;
                write_dims(f, shape.iter().copied())?;
                write!(f, "{element}>")
            }
            Self::MemRef { shape, element, memory_space } => {
                write!(f, "memref<")?;
                write_dims(f, shape.iter().copied())?;
                write!(f, "{element}")?;
                if *memory_space != 0 {
                    write!(f, ", {memory_space}")?;
                }
                write!(f, ">")
            }
            Self::Array { element, count, stride } => match stride {
                Some(stride) => write!(f, "!spv.array<{count} x {element} [{stride}]>"),
                None => write!(f, "!spv.array<{count} x {element}>"),
            },
            Self::RuntimeArray { element, stride } => match stride {
                Some(stride) => write!(f, "!spv.rtarray<{element} [{stride}]>"),
                None => write!(f, "!spv.rtarray<{element}>"),
            },
            Self::Struct { members, offsets } => {
                write!(f, "!spv.struct<")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match offsets.get(i) {
                        Some(offset) => write!(f, "{member} [{offset}]")?,
                        None => write!(f, "{member}")?,
                    }
                }
                write!(f, ">")
            }
            Self::Pointer { pointee, storage_class } => write!(f, "!spv.ptr<{pointee}, {storage_class}>"),
        }
    }
}
