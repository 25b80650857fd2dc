//! Source to target type conversion.

use spindle_dtype::{Dim, FloatKind, StorageClass, Type};
use spindle_ir::TypeConversion;

use crate::target::TargetEnv;

/// Converts standard types to SPIR-V types legal in a [`TargetEnv`].
#[derive(Debug, Clone, Default)]
pub struct TypeConverter {
    env: TargetEnv,
}

impl TypeConverter {
    pub fn new(env: TargetEnv) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &TargetEnv {
        &self.env
    }

    /// Converts `ty`, or `None` if it has no legal counterpart.
    pub fn convert_type(&self, ty: &Type) -> Option<Type> {
        let converted = match ty {
            Type::Integer { width } => self.convert_int(*width),
            Type::Index => Some(Type::i32()),
            Type::Float(FloatKind::BF16) => None,
            Type::Float(kind) if self.env.supports_float(*kind) => Some(ty.clone()),
            Type::Float(_) => Some(Type::f32()),
            Type::Vector { shape, element } => self.convert_vector(shape, element),
            Type::Tensor { shape, element } => self.convert_tensor(shape, element),
            Type::MemRef { shape, element, memory_space } => self.convert_memref(shape, element, *memory_space),
            Type::Array { .. } | Type::RuntimeArray { .. } | Type::Struct { .. } | Type::Pointer { .. } => {
                Some(ty.clone())
            }
        };
        if converted.is_none() {
            tracing::trace!(%ty, "no legal type");
        }
        converted
    }

    fn convert_int(&self, width: u32) -> Option<Type> {
        match width {
            1 => Some(Type::bool_()),
            8 | 16 | 32 | 64 if self.env.supports_int_width(width) => Some(Type::int(width)),
            8 | 16 | 64 => Some(Type::i32()),
            _ => None,
        }
    }

    /// Scalar element of a composite: integers including `i1`, `index` and floats.
    fn convert_scalar(&self, ty: &Type) -> Option<Type> {
        match ty {
            Type::Integer { .. } | Type::Index | Type::Float(_) => self.convert_type(ty),
            _ => None,
        }
    }

    fn convert_vector(&self, shape: &[usize], element: &Type) -> Option<Type> {
        let [count] = shape else { return None };
        if !(2..=4).contains(count) {
            return None;
        }
        Some(Type::vector(shape, self.convert_scalar(element)?))
    }

    fn convert_tensor(&self, shape: &[Dim], element: &Type) -> Option<Type> {
        let count = shape.iter().map(|d| d.as_static()).product::<Option<usize>>()?;
        let element = self.convert_scalar(element)?;
        let stride = element.byte_size()?;
        Some(Type::array(element, count, Some(stride)))
    }

    /// Element type as stored in memory of the given storage class.
    ///
    /// Sub-word integers in interface storage need an explicit storage access
    /// capability; without it they are widened to `i32`, and loads and stores
    /// pack them into words.
    pub fn convert_storage_element(&self, element: &Type, storage_class: StorageClass) -> Option<Type> {
        if !storage_class.is_interface_storage() {
            return match element {
                Type::Vector { .. } => self.convert_type(element),
                other => self.convert_scalar(other),
            };
        }
        match element {
            Type::Integer { width: 1 } => None,
            Type::Integer { width } if self.env.supports_storage_int_width(*width) => Some(element.clone()),
            Type::Integer { width: 8 | 16 | 64 } => Some(Type::i32()),
            Type::Integer { .. } => None,
            Type::Vector { .. } => self.convert_type(element),
            other => self.convert_scalar(other),
        }
    }

    fn convert_memref(&self, shape: &[Dim], element: &Type, memory_space: u32) -> Option<Type> {
        let storage_class = StorageClass::from_memory_space(memory_space)?;
        let element = self.convert_storage_element(element, storage_class)?;
        let stride = element.byte_size()?;

        let count = shape.iter().map(|d| d.as_static()).product::<Option<usize>>();
        let array = match count {
            Some(count) => Type::array(element, count, Some(stride)),
            None => Type::runtime_array(element, Some(stride)),
        };
        Some(Type::pointer(Type::struct_(vec![array], vec![0]), storage_class))
    }
}

impl TypeConversion for TypeConverter {
    fn convert_type(&self, ty: &Type) -> Option<Type> {
        TypeConverter::convert_type(self, ty)
    }
}
