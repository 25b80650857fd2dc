use super::*;

/// Rust scalar types with a fixed IR type.
pub trait HasType {
    const TYPE: Type;
}

macro_rules! impl_type_ext {
    ($($ty:ty => $type:expr),* $(,)?) => {
        $(impl HasType for $ty { const TYPE: Type = $type; })*
    };
}

impl_type_ext! {
    bool => Type::bool_(),
    i8 => Type::i8(), i16 => Type::i16(), i32 => Type::i32(), i64 => Type::i64(),
    u8 => Type::i8(), u16 => Type::i16(), u32 => Type::i32(), u64 => Type::i64(),
    f32 => Type::f32(), f64 => Type::f64(),
}

impl Type {
    /// IR type of a Rust scalar. Unsigned Rust types map to signless integers.
    pub const fn of<T: HasType>() -> Type {
        T::TYPE
    }
}
