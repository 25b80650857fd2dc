use crate::*;
use proptest::prelude::*;

pub fn int_type() -> impl Strategy<Value = Type> {
    prop_oneof![Just(Type::i8()), Just(Type::i16()), Just(Type::i32()), Just(Type::i64())]
}

pub fn float_type() -> impl Strategy<Value = Type> {
    prop_oneof![Just(Type::f16()), Just(Type::f32()), Just(Type::f64())]
}

pub fn scalar_type() -> impl Strategy<Value = Type> {
    prop_oneof![Just(Type::bool_()), Just(Type::index()), int_type(), float_type()]
}

/// Static shapes of rank 1..=3 with small extents.
pub fn static_shape() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..8, 1..=3)
}

pub fn tensor_type() -> impl Strategy<Value = Type> {
    (static_shape(), scalar_type()).prop_map(|(shape, element)| Type::tensor(&shape, element))
}

pub fn memref_type() -> impl Strategy<Value = Type> {
    (static_shape(), prop_oneof![int_type(), float_type()]).prop_map(|(shape, element)| Type::memref(&shape, element))
}
