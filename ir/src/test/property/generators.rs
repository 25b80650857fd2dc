//! Strategies for attributes.

use proptest::prelude::*;

use spindle_dtype::Type;

use crate::attr::{Attribute, IntegerAttr};

pub fn arb_int_width() -> impl Strategy<Value = u32> {
    prop_oneof![Just(8u32), Just(16), Just(32), Just(64)]
}

/// Integer attribute of a random width holding a random bit pattern.
pub fn arb_integer_attr() -> impl Strategy<Value = IntegerAttr> {
    (arb_int_width(), any::<u64>()).prop_map(|(width, bits)| IntegerAttr::from_bits(Type::int(width), bits))
}

/// Values spread over every magnitude, not just the extremes `any::<i64>` favours.
pub fn arb_spread_i64() -> impl Strategy<Value = i64> {
    (0u32..64, any::<i64>(), any::<bool>()).prop_map(|(bits, raw, negative)| {
        let magnitude = (if bits == 0 { 0 } else { raw.unsigned_abs() >> (64 - bits) }) as i64;
        if negative { -magnitude } else { magnitude }
    })
}

pub fn arb_int_attribute(ty: Type) -> impl Strategy<Value = Attribute> {
    arb_spread_i64().prop_map(move |v| Attribute::int(ty.clone(), v))
}
