use proptest::prelude::*;

use spindle_dtype::Type;

use super::generators::*;
use crate::attr::IntegerAttr;

proptest! {
    #[test]
    fn bits_never_exceed_width(attr in arb_integer_attr()) {
        prop_assert!(attr.fits_unsigned(attr.width()));
    }

    #[test]
    fn signed_value_round_trips_through_bits(value in arb_spread_i64()) {
        let attr = IntegerAttr::new(Type::i64(), value);
        prop_assert_eq!(attr.as_signed(), value);
    }

    #[test]
    fn signed_fit_agrees_with_narrow_cast(value in arb_spread_i64(), width in prop_oneof![Just(8u32), Just(16), Just(32)]) {
        let attr = IntegerAttr::new(Type::i64(), value);
        let narrowed = attr.with_type(Type::int(width));
        prop_assert_eq!(attr.fits_signed(width), narrowed.as_signed() == value);
    }

    #[test]
    fn unsigned_fit_agrees_with_truncation(attr in arb_integer_attr(), width in arb_int_width()) {
        let truncated = attr.with_type(Type::int(width));
        prop_assert_eq!(attr.fits_unsigned(width), truncated.as_unsigned() == attr.as_unsigned());
    }
}
