use proptest::prelude::*;

use spindle_dtype::Type;
use spindle_ir::test::property::generators::{arb_int_width, arb_integer_attr};
use spindle_ir::{Diagnostics, FloatAttr, Location};

use crate::attr::{convert_float_attr, convert_integer_attr, narrow_to_f32};

proptest! {
    #[test]
    fn integer_conversion_succeeds_iff_some_reading_fits(attr in arb_integer_attr(), width in arb_int_width()) {
        let mut diagnostics = Diagnostics::new();
        let converted = convert_integer_attr(&attr, &Type::int(width), &mut diagnostics, &Location::Unknown);

        let fits = attr.fits_unsigned(width) || attr.fits_signed(width);
        prop_assert_eq!(converted.is_some(), fits);
        // Only the silent unsigned path leaves no remark.
        prop_assert_eq!(diagnostics.is_empty(), attr.fits_unsigned(width));
    }

    #[test]
    fn signed_fit_preserves_value(attr in arb_integer_attr(), width in arb_int_width()) {
        prop_assume!(attr.fits_signed(width));
        let converted = convert_integer_attr(&attr, &Type::int(width), &mut Diagnostics::new(), &Location::Unknown);
        prop_assert_eq!(converted.map(|c| c.as_signed()), Some(attr.as_signed()));
    }

    #[test]
    fn converted_type_is_destination(attr in arb_integer_attr(), width in arb_int_width()) {
        let dst = Type::int(width);
        if let Some(converted) = convert_integer_attr(&attr, &dst, &mut Diagnostics::new(), &Location::Unknown) {
            prop_assert_eq!(converted.ty(), &dst);
        }
    }

    #[test]
    fn every_f32_value_narrows_back(value in any::<f32>().prop_filter("not nan", |v| !v.is_nan())) {
        let narrowed = narrow_to_f32(f64::from(value));
        prop_assert_eq!(narrowed.map(f32::to_bits), Some(value.to_bits()));
    }

    #[test]
    fn narrowing_is_exact_or_refused(value in any::<f64>().prop_filter("not nan", |v| !v.is_nan())) {
        if let Some(narrowed) = narrow_to_f32(value) {
            prop_assert_eq!(f64::from(narrowed).to_bits(), value.to_bits());
        }
    }

    #[test]
    fn float_attr_conversion_matches_narrowing(value in any::<f64>()) {
        let mut diagnostics = Diagnostics::new();
        let attr = FloatAttr::new(Type::f64(), value);
        let converted = convert_float_attr(&attr, &Type::f32(), &mut diagnostics, &Location::Unknown);
        prop_assert_eq!(converted.is_some(), narrow_to_f32(value).is_some());
        prop_assert_eq!(diagnostics.len(), usize::from(converted.is_none()));
    }
}
