use enumset::EnumSet;
use spindle_dtype::{Capability, FloatKind};
use test_case::test_case;

use crate::{Error, TargetEnv};

#[test]
fn parses_capability_list() {
    let env = TargetEnv::from_caps_str("Int8, StorageBuffer8BitAccess,Float64").unwrap();
    assert_eq!(
        env.capabilities(),
        Capability::Int8 | Capability::StorageBuffer8BitAccess | Capability::Float64
    );
}

#[test]
fn empty_list_is_baseline() {
    assert_eq!(TargetEnv::from_caps_str(" , ").unwrap(), TargetEnv::default());
}

#[test]
fn unknown_capability_is_rejected() {
    let err = TargetEnv::from_caps_str("Int8,Int128").unwrap_err();
    assert_eq!(err, Error::UnknownCapability { name: "Int128".into() });
    assert_eq!(err.to_string(), "unknown capability 'Int128'");
}

#[test]
fn builder_defaults_to_no_capabilities() {
    assert_eq!(TargetEnv::builder().build().capabilities(), EnumSet::empty());
    let env = TargetEnv::builder().capabilities(Capability::Int16 | Capability::Int64).build();
    assert!(env.supports(Capability::Int16));
    assert!(!env.supports(Capability::Int8));
}

#[test_case(1, true ; "bool")]
#[test_case(8, false ; "i8")]
#[test_case(32, true ; "i32")]
#[test_case(64, false ; "i64")]
#[test_case(24, false ; "odd")]
fn baseline_int_widths(width: u32, supported: bool) {
    assert_eq!(TargetEnv::default().supports_int_width(width), supported);
}

#[test]
fn storage_widths_follow_access_capabilities() {
    let env = TargetEnv::default().with_capability(Capability::Int8);
    assert!(env.supports_int_width(8));
    assert!(!env.supports_storage_int_width(8));

    let env = env.with_capability(Capability::StorageBuffer8BitAccess);
    assert!(env.supports_storage_int_width(8));
    assert!(!env.supports_storage_int_width(16));
}

#[test]
fn bf16_is_never_supported() {
    let env = TargetEnv::builder().capabilities(EnumSet::all()).build();
    assert!(!env.supports_float(FloatKind::BF16));
    assert!(env.supports_float(FloatKind::F16));
}
