use spindle_dtype::{Capability, Type};
use spindle_ir::{Attribute, DenseElementsAttr, Diagnostics, Function, Severity, SpvOp, StdOp};
use test_case::test_case;

use crate::{Error, TargetEnv, lower_to_spirv};

fn ints(ty: &Type, values: &[i64]) -> Vec<Attribute> {
    values.iter().map(|&v| Attribute::int(ty.clone(), v)).collect()
}

/// Function holding one constant of type `ty` followed by a return.
fn constant_fn(ty: Type, value: Attribute) -> Function {
    let mut func = Function::new("constant");
    func.constant(ty, value);
    func.push(StdOp::Return, &[], &[]);
    func
}

fn lower(func: &mut Function, env: &TargetEnv) -> (Result<(), Error>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let result = lower_to_spirv(func, env, &mut diagnostics);
    (result, diagnostics)
}

/// Result type and value of the single `spv.constant`.
fn spv_constant(func: &Function) -> (Type, Attribute) {
    let ops = func.ops_of(SpvOp::Constant);
    assert_eq!(ops.len(), 1);
    let op = func.op(ops[0]);
    (func.value_type(op.results[0]).clone(), op.attr("value").unwrap().clone())
}

#[test]
fn tensor_2x2_i64_becomes_flat_i32_array() {
    let ty = Type::tensor(&[2, 2], Type::i64());
    let dense = DenseElementsAttr::new(ty.clone(), ints(&Type::i64(), &[1, 2, 3, 4])).unwrap();
    let mut func = constant_fn(ty, dense.into());

    let (result, diagnostics) = lower(&mut func, &TargetEnv::default());
    result.unwrap();
    assert!(diagnostics.is_empty());

    let (result_ty, value) = spv_constant(&func);
    assert_eq!(result_ty, Type::array(Type::i32(), 4, Some(4)));
    let expected = DenseElementsAttr::new(Type::tensor(&[4], Type::i32()), ints(&Type::i32(), &[1, 2, 3, 4])).unwrap();
    assert_eq!(value, Attribute::DenseElements(expected));
}

#[test]
fn float_vector_keeps_elements() {
    let ty = Type::vector(&[2], Type::f32());
    let elements = vec![Attribute::float(Type::f32(), 0.5), Attribute::float(Type::f32(), -2.0)];
    let dense = DenseElementsAttr::new(ty.clone(), elements).unwrap();
    let mut func = constant_fn(ty.clone(), dense.clone().into());

    lower(&mut func, &TargetEnv::default()).0.unwrap();
    assert_eq!(spv_constant(&func), (ty, Attribute::DenseElements(dense)));
}

#[test]
fn f64_vector_narrows_element_wise() {
    let ty = Type::vector(&[3], Type::f64());
    let elements = [1.0, 0.25, -8.0].iter().map(|&v| Attribute::float(Type::f64(), v)).collect();
    let mut func = constant_fn(ty, DenseElementsAttr::new(Type::vector(&[3], Type::f64()), elements).unwrap().into());

    lower(&mut func, &TargetEnv::default()).0.unwrap();
    let (result_ty, value) = spv_constant(&func);
    assert_eq!(result_ty, Type::vector(&[3], Type::f32()));
    let dense = value.as_dense().unwrap();
    assert_eq!(dense.ty(), &Type::vector(&[3], Type::f32()));
    assert!(dense.elements().iter().all(|e| e.ty() == Some(Type::f32())));
}

#[test]
fn element_that_does_not_fit_fails_the_constant() {
    let ty = Type::tensor(&[2], Type::i64());
    let dense = DenseElementsAttr::new(ty.clone(), ints(&Type::i64(), &[-1, 1 << 40])).unwrap();
    let mut func = constant_fn(ty, dense.into());

    let (result, diagnostics) = lower(&mut func, &TargetEnv::default());
    assert!(result.is_err());
    // The first element was narrowed before the second failed; nothing of the
    // discarded attempt is reported.
    assert_eq!(diagnostics.of_severity(Severity::Remark).count(), 0);
    assert_eq!(diagnostics.of_severity(Severity::Error).count(), 1);
    assert!(func.ops_of(SpvOp::Constant).is_empty());
}

#[test]
fn signed_reinterpretation_remark_survives_conversion() {
    let ty = Type::tensor(&[2], Type::i64());
    let dense = DenseElementsAttr::new(ty.clone(), ints(&Type::i64(), &[-1, 2])).unwrap();
    let mut func = constant_fn(ty, dense.into());

    let (result, diagnostics) = lower(&mut func, &TargetEnv::default());
    result.unwrap();
    let remarks: Vec<_> = diagnostics.of_severity(Severity::Remark).collect();
    assert_eq!(remarks.len(), 1);
    assert!(remarks[0].message.contains("converted to"), "{}", remarks[0].message);
}

#[test_case(Type::vector(&[2], Type::index()), Type::vector(&[2], Type::i32()) ; "vector")]
#[test_case(Type::tensor(&[2], Type::index()), Type::array(Type::i32(), 2, Some(4)) ; "tensor")]
fn index_composite_becomes_i32(ty: Type, expected: Type) {
    let dense = DenseElementsAttr::new(ty.clone(), ints(&Type::index(), &[7, 3])).unwrap();
    let mut func = constant_fn(ty, dense.into());

    let (result, diagnostics) = lower(&mut func, &TargetEnv::default());
    result.unwrap();
    assert!(diagnostics.is_empty());
    let (result_ty, value) = spv_constant(&func);
    assert_eq!(result_ty, expected);
    assert_eq!(value.as_dense().unwrap().elements(), ints(&Type::i32(), &[7, 3]).as_slice());
}

#[test]
fn multi_dimensional_vector_fails() {
    let ty = Type::vector(&[2, 2], Type::f32());
    let dense = DenseElementsAttr::splat(ty.clone(), Attribute::float(Type::f32(), 1.0)).unwrap();
    let mut func = constant_fn(ty, dense.into());
    assert!(lower(&mut func, &TargetEnv::default()).0.is_err());
}

#[test]
fn composite_keeps_wide_elements_with_capability() {
    let env = TargetEnv::default().with_capability(Capability::Int64);
    let ty = Type::tensor(&[2], Type::i64());
    let dense = DenseElementsAttr::new(ty.clone(), ints(&Type::i64(), &[i64::MIN, i64::MAX])).unwrap();
    let mut func = constant_fn(ty, dense.into());

    lower(&mut func, &env).0.unwrap();
    let (result_ty, value) = spv_constant(&func);
    assert_eq!(result_ty, Type::array(Type::i64(), 2, Some(8)));
    assert_eq!(value.as_dense().unwrap().elements(), ints(&Type::i64(), &[i64::MIN, i64::MAX]).as_slice());
}

#[test_case(Type::i64(), 5, 5 ; "fits")]
#[test_case(Type::i64(), -1, -1 ; "negative")]
#[test_case(Type::index(), 64, 64 ; "index")]
#[test_case(Type::i16(), -300, -300 ; "i16")]
fn scalar_integer(ty: Type, value: i64, expected: i64) {
    let mut func = constant_fn(ty.clone(), Attribute::int(ty, value));
    lower(&mut func, &TargetEnv::default()).0.unwrap();
    assert_eq!(spv_constant(&func), (Type::i32(), Attribute::int(Type::i32(), expected)));
}

#[test]
fn scalar_integer_out_of_range_fails() {
    let mut func = constant_fn(Type::i64(), Attribute::int(Type::i64(), 1 << 33));
    let (result, diagnostics) = lower(&mut func, &TargetEnv::default());
    assert!(result.is_err());
    assert_eq!(diagnostics.of_severity(Severity::Remark).count(), 0);
    assert!(diagnostics.has_errors());
}

#[test_case(Attribute::Bool(true), true ; "bool attr")]
#[test_case(Attribute::int(Type::bool_(), 1), true ; "one")]
#[test_case(Attribute::int(Type::bool_(), 0), false ; "zero")]
fn bool_constants_normalize(value: Attribute, expected: bool) {
    let mut func = constant_fn(Type::bool_(), value);
    lower(&mut func, &TargetEnv::default()).0.unwrap();
    assert_eq!(spv_constant(&func), (Type::bool_(), Attribute::Bool(expected)));
}

#[test]
fn f64_scalar_narrows_exactly() {
    let mut func = constant_fn(Type::f64(), Attribute::float(Type::f64(), 1.5));
    lower(&mut func, &TargetEnv::default()).0.unwrap();
    assert_eq!(spv_constant(&func), (Type::f32(), Attribute::float(Type::f32(), 1.5)));
}

#[test]
fn f64_scalar_inexact_fails() {
    let mut func = constant_fn(Type::f64(), Attribute::float(Type::f64(), 0.1));
    assert!(lower(&mut func, &TargetEnv::default()).0.is_err());
}

#[test]
fn f64_scalar_kept_with_capability() {
    let env = TargetEnv::default().with_capability(Capability::Float64);
    let mut func = constant_fn(Type::f64(), Attribute::float(Type::f64(), 0.1));
    lower(&mut func, &env).0.unwrap();
    assert_eq!(spv_constant(&func), (Type::f64(), Attribute::float(Type::f64(), 0.1)));
}
