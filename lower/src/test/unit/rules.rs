//! Rule catalog tests for the value-only ops.

use spindle_dtype::{Capability, Type};
use spindle_ir::{CmpFPredicate, CmpIPredicate, Diagnostics, Function, OpKind, SpvOp, StdOp, StdOpKey};
use test_case::test_case;

use crate::patterns::{CAST_TABLE, ELEMENTWISE_TABLE, cmpf_to_spirv};
use crate::{Error, TargetEnv, lower_to_spirv, std_to_spirv_patterns};

fn lower(func: &mut Function) -> Result<Diagnostics, Error> {
    lower_env(func, &TargetEnv::default())
}

fn lower_env(func: &mut Function, env: &TargetEnv) -> Result<Diagnostics, Error> {
    let mut diagnostics = Diagnostics::new();
    lower_to_spirv(func, env, &mut diagnostics)?;
    Ok(diagnostics)
}

fn kinds(func: &Function) -> Vec<OpKind> {
    func.ops().map(|(_, op)| op.kind).collect()
}

fn failed_op(err: Error) -> String {
    match err {
        Error::Conversion { source: spindle_ir::Error::LegalizationFailed { op, .. }, .. } => op,
        other => panic!("unexpected error {other}"),
    }
}

/// `f(a, b) { r = op a, b; return }`
fn binary(op: StdOp, operand: Type, result: Type) -> Function {
    let mut func = Function::new("binary");
    let a = func.add_argument(operand.clone());
    let b = func.add_argument(operand);
    func.push_value(op, &[a, b], result);
    func.push(StdOp::Return, &[], &[]);
    func
}

#[test]
fn every_std_key_has_rules() {
    let patterns = std_to_spirv_patterns();
    for (key, _) in ELEMENTWISE_TABLE.iter().chain(CAST_TABLE) {
        assert_eq!(patterns.rule_names(*key).len(), 1, "{key}");
    }
    assert_eq!(patterns.rule_names(StdOpKey::CmpI), vec!["bool_cmpi", "cmpi"]);
    assert_eq!(patterns.rule_names(StdOpKey::Constant), vec!["composite_constant", "constant"]);
    assert_eq!(patterns.rule_names(StdOpKey::Load), vec!["int_load", "load"]);
    assert_eq!(patterns.rule_names(StdOpKey::Store), vec!["int_store", "store"]);
    assert!(!patterns.has_rules_for(StdOpKey::Alloc));
}

#[test_case(StdOp::AddF, SpvOp::FAdd ; "addf")]
#[test_case(StdOp::SubF, SpvOp::FSub ; "subf")]
#[test_case(StdOp::RemF, SpvOp::FRem ; "remf")]
#[test_case(StdOp::AbsF, SpvOp::GlslFAbs ; "absf")]
#[test_case(StdOp::Rsqrt, SpvOp::GlslInverseSqrt ; "rsqrt")]
fn float_elementwise(op: StdOp, expected: SpvOp) {
    let mut func = binary(op, Type::f32(), Type::f32());
    lower(&mut func).unwrap();
    assert_eq!(kinds(&func), vec![OpKind::Spv(expected), OpKind::Spv(SpvOp::Return)]);
}

#[test_case(StdOp::AddI, SpvOp::IAdd ; "addi")]
#[test_case(StdOp::SignedDivI, SpvOp::SDiv ; "divi signed")]
#[test_case(StdOp::UnsignedRemI, SpvOp::UMod ; "remi unsigned")]
#[test_case(StdOp::SignedShiftRight, SpvOp::ShiftRightArithmetic ; "shift right signed")]
#[test_case(StdOp::UnsignedShiftRight, SpvOp::ShiftRightLogical ; "shift right unsigned")]
fn integer_elementwise(op: StdOp, expected: SpvOp) {
    let mut func = binary(op, Type::index(), Type::index());
    lower(&mut func).unwrap();
    let id = func.ops_of(expected)[0];
    assert_eq!(func.value_type(func.op(id).results[0]), &Type::i32());
}

#[test]
fn unsupported_width_fails_in_signature() {
    let mut func = binary(StdOp::AddI, Type::int(7), Type::int(7));
    let err = lower(&mut func).unwrap_err();
    assert!(matches!(err, Error::Conversion { source: spindle_ir::Error::ArgumentConversionFailed { index: 0, .. }, .. }));
}

#[test_case(StdOp::And, Type::bool_(), SpvOp::LogicalAnd ; "and bool")]
#[test_case(StdOp::Or, Type::bool_(), SpvOp::LogicalOr ; "or bool")]
#[test_case(StdOp::And, Type::vector(&[4], Type::bool_()), SpvOp::LogicalAnd ; "and bool vector")]
#[test_case(StdOp::And, Type::i32(), SpvOp::BitwiseAnd ; "and int")]
#[test_case(StdOp::Or, Type::i32(), SpvOp::BitwiseOr ; "or int")]
#[test_case(StdOp::Xor, Type::i32(), SpvOp::BitwiseXor ; "xor int")]
fn bitwise_or_logical(op: StdOp, ty: Type, expected: SpvOp) {
    let mut func = binary(op, ty.clone(), ty);
    lower(&mut func).unwrap();
    assert_eq!(func.ops_of(expected).len(), 1);
}

#[test]
fn xor_on_bool_is_not_legalized() {
    let mut func = binary(StdOp::Xor, Type::bool_(), Type::bool_());
    assert_eq!(failed_op(lower(&mut func).unwrap_err()), "std.xor");
}

#[test_case(CmpFPredicate::Oeq, SpvOp::FOrdEqual ; "oeq")]
#[test_case(CmpFPredicate::Oge, SpvOp::FOrdGreaterThanEqual ; "oge")]
#[test_case(CmpFPredicate::One, SpvOp::FOrdNotEqual ; "one")]
#[test_case(CmpFPredicate::Ult, SpvOp::FUnordLessThan ; "ult")]
#[test_case(CmpFPredicate::Une, SpvOp::FUnordNotEqual ; "une")]
fn cmpf(predicate: CmpFPredicate, expected: SpvOp) {
    let mut func = binary(StdOp::CmpF(predicate), Type::f32(), Type::bool_());
    lower(&mut func).unwrap();
    let id = func.ops_of(expected)[0];
    assert_eq!(func.value_type(func.op(id).results[0]), &Type::bool_());
}

#[test]
fn cmpf_table_has_twelve_predicates() {
    let mapped = <CmpFPredicate as strum::VariantArray>::VARIANTS.iter().filter_map(|p| cmpf_to_spirv(*p)).count();
    assert_eq!(mapped, 12);
}

#[test]
fn cmpf_ord_is_not_legalized() {
    let mut func = binary(StdOp::CmpF(CmpFPredicate::Ord), Type::f32(), Type::bool_());
    assert_eq!(failed_op(lower(&mut func).unwrap_err()), "std.cmpf");
}

#[test_case(CmpIPredicate::Eq, SpvOp::LogicalEqual ; "eq")]
#[test_case(CmpIPredicate::Ne, SpvOp::LogicalNotEqual ; "ne")]
fn cmpi_on_bool(predicate: CmpIPredicate, expected: SpvOp) {
    let mut func = binary(StdOp::CmpI(predicate), Type::bool_(), Type::bool_());
    lower(&mut func).unwrap();
    assert_eq!(func.ops_of(expected).len(), 1);
}

#[test]
fn ordered_cmpi_on_bool_is_not_legalized() {
    let mut func = binary(StdOp::CmpI(CmpIPredicate::Slt), Type::bool_(), Type::bool_());
    assert_eq!(failed_op(lower(&mut func).unwrap_err()), "std.cmpi");
}

#[test_case(CmpIPredicate::Eq, SpvOp::IEqual ; "eq")]
#[test_case(CmpIPredicate::Sle, SpvOp::SLessThanEqual ; "sle")]
#[test_case(CmpIPredicate::Ugt, SpvOp::UGreaterThan ; "ugt")]
fn cmpi_on_integers(predicate: CmpIPredicate, expected: SpvOp) {
    let mut func = binary(StdOp::CmpI(predicate), Type::i64(), Type::bool_());
    lower(&mut func).unwrap();
    let id = func.ops_of(expected)[0];
    assert_eq!(func.value_type(func.op(id).operands[0]), &Type::i32());
}

#[test]
fn select_converts_result_type() {
    let mut func = Function::new("select");
    let cond = func.add_argument(Type::bool_());
    let a = func.add_argument(Type::f64());
    let b = func.add_argument(Type::f64());
    func.push_value(StdOp::Select, &[cond, a, b], Type::f64());
    func.push(StdOp::Return, &[], &[]);

    lower(&mut func).unwrap();
    let select = func.op(func.ops_of(SpvOp::Select)[0]);
    assert_eq!(select.operands.as_slice(), func.arguments());
    assert_eq!(func.value_type(select.results[0]), &Type::f32());
}

#[test]
fn return_with_values_is_not_legalized() {
    let mut func = Function::new("ret");
    let a = func.add_argument(Type::f32());
    func.push(StdOp::Return, &[a], &[]);
    assert_eq!(failed_op(lower(&mut func).unwrap_err()), "std.return");
}

#[test]
fn identity_cast_is_erased() {
    let mut func = Function::new("cast");
    let a = func.add_argument(Type::i32());
    let cast = func.push_value(StdOp::IndexCast, &[a], Type::index());
    func.push_value(StdOp::AddI, &[cast, cast], Type::index());
    func.push(StdOp::Return, &[], &[]);

    lower(&mut func).unwrap();
    assert_eq!(kinds(&func), vec![OpKind::Spv(SpvOp::IAdd), OpKind::Spv(SpvOp::Return)]);
    let add = func.op(func.ops_of(SpvOp::IAdd)[0]);
    assert_eq!(add.operands.as_slice(), &[a, a]);
}

#[test_case(StdOp::SignExtendI, Type::i16(), Type::i64(), SpvOp::SConvert ; "sexti")]
#[test_case(StdOp::ZeroExtendI, Type::i16(), Type::i64(), SpvOp::UConvert ; "zexti")]
#[test_case(StdOp::TruncateI, Type::i64(), Type::i16(), SpvOp::SConvert ; "trunci")]
#[test_case(StdOp::SIToFP, Type::i32(), Type::f32(), SpvOp::ConvertSToF ; "sitofp")]
#[test_case(StdOp::FPToSI, Type::f32(), Type::i32(), SpvOp::ConvertFToS ; "fptosi")]
#[test_case(StdOp::FPExt, Type::f16(), Type::f64(), SpvOp::FConvert ; "fpext")]
fn casts_with_capabilities(op: StdOp, from: Type, to: Type, expected: SpvOp) {
    let env = TargetEnv::builder()
        .capabilities(Capability::Int16 | Capability::Int64 | Capability::Float16 | Capability::Float64)
        .build();
    let mut func = Function::new("cast");
    let a = func.add_argument(from);
    func.push_value(op, &[a], to.clone());
    func.push(StdOp::Return, &[], &[]);

    lower_env(&mut func, &env).unwrap();
    let cast = func.op(func.ops_of(expected)[0]);
    assert_eq!(func.value_type(cast.results[0]), &to);
}

#[test]
fn cast_that_collapses_under_baseline_is_erased() {
    let mut func = Function::new("cast");
    let a = func.add_argument(Type::i16());
    let wide = func.push_value(StdOp::SignExtendI, &[a], Type::i64());
    func.push_value(StdOp::MulI, &[wide, wide], Type::i64());
    func.push(StdOp::Return, &[], &[]);

    lower(&mut func).unwrap();
    assert!(func.ops_of(SpvOp::SConvert).is_empty());
    assert_eq!(func.ops_of(SpvOp::IMul).len(), 1);
}
