//! Operation kinds of the standard and SPIR-V dialects.
//!
//! Operands, results and attributes live on the [`Operation`](crate::Operation);
//! the kind only carries what selects the semantics, such as comparison
//! predicates or the scope and memory semantics of an atomic.

use std::fmt;

/// Floating-point comparison predicate of `std.cmpf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::VariantArray)]
#[strum(serialize_all = "lowercase")]
pub enum CmpFPredicate {
    #[strum(serialize = "false")]
    AlwaysFalse,
    Oeq,
    Ogt,
    Oge,
    Olt,
    Ole,
    One,
    Ord,
    Ueq,
    Ugt,
    Uge,
    Ult,
    Ule,
    Une,
    Uno,
    #[strum(serialize = "true")]
    AlwaysTrue,
}

/// Integer comparison predicate of `std.cmpi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::VariantArray)]
#[strum(serialize_all = "lowercase")]
pub enum CmpIPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

/// Execution scope of a SPIR-V atomic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Scope {
    CrossDevice,
    Device,
    Workgroup,
    Subgroup,
    Invocation,
}

/// Memory semantics of a SPIR-V atomic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum MemorySemantics {
    None,
    Acquire,
    Release,
    AcquireRelease,
    SequentiallyConsistent,
}

/// Standard dialect operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumDiscriminants)]
#[strum_discriminants(name(StdOpKey), derive(Hash, strum::Display, strum::VariantArray))]
pub enum StdOp {
    #[strum(serialize = "std.absf")]
    AbsF,
    #[strum(serialize = "std.addf")]
    AddF,
    #[strum(serialize = "std.addi")]
    AddI,
    #[strum(serialize = "std.and")]
    And,
    #[strum(serialize = "std.ceilf")]
    CeilF,
    #[strum(serialize = "std.cmpf")]
    CmpF(CmpFPredicate),
    #[strum(serialize = "std.cmpi")]
    CmpI(CmpIPredicate),
    #[strum(serialize = "std.constant")]
    Constant,
    #[strum(serialize = "std.cos")]
    Cos,
    #[strum(serialize = "std.divf")]
    DivF,
    #[strum(serialize = "std.exp")]
    Exp,
    #[strum(serialize = "std.log")]
    Log,
    #[strum(serialize = "std.mulf")]
    MulF,
    #[strum(serialize = "std.muli")]
    MulI,
    #[strum(serialize = "std.negf")]
    NegF,
    #[strum(serialize = "std.or")]
    Or,
    #[strum(serialize = "std.remf")]
    RemF,
    #[strum(serialize = "std.rsqrt")]
    Rsqrt,
    #[strum(serialize = "std.shift_left")]
    ShiftLeft,
    #[strum(serialize = "std.divi_signed")]
    SignedDivI,
    #[strum(serialize = "std.remi_signed")]
    SignedRemI,
    #[strum(serialize = "std.shift_right_signed")]
    SignedShiftRight,
    #[strum(serialize = "std.sin")]
    Sin,
    #[strum(serialize = "std.sqrt")]
    Sqrt,
    #[strum(serialize = "std.subf")]
    SubF,
    #[strum(serialize = "std.subi")]
    SubI,
    #[strum(serialize = "std.tanh")]
    Tanh,
    #[strum(serialize = "std.divi_unsigned")]
    UnsignedDivI,
    #[strum(serialize = "std.remi_unsigned")]
    UnsignedRemI,
    #[strum(serialize = "std.shift_right_unsigned")]
    UnsignedShiftRight,
    #[strum(serialize = "std.xor")]
    Xor,
    #[strum(serialize = "std.load")]
    Load,
    #[strum(serialize = "std.store")]
    Store,
    #[strum(serialize = "std.return")]
    Return,
    #[strum(serialize = "std.select")]
    Select,
    #[strum(serialize = "std.index_cast")]
    IndexCast,
    #[strum(serialize = "std.sitofp")]
    SIToFP,
    #[strum(serialize = "std.zexti")]
    ZeroExtendI,
    #[strum(serialize = "std.sexti")]
    SignExtendI,
    #[strum(serialize = "std.trunci")]
    TruncateI,
    #[strum(serialize = "std.fptosi")]
    FPToSI,
    #[strum(serialize = "std.fpext")]
    FPExt,
    #[strum(serialize = "std.fptrunc")]
    FPTrunc,
    #[strum(serialize = "std.alloc")]
    Alloc,
    #[strum(serialize = "std.dealloc")]
    Dealloc,
}

impl StdOp {
    /// Dispatch key: the kind without its payload.
    pub fn key(&self) -> StdOpKey {
        StdOpKey::from(self)
    }
}

/// SPIR-V dialect operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum SpvOp {
    // Float arithmetic
    #[strum(serialize = "spv.FAdd")]
    FAdd,
    #[strum(serialize = "spv.FSub")]
    FSub,
    #[strum(serialize = "spv.FMul")]
    FMul,
    #[strum(serialize = "spv.FDiv")]
    FDiv,
    #[strum(serialize = "spv.FRem")]
    FRem,
    #[strum(serialize = "spv.FNegate")]
    FNegate,

    // Integer arithmetic
    #[strum(serialize = "spv.IAdd")]
    IAdd,
    #[strum(serialize = "spv.ISub")]
    ISub,
    #[strum(serialize = "spv.IMul")]
    IMul,
    #[strum(serialize = "spv.SDiv")]
    SDiv,
    #[strum(serialize = "spv.SRem")]
    SRem,
    #[strum(serialize = "spv.SMod")]
    SMod,
    #[strum(serialize = "spv.UDiv")]
    UDiv,
    #[strum(serialize = "spv.UMod")]
    UMod,

    // Bit manipulation
    #[strum(serialize = "spv.ShiftLeftLogical")]
    ShiftLeftLogical,
    #[strum(serialize = "spv.ShiftRightArithmetic")]
    ShiftRightArithmetic,
    #[strum(serialize = "spv.ShiftRightLogical")]
    ShiftRightLogical,
    #[strum(serialize = "spv.BitwiseAnd")]
    BitwiseAnd,
    #[strum(serialize = "spv.BitwiseOr")]
    BitwiseOr,
    #[strum(serialize = "spv.BitwiseXor")]
    BitwiseXor,
    #[strum(serialize = "spv.Not")]
    Not,

    // Logical
    #[strum(serialize = "spv.LogicalAnd")]
    LogicalAnd,
    #[strum(serialize = "spv.LogicalOr")]
    LogicalOr,
    #[strum(serialize = "spv.LogicalEqual")]
    LogicalEqual,
    #[strum(serialize = "spv.LogicalNotEqual")]
    LogicalNotEqual,

    // GLSL extended instructions
    #[strum(serialize = "spv.GLSL.FAbs")]
    GlslFAbs,
    #[strum(serialize = "spv.GLSL.Ceil")]
    GlslCeil,
    #[strum(serialize = "spv.GLSL.Cos")]
    GlslCos,
    #[strum(serialize = "spv.GLSL.Exp")]
    GlslExp,
    #[strum(serialize = "spv.GLSL.Log")]
    GlslLog,
    #[strum(serialize = "spv.GLSL.InverseSqrt")]
    GlslInverseSqrt,
    #[strum(serialize = "spv.GLSL.Sin")]
    GlslSin,
    #[strum(serialize = "spv.GLSL.Sqrt")]
    GlslSqrt,
    #[strum(serialize = "spv.GLSL.Tanh")]
    GlslTanh,

    // Float comparison
    #[strum(serialize = "spv.FOrdEqual")]
    FOrdEqual,
    #[strum(serialize = "spv.FOrdGreaterThan")]
    FOrdGreaterThan,
    #[strum(serialize = "spv.FOrdGreaterThanEqual")]
    FOrdGreaterThanEqual,
    #[strum(serialize = "spv.FOrdLessThan")]
    FOrdLessThan,
    #[strum(serialize = "spv.FOrdLessThanEqual")]
    FOrdLessThanEqual,
    #[strum(serialize = "spv.FOrdNotEqual")]
    FOrdNotEqual,
    #[strum(serialize = "spv.FUnordEqual")]
    FUnordEqual,
    #[strum(serialize = "spv.FUnordGreaterThan")]
    FUnordGreaterThan,
    #[strum(serialize = "spv.FUnordGreaterThanEqual")]
    FUnordGreaterThanEqual,
    #[strum(serialize = "spv.FUnordLessThan")]
    FUnordLessThan,
    #[strum(serialize = "spv.FUnordLessThanEqual")]
    FUnordLessThanEqual,
    #[strum(serialize = "spv.FUnordNotEqual")]
    FUnordNotEqual,

    // Integer comparison
    #[strum(serialize = "spv.IEqual")]
    IEqual,
    #[strum(serialize = "spv.INotEqual")]
    INotEqual,
    #[strum(serialize = "spv.SLessThan")]
    SLessThan,
    #[strum(serialize = "spv.SLessThanEqual")]
    SLessThanEqual,
    #[strum(serialize = "spv.SGreaterThan")]
    SGreaterThan,
    #[strum(serialize = "spv.SGreaterThanEqual")]
    SGreaterThanEqual,
    #[strum(serialize = "spv.ULessThan")]
    ULessThan,
    #[strum(serialize = "spv.ULessThanEqual")]
    ULessThanEqual,
    #[strum(serialize = "spv.UGreaterThan")]
    UGreaterThan,
    #[strum(serialize = "spv.UGreaterThanEqual")]
    UGreaterThanEqual,

    // Conversions
    #[strum(serialize = "spv.SConvert")]
    SConvert,
    #[strum(serialize = "spv.UConvert")]
    UConvert,
    #[strum(serialize = "spv.FConvert")]
    FConvert,
    #[strum(serialize = "spv.ConvertSToF")]
    ConvertSToF,
    #[strum(serialize = "spv.ConvertFToS")]
    ConvertFToS,

    // Memory
    #[strum(serialize = "spv.constant")]
    Constant,
    #[strum(serialize = "spv.AccessChain")]
    AccessChain,
    #[strum(serialize = "spv.Load")]
    Load,
    #[strum(serialize = "spv.Store")]
    Store,
    #[strum(serialize = "spv.AtomicAnd")]
    AtomicAnd { scope: Scope, semantics: MemorySemantics },
    #[strum(serialize = "spv.AtomicOr")]
    AtomicOr { scope: Scope, semantics: MemorySemantics },

    // Control
    #[strum(serialize = "spv.Select")]
    Select,
    #[strum(serialize = "spv.Return")]
    Return,
}

impl SpvOp {
    pub fn is_atomic(&self) -> bool {
        matches!(self, Self::AtomicAnd { .. } | Self::AtomicOr { .. })
    }
}

/// Kind of an operation in either dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Std(StdOp),
    Spv(SpvOp),
}

impl OpKind {
    /// SPIR-V ops are the conversion target; every standard op must go.
    pub fn is_legal(&self) -> bool {
        matches!(self, Self::Spv(_))
    }

    pub fn as_std(&self) -> Option<StdOp> {
        match self {
            Self::Std(op) => Some(*op),
            Self::Spv(_) => None,
        }
    }

    pub fn as_spv(&self) -> Option<SpvOp> {
        match self {
            Self::Spv(op) => Some(*op),
            Self::Std(_) => None,
        }
    }
}

impl From<StdOp> for OpKind {
    fn from(op: StdOp) -> Self {
        Self::Std(op)
    }
}

impl From<SpvOp> for OpKind {
    fn from(op: SpvOp) -> Self {
        Self::Spv(op)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Std(op) => write!(f, "{op}"),
            Self::Spv(op) => write!(f, "{op}"),
        }
    }
}
