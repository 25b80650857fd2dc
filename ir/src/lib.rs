//! Intermediate representation for the standard-to-SPIR-V conversion.
//!
//! A [`Function`] is a single block of [`Operation`]s stored in arenas. Ops of
//! both dialects share the block: the conversion driver walks it, hands every
//! standard op to the [`PatternSet`] and splices in the SPIR-V ops a rule
//! creates.
//!
//! # Module Organization
//!
//! - [`attr`] - Constant attributes (integers, floats, dense elements)
//! - [`op`] - Operation kinds of both dialects
//! - [`function`] - Value and op arenas, the single-block function body
//! - [`diagnostics`] - Per-conversion diagnostic sink
//! - [`pattern`] - Rule registry keyed by standard op kind
//! - [`rewrite`] - Conversion rewriter and driver
//! - [`error`] - Error types and result handling

pub mod attr;
pub mod diagnostics;
pub mod error;
pub mod function;
pub mod op;
pub mod pattern;
pub mod printer;
pub mod rewrite;


pub use attr::{Attribute, DenseElementsAttr, FloatAttr, IntegerAttr};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, Result};
pub use function::{Function, Location, OpId, Operation, ValueData, ValueDef, ValueId};
pub use op::{CmpFPredicate, CmpIPredicate, MemorySemantics, OpKind, Scope, SpvOp, StdOp, StdOpKey};
pub use pattern::{PatternClosure, PatternSet, RewriteResult};
pub use rewrite::{ConversionRewriter, TypeConversion, apply_full_conversion};

pub use spindle_dtype::{Dim, StorageClass, Type};
