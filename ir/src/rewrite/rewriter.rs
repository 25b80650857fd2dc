//! Match-then-commit rewriter for one op.
//!
//! New ops go right before the op being converted. Nothing is visible to the
//! driver until the rule reports success: on failure the arenas and the
//! diagnostics are truncated back to the checkpoint taken when the rewriter was
//! created and the inserted ops are unlinked from the block.

use std::collections::BTreeMap;
use std::fmt;

use smallvec::SmallVec;
use spindle_dtype::Type;

use crate::attr::Attribute;
use crate::diagnostics::Diagnostics;
use crate::function::{Function, Location, OpId, Operation, ValueId};
use crate::op::OpKind;
use crate::pattern::RewriteResult;

use super::TypeConversion;

pub struct ConversionRewriter<'a> {
    func: &'a mut Function,
    converter: &'a dyn TypeConversion,
    diagnostics: &'a mut Diagnostics,
    root: OpId,
    root_kind: OpKind,
    root_results: usize,
    location: Location,
    /// Block position of the root op when the rewriter was created.
    insert_at: usize,
    inserted: usize,
    values_mark: usize,
    ops_mark: usize,
    diagnostics_mark: usize,
    replacement: Option<SmallVec<[ValueId; 1]>>,
}

impl<'a> ConversionRewriter<'a> {
    pub(crate) fn new(
        func: &'a mut Function,
        converter: &'a dyn TypeConversion,
        diagnostics: &'a mut Diagnostics,
        root: OpId,
        insert_at: usize,
    ) -> Self {
        let op = func.op(root);
        let root_kind = op.kind;
        let root_results = op.results.len();
        let location = op.location.clone();
        let values_mark = func.values.len();
        let ops_mark = func.ops.len();
        let diagnostics_mark = diagnostics.len();
        Self {
            func,
            converter,
            diagnostics,
            root,
            root_kind,
            root_results,
            location,
            insert_at,
            inserted: 0,
            values_mark,
            ops_mark,
            diagnostics_mark,
            replacement: None,
        }
    }

    pub fn convert_type(&self, ty: &Type) -> Option<Type> {
        self.converter.convert_type(ty)
    }

    /// Converted type of the op's first result.
    pub fn convert_result_type(&self, op: &Operation) -> Option<Type> {
        let result = op.result()?;
        self.convert_type(self.func.value_type(result))
    }

    pub fn value_type(&self, value: ValueId) -> &Type {
        self.func.value_type(value)
    }

    pub fn function(&self) -> &Function {
        self.func
    }

    pub fn root(&self) -> OpId {
        self.root
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        self.diagnostics
    }

    /// Remark at the location of the op being converted.
    pub fn remark(&mut self, message: impl Into<String>) {
        self.diagnostics.remark(&self.location, message);
    }

    /// Inserts a new op before the op being converted.
    pub fn create(&mut self, kind: impl Into<OpKind>, operands: &[ValueId], results: &[Type]) -> OpId {
        let position = self.insert_at + self.inserted;
        self.inserted += 1;
        self.func.insert_op(position, kind.into(), operands, results, BTreeMap::new(), self.location.clone())
    }

    /// Inserts a single-result op and returns the result.
    pub fn create_value(&mut self, kind: impl Into<OpKind>, operands: &[ValueId], ty: Type) -> ValueId {
        let op = self.create(kind, operands, std::slice::from_ref(&ty));
        self.func.op(op).results[0]
    }

    pub fn set_attr(&mut self, op: OpId, name: impl Into<String>, attr: Attribute) {
        self.func.set_attr(op, name, attr);
    }

    pub fn op(&self, id: OpId) -> &Operation {
        self.func.op(id)
    }

    /// Replaces every result of the op being converted, in order.
    pub fn replace_op(&mut self, values: &[ValueId]) -> RewriteResult {
        let expected = self.root_results;
        if values.len() != expected {
            return self.notify_match_failure(format_args!("replacement has {} values for {expected} results", values.len()));
        }
        self.replacement = Some(SmallVec::from_slice(values));
        RewriteResult::Rewritten
    }

    /// Removes the op being converted. Only valid for ops whose results are unused.
    pub fn erase_op(&mut self) -> RewriteResult {
        self.replacement = Some(SmallVec::new());
        RewriteResult::Rewritten
    }

    /// Creates one op and replaces the op being converted with its results.
    pub fn replace_op_with_new(&mut self, kind: impl Into<OpKind>, operands: &[ValueId], results: &[Type]) -> RewriteResult {
        let op = self.create(kind, operands, results);
        let values: SmallVec<[ValueId; 1]> = self.func.op(op).results.clone();
        self.replace_op(&values)
    }

    /// Declines the match, logging why.
    pub fn notify_match_failure(&mut self, reason: impl fmt::Display) -> RewriteResult {
        tracing::debug!(op = %self.root_kind, location = %self.location, %reason, "match failure");
        RewriteResult::NoMatch
    }

    pub(crate) fn has_replacement(&self) -> bool {
        self.replacement.is_some()
    }

    /// Drops everything created since the checkpoint, remarks included.
    pub(crate) fn rollback(&mut self) {
        if self.inserted > 0 {
            tracing::trace!(op = %self.root_kind, discarded = self.inserted, "rolling back");
        }
        self.func.order.drain(self.insert_at..self.insert_at + self.inserted);
        self.func.values.truncate(self.values_mark);
        self.func.ops.truncate(self.ops_mark);
        self.diagnostics.truncate(self.diagnostics_mark);
        self.inserted = 0;
        self.replacement = None;
    }

    /// Unlinks the converted op and returns its replacement values.
    pub(crate) fn commit(self) -> SmallVec<[ValueId; 1]> {
        self.func.order.remove(self.insert_at + self.inserted);
        self.replacement.unwrap_or_default()
    }
}
