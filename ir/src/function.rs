//! Single-block function bodies backed by value and op arenas.
//!
//! Values and ops are never removed from their arenas. An op is live while it
//! is in the block order; erasing it only unlinks it. The conversion driver
//! relies on this to roll back a failed rule by truncating the arenas to a
//! checkpoint.

use std::collections::BTreeMap;
use std::fmt;

use bon::bon;
use smallvec::SmallVec;
use spindle_dtype::Type;

use crate::attr::Attribute;
use crate::op::{OpKind, StdOp};

/// Index of a value in its function's value arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

/// Index of an op in its function's op arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Source location carried by ops and reported in diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Location {
    #[default]
    Unknown,
    FileLineCol {
        file: String,
        line: u32,
        col: u32,
    },
    Name(String),
}

impl Location {
    pub fn file(file: impl Into<String>, line: u32, col: u32) -> Self {
        Self::FileLineCol { file: file.into(), line, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown location"),
            Self::FileLineCol { file, line, col } => write!(f, "{file}:{line}:{col}"),
            Self::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

/// Where a value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDef {
    Argument(usize),
    Result { op: OpId, index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueData {
    pub ty: Type,
    pub def: ValueDef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: OpKind,
    pub operands: SmallVec<[ValueId; 4]>,
    pub results: SmallVec<[ValueId; 1]>,
    pub attrs: BTreeMap<String, Attribute>,
    pub location: Location,
}

impl Operation {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.get(name)
    }

    pub fn result(&self) -> Option<ValueId> {
        self.results.first().copied()
    }
}

/// A named function with one block of ops.
#[derive(Debug, Clone, Default)]
pub struct Function {
    pub name: String,
    pub(crate) args: Vec<ValueId>,
    pub(crate) values: Vec<ValueData>,
    pub(crate) ops: Vec<Operation>,
    pub(crate) order: Vec<OpId>,
}

#[bon]
impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn add_argument(&mut self, ty: Type) -> ValueId {
        let index = self.args.len();
        let value = self.new_value(ty, ValueDef::Argument(index));
        self.args.push(value);
        value
    }

    pub(crate) fn new_value(&mut self, ty: Type, def: ValueDef) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(ValueData { ty, def });
        id
    }

    /// Appends an op at the end of the block.
    #[builder]
    pub fn append(
        &mut self,
        #[builder(start_fn)] kind: OpKind,
        #[builder(default)] operands: Vec<ValueId>,
        #[builder(default)] results: Vec<Type>,
        #[builder(default)] attrs: BTreeMap<String, Attribute>,
        #[builder(default)] location: Location,
    ) -> OpId {
        let position = self.order.len();
        self.insert_op(position, kind, &operands, &results, attrs, location)
    }

    pub fn push(&mut self, kind: impl Into<OpKind>, operands: &[ValueId], results: &[Type]) -> OpId {
        let position = self.order.len();
        self.insert_op(position, kind.into(), operands, results, BTreeMap::new(), Location::Unknown)
    }

    /// Appends a single-result op and returns the result.
    pub fn push_value(&mut self, kind: impl Into<OpKind>, operands: &[ValueId], ty: Type) -> ValueId {
        let op = self.push(kind, operands, std::slice::from_ref(&ty));
        self.op(op).results[0]
    }

    /// Appends a `std.constant` holding `value`.
    pub fn constant(&mut self, ty: Type, value: Attribute) -> ValueId {
        let op = self.push(StdOp::Constant, &[], std::slice::from_ref(&ty));
        self.set_attr(op, "value", value);
        self.op(op).results[0]
    }

    pub(crate) fn insert_op(
        &mut self,
        position: usize,
        kind: OpKind,
        operands: &[ValueId],
        result_types: &[Type],
        attrs: BTreeMap<String, Attribute>,
        location: Location,
    ) -> OpId {
        let id = OpId(self.ops.len() as u32);
        let results = result_types
            .iter()
            .enumerate()
            .map(|(index, ty)| self.new_value(ty.clone(), ValueDef::Result { op: id, index }))
            .collect();
        self.ops.push(Operation { kind, operands: SmallVec::from_slice(operands), results, attrs, location });
        self.order.insert(position, id);
        id
    }

    pub fn arguments(&self) -> &[ValueId] {
        &self.args
    }

    pub fn op(&self, id: OpId) -> &Operation {
        &self.ops[id.0 as usize]
    }

    pub fn op_mut(&mut self, id: OpId) -> &mut Operation {
        &mut self.ops[id.0 as usize]
    }

    pub fn value(&self, id: ValueId) -> &ValueData {
        &self.values[id.0 as usize]
    }

    pub fn value_type(&self, id: ValueId) -> &Type {
        &self.value(id).ty
    }

    /// Live ops in block order.
    pub fn ops(&self) -> impl Iterator<Item = (OpId, &Operation)> {
        self.order.iter().map(|&id| (id, self.op(id)))
    }

    pub fn op_ids(&self) -> &[OpId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, id: OpId) -> Option<usize> {
        self.order.iter().position(|&o| o == id)
    }

    pub fn is_live(&self, id: OpId) -> bool {
        self.position(id).is_some()
    }

    pub fn set_attr(&mut self, id: OpId, name: impl Into<String>, attr: Attribute) {
        self.op_mut(id).attrs.insert(name.into(), attr);
    }

    pub fn set_location(&mut self, id: OpId, location: Location) {
        self.op_mut(id).location = location;
    }

    /// Op that defines `value`, if it is not an argument.
    pub fn defining_op(&self, value: ValueId) -> Option<OpId> {
        match self.value(value).def {
            ValueDef::Result { op, .. } => Some(op),
            ValueDef::Argument(_) => None,
        }
    }

    /// Live ops that use `value` as an operand.
    pub fn users(&self, value: ValueId) -> impl Iterator<Item = OpId> + '_ {
        self.ops().filter(move |(_, op)| op.operands.contains(&value)).map(|(id, _)| id)
    }

    /// Live ops of a given kind, in block order.
    pub fn ops_of(&self, kind: impl Into<OpKind>) -> Vec<OpId> {
        let kind = kind.into();
        self.ops().filter(|(_, op)| op.kind == kind).map(|(id, _)| id).collect()
    }

    /// Live ops whose kind satisfies `pred`, in block order.
    pub fn find_ops(&self, pred: impl Fn(&OpKind) -> bool) -> Vec<OpId> {
        self.ops().filter(|(_, op)| pred(&op.kind)).map(|(id, _)| id).collect()
    }
}
