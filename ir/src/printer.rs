//! Textual form of functions, for logs and test failure output.

use std::fmt;

use crate::function::{Function, Operation};

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: impl IntoIterator<Item = T>) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_op(f: &mut fmt::Formatter<'_>, func: &Function, op: &Operation) -> fmt::Result {
    if !op.results.is_empty() {
        write_list(f, op.results.iter())?;
        write!(f, " = ")?;
    }
    write!(f, "{}", op.kind)?;
    if !op.operands.is_empty() {
        write!(f, " ")?;
        write_list(f, op.operands.iter())?;
    }
    if !op.attrs.is_empty() {
        write!(f, " {{")?;
        write_list(f, op.attrs.iter().map(|(name, attr)| format!("{name} = {attr}")))?;
        write!(f, "}}")?;
    }
    if !op.results.is_empty() {
        write!(f, " : ")?;
        write_list(f, op.results.iter().map(|&r| func.value_type(r)))?;
    }
    Ok(())
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func @{}(", self.name)?;
        write_list(f, self.args.iter().map(|&a| format!("{a}: {}", self.value_type(a))))?;
        writeln!(f, ") {{")?;
        for (_, op) in self.ops() {
            write!(f, "  ")?;
            write_op(f, self, op)?;
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}
