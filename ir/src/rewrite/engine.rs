//! Full dialect conversion driver.
//!
//! # Algorithm
//!
//! 1. Convert the signature: every argument whose type changes gets a fresh
//!    argument value, and uses of the old one are remapped.
//! 2. Walk the block in order. Each standard op is handed to the pattern set
//!    with its operands already remapped; on success its results are remapped
//!    to the replacement values and the op is unlinked.
//! 3. Rewrite the operands of every remaining op through the remap.
//! 4. Any standard op still in the block fails the conversion.
//!
//! Definitions precede uses in a single block, so one ordered walk sees every
//! operand already converted. Rules only produce legal ops; there is nothing
//! to revisit.

use std::collections::HashMap;

use crate::diagnostics::Diagnostics;
use crate::error::{ArgumentConversionFailedSnafu, LegalizationFailedSnafu, Result};
use crate::function::{Function, Location, ValueDef, ValueId};
use crate::pattern::{PatternSet, RewriteResult};

use super::{ConversionRewriter, TypeConversion};

/// Old value to converted value.
#[derive(Debug, Default)]
struct ValueMap {
    map: HashMap<ValueId, ValueId>,
}

impl ValueMap {
    fn insert(&mut self, from: ValueId, to: ValueId) {
        if from != to {
            self.map.insert(from, to);
        }
    }

    /// Follows the chain of replacements to the final value.
    fn lookup(&self, mut value: ValueId) -> ValueId {
        for _ in 0..=self.map.len() {
            match self.map.get(&value) {
                Some(&next) => value = next,
                None => break,
            }
        }
        value
    }
}

/// Converts every op of `func` to the target dialect.
///
/// On failure the function is left partially converted and an error
/// diagnostic names the offending op.
pub fn apply_full_conversion(
    func: &mut Function,
    patterns: &PatternSet,
    converter: &dyn TypeConversion,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    tracing::debug!(function = %func.name, ops = func.len(), "converting function");

    let mut remap = ValueMap::default();
    convert_signature(func, converter, diagnostics, &mut remap)?;

    let snapshot = func.order.clone();
    let mut converted = 0usize;
    for id in snapshot {
        if func.op(id).kind.is_legal() {
            continue;
        }
        let Some(position) = func.position(id) else { continue };

        let op = func.op(id).clone();
        let operands: Vec<ValueId> = op.operands.iter().map(|&v| remap.lookup(v)).collect();

        let mut rewriter = ConversionRewriter::new(func, converter, diagnostics, id, position);
        if patterns.rewrite(&op, &operands, &mut rewriter) == RewriteResult::Rewritten {
            let replacement = rewriter.commit();
            for (&old, &new) in op.results.iter().zip(&replacement) {
                remap.insert(old, new);
            }
            converted += 1;
        } else {
            tracing::trace!(op = %op.kind, location = %op.location, "no pattern converted op");
        }
    }

    for &id in &func.order {
        let op = &mut func.ops[id.0 as usize];
        for operand in op.operands.iter_mut() {
            *operand = remap.lookup(*operand);
        }
    }

    if let Some((_, op)) = func.ops().find(|(_, op)| !op.kind.is_legal()) {
        let name = op.kind.to_string();
        let location = op.location.clone();
        diagnostics.error(&location, format!("failed to legalize operation '{name}'"));
        return LegalizationFailedSnafu { op: name, location }.fail();
    }

    tracing::debug!(function = %func.name, converted, ops = func.len(), "conversion finished");
    Ok(())
}

fn convert_signature(
    func: &mut Function,
    converter: &dyn TypeConversion,
    diagnostics: &mut Diagnostics,
    remap: &mut ValueMap,
) -> Result<()> {
    for index in 0..func.args.len() {
        let old = func.args[index];
        let ty = func.value_type(old).clone();
        let Some(converted) = converter.convert_type(&ty) else {
            let location = Location::Name(func.name.clone());
            diagnostics.error(&location, format!("failed to convert type {ty} of argument #{index}"));
            return ArgumentConversionFailedSnafu { index, ty }.fail();
        };
        if converted == ty {
            continue;
        }
        tracing::trace!(index, from = %ty, to = %converted, "converted argument");
        let new = func.new_value(converted, ValueDef::Argument(index));
        func.args[index] = new;
        remap.insert(old, new);
    }
    Ok(())
}
