//! Rule set with `StdOpKey`-based dispatch.
//!
//! # Architecture
//!
//! Rules live in a `HashMap<StdOpKey, Vec<Entry>>`. Matching an op costs one
//! lookup plus the rules registered for its key, typically one or two. A rule
//! registered for several keys shares one closure through an `Arc`.
//!
//! ```ignore
//! let mut patterns = PatternSet::new();
//! patterns.add("addf", &[StdOpKey::AddF], |op, operands, rewriter| {
//!     let Some(ty) = rewriter.convert_result_type(op) else {
//!         return rewriter.notify_match_failure("unsupported result type");
//!     };
//!     rewriter.replace_op_with_new(SpvOp::FAdd, operands, &[ty])
//! });
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::function::{Operation, ValueId};
use crate::op::StdOpKey;
use crate::rewrite::ConversionRewriter;

use super::RewriteResult;

/// Closure type for a conversion rule.
///
/// Receives the op being converted, its operands already mapped to converted
/// values, and the rewriter to create replacement ops with.
pub type PatternClosure =
    Box<dyn Fn(&Operation, &[ValueId], &mut ConversionRewriter<'_>) -> RewriteResult + Send + Sync>;

fn boxed<F>(closure: F) -> PatternClosure
where
    F: Fn(&Operation, &[ValueId], &mut ConversionRewriter<'_>) -> RewriteResult + Send + Sync + 'static,
{
    Box::new(closure)
}

struct Entry {
    name: &'static str,
    closure: PatternClosure,
}

/// Conversion rules indexed by standard op kind.
#[derive(Default)]
pub struct PatternSet {
    indexed: HashMap<StdOpKey, Vec<Entry>>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self { indexed: HashMap::new() }
    }

    /// Registers a rule for every key in `keys`.
    pub fn add<F>(&mut self, name: &'static str, keys: &[StdOpKey], closure: F)
    where
        F: Fn(&Operation, &[ValueId], &mut ConversionRewriter<'_>) -> RewriteResult + Send + Sync + 'static,
    {
        match keys {
            [] => tracing::warn!(pattern = name, "pattern registered without keys is never tried"),
            [key] => self.indexed.entry(*key).or_default().push(Entry { name, closure: boxed(closure) }),
            keys => {
                let shared = Arc::new(closure);
                for key in keys {
                    let shared = Arc::clone(&shared);
                    let closure = boxed(move |op, operands, rewriter| shared(op, operands, rewriter));
                    self.indexed.entry(*key).or_default().push(Entry { name, closure });
                }
            }
        }
    }

    /// Number of registered (key, rule) entries.
    pub fn len(&self) -> usize {
        self.indexed.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty()
    }

    pub fn has_rules_for(&self, key: StdOpKey) -> bool {
        self.indexed.get(&key).is_some_and(|v| !v.is_empty())
    }

    /// Names of the rules registered for `key`, in trial order.
    pub fn rule_names(&self, key: StdOpKey) -> Vec<&'static str> {
        self.indexed.get(&key).map(|v| v.iter().map(|e| e.name).collect()).unwrap_or_default()
    }

    /// Tries the rules registered for the op's key until one matches.
    ///
    /// A declining rule's partial work is rolled back before the next rule
    /// runs, so each rule sees the function as it was before the op.
    pub fn rewrite(&self, op: &Operation, operands: &[ValueId], rewriter: &mut ConversionRewriter<'_>) -> RewriteResult {
        let Some(std_op) = op.kind.as_std() else {
            return RewriteResult::NoMatch;
        };
        let key = std_op.key();

        let Some(entries) = self.indexed.get(&key) else {
            tracing::trace!(op_key = %key, "no patterns registered");
            return RewriteResult::NoMatch;
        };
        tracing::trace!(op_key = %key, pattern_count = entries.len(), "trying indexed patterns");

        for entry in entries {
            match (entry.closure)(op, operands, rewriter) {
                RewriteResult::Rewritten if rewriter.has_replacement() => {
                    tracing::debug!(op_key = %key, pattern = entry.name, "pattern matched");
                    return RewriteResult::Rewritten;
                }
                RewriteResult::Rewritten => {
                    tracing::warn!(pattern = entry.name, "pattern reported success without replacing the op");
                    rewriter.rollback();
                }
                RewriteResult::NoMatch => rewriter.rollback(),
            }
        }

        RewriteResult::NoMatch
    }
}
