//! Conversion rule registry.
//!
//! Rules are closures indexed by the [`StdOpKey`](crate::StdOpKey) of the op
//! they convert. The driver looks up only the rules registered for the key of
//! the op at hand and tries them in registration order.

pub mod set;

pub use set::{PatternClosure, PatternSet};

/// Outcome of trying one rule on one op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteResult {
    /// The rule declined. Anything it created is rolled back.
    NoMatch,
    /// The rule replaced or erased the op through the rewriter.
    Rewritten,
}

impl RewriteResult {
    pub fn is_match(self) -> bool {
        matches!(self, Self::Rewritten)
    }
}
