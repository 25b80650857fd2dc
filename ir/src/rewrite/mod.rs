//! Dialect conversion: the rewriter handed to rules and the driver that runs them.

pub mod engine;
pub mod rewriter;

pub use engine::apply_full_conversion;
pub use rewriter::ConversionRewriter;

use spindle_dtype::Type;

/// Maps source types to legal target types.
///
/// `None` means the type has no legal counterpart; a rule that needs it
/// declines.
pub trait TypeConversion {
    fn convert_type(&self, ty: &Type) -> Option<Type>;
}

impl<F> TypeConversion for F
where
    F: Fn(&Type) -> Option<Type>,
{
    fn convert_type(&self, ty: &Type) -> Option<Type> {
        self(ty)
    }
}
