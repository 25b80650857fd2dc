use snafu::Snafu;
use spindle_dtype::Type;

use crate::function::Location;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A function argument has a type the converter rejects.
    #[snafu(display("failed to convert type {ty} of argument #{index}"))]
    ArgumentConversionFailed { index: usize, ty: Type },

    /// An op is still illegal after every rule had its chance.
    #[snafu(display("failed to legalize operation '{op}' at {location}"))]
    LegalizationFailed { op: String, location: Location },

    /// Dense elements do not match the element count of their type.
    #[snafu(display("dense elements of type {ty} need {expected} elements, got {actual}"))]
    DenseElementCount { ty: Type, expected: usize, actual: usize },

    /// Dense elements require a statically shaped vector or tensor type.
    #[snafu(display("dense elements require a static vector or tensor type, got {ty}"))]
    DenseElementType { ty: Type },
}
