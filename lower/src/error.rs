use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// The conversion driver could not legalize the function.
    #[snafu(display("lowering function '{function}' failed: {source}"))]
    Conversion { function: String, source: spindle_ir::Error },

    /// A capability name in a target description is not known.
    #[snafu(display("unknown capability '{name}'"))]
    UnknownCapability { name: String },
}
