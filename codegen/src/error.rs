//! Error types for multi-kernel code generation.

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while registering or calling a multi-kernel.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A multi-kernel needs at least two variants to choose from.
    #[snafu(display("multi-kernel needs at least 2 variants, got {count}"))]
    InvalidGroupSize { count: usize },

    /// Two distinct variant groups were assigned the same dispatcher name.
    #[snafu(display("dispatcher name '{name}' is already used (variants: {kernels:?})"))]
    DuplicateDispatcherName { name: String, kernels: Vec<String> },

    /// A variant needs an iteration size the first variant does not provide.
    #[snafu(display("variant '{kernel}' needs '{numel}', which '{first}' does not provide"))]
    NumelMismatch { kernel: String, numel: String, first: String },

    /// Call-site arguments do not line up with the dispatcher signature.
    #[snafu(display("dispatcher '{dispatcher}' declares {expected} arguments, call site has {actual}"))]
    ArgumentMismatch { dispatcher: String, expected: usize, actual: usize },
}
