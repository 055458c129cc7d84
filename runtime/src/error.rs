//! Error types for multi-kernel dispatch.

use snafu::Snafu;

/// Result type for runtime operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while loading or running dispatchers.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A dispatcher needs at least two variants to choose from.
    #[snafu(display("multi-kernel needs at least 2 variants, got {count}"))]
    InvalidGroupSize { count: usize },

    /// Variant handles do not match the dispatcher definition.
    #[snafu(display("dispatcher '{dispatcher}' does not match its variants: {reason}"))]
    DefinitionMismatch { dispatcher: String, reason: String },

    /// A variant named by a dispatcher definition is missing from the kernel library.
    #[snafu(display("dispatcher '{dispatcher}' references unknown kernel '{kernel}'"))]
    MissingKernel { dispatcher: String, kernel: String },

    /// No dispatcher with this name was loaded.
    #[snafu(display("unknown dispatcher '{name}'"))]
    UnknownDispatcher { name: String },

    /// Wrong number of positional arguments for a dispatcher.
    #[snafu(display("dispatcher '{dispatcher}' expects {expected} arguments, got {actual}"))]
    ArgumentCount { dispatcher: String, expected: usize, actual: usize },

    /// Wrong number of argless calls for a dispatcher.
    #[snafu(display("dispatcher '{dispatcher}' has {expected} variants, got {actual} calls"))]
    CallCountMismatch { dispatcher: String, expected: usize, actual: usize },

    /// A pending variant failed to compile.
    #[snafu(display("variant '{kernel}' failed to compile: {source}"))]
    VariantCompilation { kernel: String, source: kernsel_device::Error },

    /// A candidate failed while being benchmarked.
    #[snafu(display("benchmarking variant {index} ('{kernel}') of '{dispatcher}' failed: {source}"))]
    BenchmarkExecution { dispatcher: String, index: usize, kernel: String, source: kernsel_device::Error },

    /// The selected variant failed.
    #[snafu(display("execution of '{kernel}' failed: {source}"))]
    Execution { kernel: String, source: kernsel_device::Error },
}
