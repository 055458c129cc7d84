use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Kernel source was rejected by the compiler.
    #[snafu(display("compilation of '{kernel}' failed: {reason}"))]
    Compilation { kernel: String, reason: String },

    /// The compile worker went away before producing a result.
    #[snafu(display("compile worker for '{kernel}' exited without a result"))]
    CompileWorkerLost { kernel: String },

    /// Kernel launch failed.
    #[snafu(display("execution of '{kernel}' failed: {reason}"))]
    Execution { kernel: String, reason: String },
}
