//! Execution-side interfaces for kernel variants.
//!
//! - **Program**: a compiled variant that can be launched with positional
//!   arguments, iteration sizes, a launch configuration and a stream
//! - **Compiler**: turns kernel source into a `Program`
//! - **CompileFuture**: placeholder for a variant whose compilation is still
//!   running on a worker thread

pub mod compiler;
pub mod error;
pub mod future;
pub mod program;


pub use compiler::{Compiler, KernelSource, compile_async};
pub use error::*;
pub use future::{CompileFuture, CompilePromise};
pub use program::{KernelArg, LaunchConfig, Program, Stream};
