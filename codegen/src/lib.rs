//! Compile-time side of multi-kernel dispatch.
//!
//! When the compiler produces several equivalent lowerings of one
//! computation, it wraps them in a [`MultiKernel`]. The group registers a
//! dispatcher with the session's [`DispatcherRegistry`] (one per distinct,
//! ordered variant tuple) and emits call sites that go through it. The
//! emitted [`DispatcherDef`]s are loaded by the runtime, which benchmarks the
//! variants once and then always calls the winner.
//!
//! # Architecture
//!
//! - **Args**: ordered argument unions across variants
//! - **Registry**: dispatcher deduplication and definition building
//! - **Group**: variant groups and call-site emission
//! - **Session**: lock-protected registry + wrapper for one compilation

pub mod args;
pub mod error;
pub mod group;
pub mod registry;
pub mod session;
pub mod traits;
pub mod types;
pub mod wrapper;


pub use error::*;
pub use group::MultiKernel;
pub use registry::{DispatcherRegistry, dispatcher_name};
pub use session::CodegenSession;
pub use traits::*;
pub use types::*;
pub use wrapper::{KernelCallSite, WrapperBuffer};
