//! Run-time side of multi-kernel dispatch.
//!
//! Loads the dispatcher definitions emitted by `kernsel-codegen` into a
//! [`DispatchTable`]. Each dispatcher is a [`MultiKernelCall`] that waits for
//! its variants to finish compiling, benchmarks them on the first call and
//! launches the fastest one from then on.
//!
//! # Benchmarking
//!
//! The `benchmark` module provides the timing utilities. The defaults can be
//! overridden through `KERNSEL_BENCH_*` environment variables, see
//! [`BenchmarkConfig::from_env`].

pub mod benchmark;
pub mod dispatch_table;
pub mod error;
pub mod multi_kernel;
pub mod variant;


pub use benchmark::{BenchmarkConfig, BenchmarkResult, Benchmarker, CacheFlusher, WallClockBenchmarker, benchmark_call};
pub use dispatch_table::DispatchTable;
pub use error::*;
pub use multi_kernel::{ArglessCall, MultiKernelCall};
pub use variant::{KernelLibrary, VariantHandle};
