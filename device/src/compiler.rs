//! Compiler interface and background compilation.

use std::sync::Arc;

use crate::error::Result;
use crate::future::CompileFuture;
use crate::program::Program;

/// Source text for one kernel variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSource {
    /// Kernel name; becomes the program name.
    pub name: String,
    /// Source code in whatever language the compiler accepts.
    pub code: String,
}

impl KernelSource {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self { name: name.into(), code: code.into() }
    }
}

/// A compiler that turns kernel source into an executable [`Program`].
pub trait Compiler: Send + Sync {
    /// Compile source code into an executable program.
    fn compile(&self, src: &KernelSource) -> Result<Arc<dyn Program>>;
}

/// Compile `src`, logging the outcome.
pub(crate) fn compile_logged(compiler: &dyn Compiler, src: &KernelSource) -> Result<Arc<dyn Program>> {
    tracing::debug!(kernel.name = %src.name, "compiling kernel variant");
    let result = compiler.compile(src);
    if let Err(err) = &result {
        tracing::warn!(kernel.name = %src.name, error = %err, "kernel variant failed to compile");
    }
    result
}

/// Compile `src` on a dedicated worker thread.
///
/// Returns immediately with a [`CompileFuture`]. If the worker cannot be
/// spawned, the future resolves to
/// [`Error::CompileWorkerLost`](crate::Error::CompileWorkerLost).
pub fn compile_async(compiler: Arc<dyn Compiler>, src: KernelSource) -> CompileFuture {
    let (promise, future) = CompileFuture::pending(src.name.clone());

    let spawned = std::thread::Builder::new()
        .name(format!("compile-{}", src.name))
        .spawn(move || promise.fulfil(compile_logged(compiler.as_ref(), &src)));

    if let Err(err) = spawned {
        tracing::warn!(kernel.name = %future.kernel_name(), error = %err, "failed to spawn compile worker");
    }

    future
}
