//! Variant handles and the kernel library dispatchers are loaded against.
//!
//! A variant can be loaded before it has finished compiling. Its handle then
//! holds a [`CompileFuture`] that is waited on the first time the dispatcher
//! runs; after that the handle holds the program directly.

use std::collections::HashMap;
use std::sync::Arc;

use kernsel_device::{CompileFuture, Program};
use snafu::ResultExt;

use crate::error::*;

/// A variant that is either compiled or still compiling.
#[derive(Debug, Clone)]
pub enum VariantHandle {
    Ready(Arc<dyn Program>),
    Pending(CompileFuture),
}

impl VariantHandle {
    pub fn kernel_name(&self) -> &str {
        match self {
            Self::Ready(program) => program.name(),
            Self::Pending(future) => future.kernel_name(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Block until the variant is compiled, replacing a pending handle with
    /// the program it produced.
    ///
    /// A failed compilation leaves the handle pending; waiting again returns
    /// the same error.
    pub fn resolve(&mut self) -> Result<Arc<dyn Program>> {
        let program = match self {
            Self::Ready(program) => return Ok(Arc::clone(program)),
            Self::Pending(future) => future.wait().context(VariantCompilationSnafu { kernel: future.kernel_name() })?,
        };
        *self = Self::Ready(Arc::clone(&program));
        Ok(program)
    }
}

impl From<Arc<dyn Program>> for VariantHandle {
    fn from(program: Arc<dyn Program>) -> Self {
        Self::Ready(program)
    }
}

impl From<CompileFuture> for VariantHandle {
    fn from(future: CompileFuture) -> Self {
        Self::Pending(future)
    }
}

/// Compiled and compiling variants, keyed by kernel name.
///
/// Several dispatchers may share one variant; each gets a clone of the
/// handle, and clones of a pending handle observe the same compilation.
#[derive(Debug, Clone, Default)]
pub struct KernelLibrary {
    kernels: HashMap<String, VariantHandle>,
}

impl KernelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variant under its kernel name, returning any handle it replaced.
    pub fn insert(&mut self, handle: impl Into<VariantHandle>) -> Option<VariantHandle> {
        let handle = handle.into();
        let replaced = self.kernels.insert(handle.kernel_name().to_string(), handle);
        if replaced.is_some() {
            tracing::warn!(kernel = ?replaced.as_ref().map(VariantHandle::kernel_name), "replaced kernel in library");
        }
        replaced
    }

    pub fn get(&self, kernel_name: &str) -> Option<&VariantHandle> {
        self.kernels.get(kernel_name)
    }

    pub fn contains(&self, kernel_name: &str) -> bool {
        self.kernels.contains_key(kernel_name)
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}
