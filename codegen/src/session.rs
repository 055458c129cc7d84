//! Per-compilation state for multi-kernel codegen.

use parking_lot::Mutex;

use crate::error::Result;
use crate::group::MultiKernel;
use crate::registry::DispatcherRegistry;
use crate::traits::{SubKernel, WrapperCodegen};

struct SessionState<W> {
    registry: DispatcherRegistry,
    wrapper: W,
}

/// Owns the dispatcher registry and the wrapper program for one compilation.
///
/// Registration and the preamble append happen under a single lock, so
/// compile threads sharing a session cannot interleave a lookup with another
/// thread's insert. Drop the session (or call [`finish`](Self::finish)) when
/// the compilation is done; nothing outlives it.
///
/// # Example
///
/// ```ignore
/// let session = CodegenSession::new(WrapperBuffer::new());
/// let group = session.multi_kernel(vec![persistent_reduction, looped_reduction])?;
/// session.call_kernel(&group, device_index)?;
/// let wrapper = session.finish();
/// ```
pub struct CodegenSession<W> {
    state: Mutex<SessionState<W>>,
}

impl<W: WrapperCodegen> CodegenSession<W> {
    pub fn new(wrapper: W) -> Self {
        Self { state: Mutex::new(SessionState { registry: DispatcherRegistry::new(), wrapper }) }
    }

    /// Create a variant group, registering its dispatcher if needed.
    pub fn multi_kernel<K: SubKernel>(&self, kernels: Vec<K>) -> Result<MultiKernel<K>> {
        let mut state = self.state.lock();
        let SessionState { registry, wrapper } = &mut *state;
        MultiKernel::new(kernels, registry, wrapper)
    }

    /// Emit a call site for `group`.
    pub fn call_kernel<K: SubKernel>(&self, group: &MultiKernel<K>, device_index: usize) -> Result<()> {
        group.call_kernel(&mut self.state.lock().wrapper, device_index)
    }

    /// Number of distinct dispatchers defined in this session.
    pub fn dispatcher_count(&self) -> usize {
        self.state.lock().registry.len()
    }

    /// Inspect the wrapper program.
    pub fn with_wrapper<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        f(&self.state.lock().wrapper)
    }

    /// End the session, discarding the registry and returning the wrapper.
    pub fn finish(self) -> W {
        self.state.into_inner().wrapper
    }
}
