//! Placeholders for kernels whose compilation is still in flight.
//!
//! A [`CompileFuture`] is handed out as soon as compilation is requested and
//! the matching [`CompilePromise`] is fulfilled by whoever performs the
//! compilation (usually a worker thread, see [`crate::compile_async`]).
//!
//! # Example
//!
//! ```ignore
//! let (promise, future) = CompileFuture::pending("triton_red_fused_0");
//!
//! // Compile worker
//! std::thread::spawn(move || promise.fulfil(compiler.compile(&src)));
//!
//! // Dispatcher, once it actually needs the kernel
//! let program = future.wait()?;
//! ```
//!
//! Waiting is a blocking point. A future can be waited on any number of
//! times, from any thread; every waiter observes the same outcome.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::{CompileWorkerLostSnafu, Error, Result};
use crate::program::Program;

enum Outcome {
    Pending,
    Ready(Arc<dyn Program>),
    Failed(Error),
    Lost,
}

struct Shared {
    kernel: String,
    outcome: Mutex<Outcome>,
    done: Condvar,
}

impl Shared {
    fn complete(&self, outcome: Outcome) {
        let mut guard = self.outcome.lock();
        if matches!(*guard, Outcome::Pending) {
            *guard = outcome;
            self.done.notify_all();
        }
    }
}

/// Handle to a kernel that may still be compiling.
#[derive(Clone)]
pub struct CompileFuture {
    shared: Arc<Shared>,
}

/// Producer side of a [`CompileFuture`].
///
/// Dropping an unfulfilled promise resolves the future with
/// [`Error::CompileWorkerLost`](crate::Error::CompileWorkerLost), so waiters
/// never hang on a worker that panicked or was never started.
pub struct CompilePromise {
    shared: Arc<Shared>,
}

impl CompileFuture {
    /// Create an unresolved future and the promise that resolves it.
    pub fn pending(kernel: impl Into<String>) -> (CompilePromise, CompileFuture) {
        let shared =
            Arc::new(Shared { kernel: kernel.into(), outcome: Mutex::new(Outcome::Pending), done: Condvar::new() });
        (CompilePromise { shared: Arc::clone(&shared) }, CompileFuture { shared })
    }

    /// Create a future that is already resolved to `program`.
    pub fn ready(program: Arc<dyn Program>) -> Self {
        let kernel = program.name().to_string();
        Self { shared: Arc::new(Shared { kernel, outcome: Mutex::new(Outcome::Ready(program)), done: Condvar::new() }) }
    }

    /// Name of the kernel being compiled.
    pub fn kernel_name(&self) -> &str {
        &self.shared.kernel
    }

    /// Check whether the outcome is known without blocking.
    pub fn is_done(&self) -> bool {
        !matches!(*self.shared.outcome.lock(), Outcome::Pending)
    }

    /// Block until compilation finishes and return the compiled program.
    pub fn wait(&self) -> Result<Arc<dyn Program>> {
        let mut guard = self.shared.outcome.lock();
        while matches!(*guard, Outcome::Pending) {
            self.shared.done.wait(&mut guard);
        }

        match &*guard {
            Outcome::Ready(program) => Ok(Arc::clone(program)),
            Outcome::Failed(err) => Err(err.clone()),
            Outcome::Lost | Outcome::Pending => CompileWorkerLostSnafu { kernel: &self.shared.kernel }.fail(),
        }
    }
}

impl std::fmt::Debug for CompileFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileFuture").field("kernel", &self.shared.kernel).field("done", &self.is_done()).finish()
    }
}

impl CompilePromise {
    /// Name of the kernel this promise resolves.
    pub fn kernel_name(&self) -> &str {
        &self.shared.kernel
    }

    /// Publish the compilation result and wake all waiters.
    pub fn fulfil(self, result: Result<Arc<dyn Program>>) {
        let outcome = match result {
            Ok(program) => Outcome::Ready(program),
            Err(err) => Outcome::Failed(err),
        };
        self.shared.complete(outcome);
    }
}

impl Drop for CompilePromise {
    fn drop(&mut self) {
        self.shared.complete(Outcome::Lost);
    }
}
