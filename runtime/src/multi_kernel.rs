//! Benchmark-once dispatch between equivalent kernel variants.
//!
//! A [`MultiKernelCall`] starts undecided. The first successful call resolves
//! every variant (waiting on pending compilations), benchmarks each one in
//! group order with the same arguments, records the fastest and then runs it.
//! Every later call launches only the recorded variant. The decision is made
//! at most once per runner and is never revisited.
//!
//! If resolving or benchmarking fails, the error is returned and the runner
//! stays undecided; the next call starts the selection over.

use std::sync::Arc;
use std::time::Duration;

use kernsel_codegen::{DispatcherDef, SubKernelCall};
use kernsel_device::{KernelArg, LaunchConfig, Program, Result as DeviceResult, Stream};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use smallvec::SmallVec;
use snafu::{ResultExt, ensure};
use tracing::debug;

use crate::benchmark::{Benchmarker, WallClockBenchmarker};
use crate::error::*;
use crate::variant::VariantHandle;

/// A variant call with its arguments already bound.
pub type ArglessCall<'a> = Box<dyn Fn() -> DeviceResult<()> + 'a>;

#[derive(Debug)]
struct Selection {
    picked: usize,
    timings: Vec<Duration>,
}

/// A variant program together with the slice of dispatcher arguments it takes.
struct BoundCall<'a> {
    program: &'a Arc<dyn Program>,
    args: SmallVec<[KernelArg; 8]>,
    numels: SmallVec<[i64; 4]>,
}

impl<'a> BoundCall<'a> {
    fn new(program: &'a Arc<dyn Program>, call: &SubKernelCall, args: &[KernelArg], numels: &[i64]) -> Self {
        Self {
            program,
            args: call.arg_indices.iter().map(|&i| args[i]).collect(),
            numels: call.numel_indices.iter().map(|&i| numels[i]).collect(),
        }
    }

    /// # Safety
    ///
    /// Same contract as [`Program::run`].
    unsafe fn launch(&self, launch: &LaunchConfig, stream: Stream) -> DeviceResult<()> {
        unsafe { self.program.run(&self.args, &self.numels, launch, stream) }
    }
}

/// Run-time dispatcher for one group of equivalent variants.
///
/// Shared between callers behind an `Arc`; concurrent first calls serialize
/// on the selection so only one benchmark pass happens.
pub struct MultiKernelCall {
    definition: Arc<DispatcherDef>,
    variants: Mutex<Vec<VariantHandle>>,
    programs: OnceCell<Vec<Arc<dyn Program>>>,
    selection: OnceCell<Selection>,
    benchmarker: Arc<dyn Benchmarker>,
}

impl MultiKernelCall {
    /// Create a runner benchmarked with the environment-configured wall clock.
    pub fn new(definition: Arc<DispatcherDef>, variants: Vec<VariantHandle>) -> Result<Self> {
        Self::with_benchmarker(definition, variants, Arc::new(WallClockBenchmarker::from_env()))
    }

    /// Create a runner.
    ///
    /// `variants` must follow the definition's call order, one per call.
    pub fn with_benchmarker(
        definition: Arc<DispatcherDef>,
        variants: Vec<VariantHandle>,
        benchmarker: Arc<dyn Benchmarker>,
    ) -> Result<Self> {
        ensure!(variants.len() >= 2, InvalidGroupSizeSnafu { count: variants.len() });
        ensure!(
            variants.len() == definition.calls.len(),
            DefinitionMismatchSnafu {
                dispatcher: &definition.name,
                reason: format!("{} variants for {} calls", variants.len(), definition.calls.len()),
            }
        );
        if let Some((call, variant)) =
            definition.calls.iter().zip(&variants).find(|(call, variant)| call.kernel_name != variant.kernel_name())
        {
            return DefinitionMismatchSnafu {
                dispatcher: &definition.name,
                reason: format!("expected variant '{}', got '{}'", call.kernel_name, variant.kernel_name()),
            }
            .fail();
        }
        ensure!(
            definition.is_well_formed(),
            DefinitionMismatchSnafu { dispatcher: &definition.name, reason: "a call binds outside the signature" }
        );

        Ok(Self {
            definition,
            variants: Mutex::new(variants),
            programs: OnceCell::new(),
            selection: OnceCell::new(),
            benchmarker,
        })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &DispatcherDef {
        &self.definition
    }

    /// Index of the selected variant, once decided.
    pub fn picked_kernel(&self) -> Option<usize> {
        self.selection.get().map(|selection| selection.picked)
    }

    pub fn picked_kernel_name(&self) -> Option<&str> {
        self.picked_kernel().map(|index| self.kernel_name(index))
    }

    /// Benchmark timing of every variant, in group order, once decided.
    pub fn timings(&self) -> Option<&[Duration]> {
        self.selection.get().map(|selection| selection.timings.as_slice())
    }

    fn kernel_name(&self, index: usize) -> &str {
        &self.definition.calls[index].kernel_name
    }

    /// Wait for every variant to be compiled.
    ///
    /// Runs at most once successfully; the returned programs keep group order.
    pub fn resolve_all(&self) -> Result<&[Arc<dyn Program>]> {
        self.programs
            .get_or_try_init(|| {
                let mut variants = self.variants.lock();
                let programs = variants.iter_mut().map(VariantHandle::resolve).collect::<Result<Vec<_>>>()?;
                debug!(dispatcher = %self.definition.name, variants = programs.len(), "resolved variants");
                Ok(programs)
            })
            .map(Vec::as_slice)
    }

    /// Call the dispatcher.
    ///
    /// `args` and `numels` follow the definition's signature. Each variant
    /// receives only the positions its call binds.
    ///
    /// # Safety
    ///
    /// Buffer pointers in `args` must be valid for every variant, since
    /// undecided runners launch all of them while benchmarking.
    pub unsafe fn run(&self, args: &[KernelArg], numels: &[i64], launch: &LaunchConfig, stream: Stream) -> Result<()> {
        let definition = &*self.definition;
        ensure!(
            args.len() == definition.arg_names.len() && numels.len() == definition.numel_names.len(),
            ArgumentCountSnafu {
                dispatcher: &definition.name,
                expected: definition.arity(),
                actual: args.len() + numels.len(),
            }
        );
        let programs = self.resolve_all()?;

        if let Some(picked) = self.picked_kernel() {
            let bound = BoundCall::new(&programs[picked], &definition.calls[picked], args, numels);
            return unsafe { bound.launch(launch, stream) }.context(ExecutionSnafu { kernel: self.kernel_name(picked) });
        }

        let bound: Vec<BoundCall<'_>> = definition
            .calls
            .iter()
            .zip(programs)
            .map(|(call, program)| BoundCall::new(program, call, args, numels))
            .collect();
        let calls: Vec<ArglessCall<'_>> = bound
            .iter()
            .map(|bound| Box::new(move || unsafe { bound.launch(launch, stream) }) as ArglessCall<'_>)
            .collect();
        self.run_with_argless_kernels(&calls)
    }

    /// Select (if undecided) and run one of `kernel_calls`.
    ///
    /// `kernel_calls` holds one zero-argument call per variant, in group
    /// order. Undecided runners benchmark every call first.
    pub fn run_with_argless_kernels<F>(&self, kernel_calls: &[F]) -> Result<()>
    where
        F: Fn() -> DeviceResult<()>,
    {
        ensure!(
            kernel_calls.len() == self.definition.calls.len(),
            CallCountMismatchSnafu {
                dispatcher: &self.definition.name,
                expected: self.definition.calls.len(),
                actual: kernel_calls.len(),
            }
        );

        let picked = self.selection.get_or_try_init(|| self.select(kernel_calls))?.picked;
        kernel_calls[picked]().context(ExecutionSnafu { kernel: self.kernel_name(picked) })
    }

    #[tracing::instrument(skip_all, fields(dispatcher = %self.definition.name, variants = kernel_calls.len()))]
    fn select<F>(&self, kernel_calls: &[F]) -> Result<Selection>
    where
        F: Fn() -> DeviceResult<()>,
    {
        let timings = kernel_calls
            .iter()
            .enumerate()
            .map(|(index, call)| {
                self.benchmarker.benchmark(call).context(BenchmarkExecutionSnafu {
                    dispatcher: &self.definition.name,
                    index,
                    kernel: self.kernel_name(index),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Ties go to the earliest variant.
        let picked = timings.iter().enumerate().min_by_key(|&(_, timing)| *timing).map_or(0, |(index, _)| index);
        debug!(picked = self.kernel_name(picked), ?timings, "selected variant");

        Ok(Selection { picked, timings })
    }
}

impl std::fmt::Debug for MultiKernelCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiKernelCall")
            .field("name", &self.definition.name)
            .field("picked", &self.picked_kernel_name())
            .finish_non_exhaustive()
    }
}
