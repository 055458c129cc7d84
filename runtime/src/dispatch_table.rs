//! Name-indexed dispatchers for a loaded program.
//!
//! The wrapper program emitted at compile time carries one
//! [`DispatcherDef`] per distinct variant tuple. Loading builds a
//! [`MultiKernelCall`] for each, binding variant names to handles from a
//! [`KernelLibrary`]; call sites then dispatch by name.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use kernsel_codegen::DispatcherDef;
use kernsel_device::{KernelArg, LaunchConfig, Stream};
use snafu::OptionExt;
use tracing::debug;

use crate::benchmark::{Benchmarker, WallClockBenchmarker};
use crate::error::*;
use crate::multi_kernel::MultiKernelCall;
use crate::variant::{KernelLibrary, VariantHandle};

#[derive(Debug, Default)]
pub struct DispatchTable {
    runners: HashMap<String, Arc<MultiKernelCall>>,
}

impl DispatchTable {
    /// Load dispatchers, benchmarking with the environment-configured wall clock.
    pub fn load<'a>(
        definitions: impl IntoIterator<Item = &'a Arc<DispatcherDef>>,
        library: &KernelLibrary,
    ) -> Result<Self> {
        Self::load_with_benchmarker(definitions, library, Arc::new(WallClockBenchmarker::from_env()))
    }

    /// Load dispatchers sharing one benchmarker.
    ///
    /// Fails on the first definition that names a kernel missing from
    /// `library`, or that is defined twice.
    pub fn load_with_benchmarker<'a>(
        definitions: impl IntoIterator<Item = &'a Arc<DispatcherDef>>,
        library: &KernelLibrary,
        benchmarker: Arc<dyn Benchmarker>,
    ) -> Result<Self> {
        let mut runners = HashMap::new();

        for definition in definitions {
            let variants = definition
                .kernel_names()
                .map(|kernel| {
                    library.get(kernel).cloned().context(MissingKernelSnafu { dispatcher: &definition.name, kernel })
                })
                .collect::<Result<Vec<VariantHandle>>>()?;
            let pending = variants.iter().filter(|variant| variant.is_pending()).count();

            match runners.entry(definition.name.clone()) {
                Entry::Occupied(_) => {
                    return DefinitionMismatchSnafu {
                        dispatcher: &definition.name,
                        reason: "dispatcher is defined more than once",
                    }
                    .fail();
                }
                Entry::Vacant(slot) => {
                    let runner =
                        MultiKernelCall::with_benchmarker(Arc::clone(definition), variants, Arc::clone(&benchmarker))?;
                    debug!(dispatcher = %definition.name, pending, "loaded dispatcher");
                    slot.insert(Arc::new(runner));
                }
            }
        }

        Ok(Self { runners })
    }

    pub fn get(&self, name: &str) -> Result<&Arc<MultiKernelCall>> {
        self.runners.get(name).context(UnknownDispatcherSnafu { name })
    }

    /// Call the dispatcher `name`.
    ///
    /// # Safety
    ///
    /// Same contract as [`MultiKernelCall::run`].
    pub unsafe fn run(
        &self,
        name: &str,
        args: &[KernelArg],
        numels: &[i64],
        launch: &LaunchConfig,
        stream: Stream,
    ) -> Result<()> {
        let runner = self.get(name)?;
        unsafe { runner.run(args, numels, launch, stream) }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.runners.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}
