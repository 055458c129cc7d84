//! Compile-time handle for a group of interchangeable kernel variants.

use snafu::ensure;

use crate::args::{all_kernel_arg_defs, all_kernel_call_args};
use crate::error::{ArgumentMismatchSnafu, InvalidGroupSizeSnafu, Result};
use crate::registry::DispatcherRegistry;
use crate::traits::{SubKernel, WrapperCodegen};

/// Several variants implementing the same computation.
///
/// For a group of `kernel1` and `kernel2` the wrapper preamble gets one
/// dispatcher definition named `multi_kernel_kernel1`, and every call site
/// of the group invokes that dispatcher. Which variant actually runs is
/// decided at run time by benchmarking.
#[derive(Debug)]
pub struct MultiKernel<K> {
    kernels: Vec<K>,
    kernel_name: String,
}

impl<K: SubKernel> MultiKernel<K> {
    /// Register the group and obtain (or reuse) its dispatcher.
    pub fn new(kernels: Vec<K>, registry: &mut DispatcherRegistry, wrapper: &mut dyn WrapperCodegen) -> Result<Self> {
        ensure!(kernels.len() >= 2, InvalidGroupSizeSnafu { count: kernels.len() });

        let kernel_name = registry.define_kernel(&kernels, wrapper)?;
        Ok(Self { kernels, kernel_name })
    }

    /// Dispatcher name call sites use.
    pub fn kernel_name(&self) -> &str {
        &self.kernel_name
    }

    pub fn kernels(&self) -> &[K] {
        &self.kernels
    }

    /// Emit one call site for the group.
    ///
    /// Arguments are the ordered union of every variant's call arguments,
    /// followed by the iteration sizes of the first variant. Iteration sizes
    /// are the same for all variants, so the first one also provides the grid.
    pub fn call_kernel(&self, wrapper: &mut dyn WrapperCodegen, device_index: usize) -> Result<()> {
        let mut call_args = all_kernel_call_args(&self.kernels);

        let expected = all_kernel_arg_defs(&self.kernels).len();
        ensure!(
            call_args.len() == expected,
            ArgumentMismatchSnafu { dispatcher: &self.kernel_name, expected, actual: call_args.len() }
        );

        let mut grid = Vec::new();
        self.kernels[0].add_numel_to_call_args_and_grid(&mut call_args, &mut grid);

        wrapper.generate_kernel_call(&self.kernel_name, &call_args, &grid, device_index);
        Ok(())
    }
}
