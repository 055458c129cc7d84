//! Core traits for multi-kernel code generation.

use crate::types::{DispatcherDef, RangeTree};

/// Compile-time view of one kernel variant.
///
/// Implemented by whatever the upstream compiler uses to describe a generated
/// kernel. The multi-kernel machinery only reads this metadata.
pub trait SubKernel {
    /// Stable name of the compiled variant.
    fn kernel_name(&self) -> &str;

    /// Formal parameter names, in declaration order.
    fn arg_defs(&self) -> &[String];

    /// Wrapper-side values bound to [`arg_defs`](Self::arg_defs), same order.
    fn call_args(&self) -> &[String];

    /// Iteration dimensions of the kernel.
    fn range_trees(&self) -> &[RangeTree];

    /// Whether the kernel body performs its reduction inline.
    fn inside_reduction(&self) -> bool;

    /// Append the iteration-size values to a call site.
    ///
    /// Reduction sizes are passed only when the kernel is inside a
    /// reduction. The grid covers the non-reduction dimensions.
    fn add_numel_to_call_args_and_grid(&self, call_args: &mut Vec<String>, grid: &mut Vec<String>) {
        for tree in self.range_trees() {
            if !tree.prefix.is_reduction() || self.inside_reduction() {
                call_args.push(tree.numel.clone());
            }
            if !tree.prefix.is_reduction() {
                grid.push(tree.numel.clone());
            }
        }
    }
}

impl<T: SubKernel + ?Sized> SubKernel for &T {
    fn kernel_name(&self) -> &str {
        (**self).kernel_name()
    }

    fn arg_defs(&self) -> &[String] {
        (**self).arg_defs()
    }

    fn call_args(&self) -> &[String] {
        (**self).call_args()
    }

    fn range_trees(&self) -> &[RangeTree] {
        (**self).range_trees()
    }

    fn inside_reduction(&self) -> bool {
        (**self).inside_reduction()
    }

    fn add_numel_to_call_args_and_grid(&self, call_args: &mut Vec<String>, grid: &mut Vec<String>) {
        (**self).add_numel_to_call_args_and_grid(call_args, grid)
    }
}

/// The surrounding wrapper program that dispatchers and call sites are
/// emitted into.
///
/// Multi-kernel codegen only appends; it never reads generated code back.
pub trait WrapperCodegen {
    /// Append a dispatcher definition to the wrapper preamble.
    fn define_dispatcher(&mut self, def: &DispatcherDef);

    /// Emit one call site invoking `kernel_name`.
    fn generate_kernel_call(&mut self, kernel_name: &str, call_args: &[String], grid: &[String], device_index: usize);
}
