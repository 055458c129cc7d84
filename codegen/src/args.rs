//! Argument collection across kernel variants.
//!
//! Every union here keeps first-occurrence order. Call sites and dispatcher
//! signatures are generated independently, so the order must be a pure
//! function of the variant list.

use itertools::Itertools;

use crate::traits::SubKernel;

/// Formal parameters of one variant, in declaration order.
pub fn kernel_arg_defs<K: SubKernel + ?Sized>(kernel: &K) -> Vec<String> {
    kernel.arg_defs().to_vec()
}

/// Ordered union of the formal parameters of all variants.
pub fn all_kernel_arg_defs<K: SubKernel>(kernels: &[K]) -> Vec<String> {
    ordered_union(kernels.iter().map(|k| k.arg_defs()))
}

/// Ordered union of the call-site values of all variants.
pub fn all_kernel_call_args<K: SubKernel>(kernels: &[K]) -> Vec<String> {
    ordered_union(kernels.iter().map(|k| k.call_args()))
}

/// Iteration-size parameters of one variant.
///
/// The reduction size is threaded through only when the variant performs
/// the reduction inline.
pub fn numel_arg_defs<K: SubKernel + ?Sized>(kernel: &K) -> Vec<String> {
    kernel
        .range_trees()
        .iter()
        .filter(|tree| !tree.prefix.is_reduction() || kernel.inside_reduction())
        .map(|tree| tree.prefix.numel_name())
        .collect()
}

/// Concatenate `lists`, dropping every name already seen.
pub fn ordered_union<'a, I, L>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = &'a String>,
{
    lists.into_iter().flatten().unique().cloned().collect()
}
