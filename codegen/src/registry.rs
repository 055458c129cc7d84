//! Dispatcher deduplication.
//!
//! A [`DispatcherRegistry`] makes sure that each distinct, ordered tuple of
//! variant names gets exactly one dispatcher definition. Two variant groups
//! compiled in different parts of a program that list the same variants in
//! the same order share a dispatcher; a different order is a different group.
//!
//! The registry belongs to one compilation session (see
//! [`CodegenSession`](crate::CodegenSession)); its entries live as long as
//! that session and are never removed.

use std::collections::{HashMap, HashSet};

use snafu::ensure;

use crate::args::{all_kernel_arg_defs, numel_arg_defs};
use crate::error::{DuplicateDispatcherNameSnafu, InvalidGroupSizeSnafu, NumelMismatchSnafu, Result};
use crate::traits::{SubKernel, WrapperCodegen};
use crate::types::{DispatcherDef, SubKernelCall};

/// Name of the dispatcher for a group whose first variant is `first_kernel`.
pub fn dispatcher_name(first_kernel: &str) -> String {
    format!("multi_kernel_{first_kernel}")
}

/// Variant-tuple to dispatcher-name table for one compilation session.
#[derive(Debug, Default)]
pub struct DispatcherRegistry {
    subkernel_to_kernel_name: HashMap<Vec<String>, String>,
    used_names: HashSet<String>,
}

impl DispatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variant group and return its dispatcher name.
    ///
    /// The first registration of a tuple appends its [`DispatcherDef`] to the
    /// wrapper preamble. Later registrations of the same tuple return the
    /// stored name and emit nothing.
    ///
    /// # Errors
    ///
    /// * [`InvalidGroupSize`](crate::Error::InvalidGroupSize) for fewer than two variants
    /// * [`DuplicateDispatcherName`](crate::Error::DuplicateDispatcherName) when a
    ///   different tuple already claimed the name derived from the first variant
    /// * [`NumelMismatch`](crate::Error::NumelMismatch) when a variant needs an
    ///   iteration size the first variant does not provide
    pub fn define_kernel<K: SubKernel>(&mut self, kernels: &[K], wrapper: &mut dyn WrapperCodegen) -> Result<String> {
        ensure!(kernels.len() >= 2, InvalidGroupSizeSnafu { count: kernels.len() });

        let kernel_names: Vec<String> = kernels.iter().map(|k| k.kernel_name().to_string()).collect();
        if let Some(name) = self.subkernel_to_kernel_name.get(&kernel_names) {
            tracing::trace!(dispatcher = %name, "reusing multi-kernel dispatcher");
            return Ok(name.clone());
        }

        let multi_kernel_name = dispatcher_name(&kernel_names[0]);
        if self.used_names.contains(&multi_kernel_name) {
            tracing::error!(dispatcher = %multi_kernel_name, kernels = ?kernel_names, "dispatcher name collision");
            return DuplicateDispatcherNameSnafu { name: multi_kernel_name, kernels: kernel_names }.fail();
        }

        let def = build_definition(multi_kernel_name.clone(), kernels)?;

        self.used_names.insert(multi_kernel_name.clone());
        self.subkernel_to_kernel_name.insert(kernel_names, multi_kernel_name.clone());

        tracing::debug!(
            dispatcher = %multi_kernel_name,
            variants = def.calls.len(),
            args = def.arg_names.len(),
            "defined multi-kernel dispatcher"
        );
        wrapper.define_dispatcher(&def);

        Ok(multi_kernel_name)
    }

    /// Dispatcher name previously assigned to this exact variant tuple.
    pub fn lookup(&self, kernel_names: &[String]) -> Option<&str> {
        self.subkernel_to_kernel_name.get(kernel_names).map(String::as_str)
    }

    /// Check whether a dispatcher name has been assigned.
    pub fn is_used(&self, name: &str) -> bool {
        self.used_names.contains(name)
    }

    /// Number of distinct dispatchers defined so far.
    pub fn len(&self) -> usize {
        self.subkernel_to_kernel_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subkernel_to_kernel_name.is_empty()
    }
}

/// Build the dispatcher signature and per-variant bindings.
///
/// The signature is the ordered union of all formal arguments followed by the
/// first variant's iteration sizes, which are authoritative for the group.
fn build_definition<K: SubKernel>(name: String, kernels: &[K]) -> Result<DispatcherDef> {
    let first = &kernels[0];
    let arg_names = all_kernel_arg_defs(kernels);
    let numel_names = numel_arg_defs(first);

    let arg_position: HashMap<&str, usize> = arg_names.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
    let numel_position: HashMap<&str, usize> =
        numel_names.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();

    let calls = kernels
        .iter()
        .map(|kernel| {
            // Every formal argument is in the union by construction.
            let arg_indices = kernel.arg_defs().iter().map(|def| arg_position[def.as_str()]).collect();

            let numel_indices = numel_arg_defs(kernel)
                .into_iter()
                .map(|numel| match numel_position.get(numel.as_str()) {
                    Some(&i) => Ok(i),
                    None => NumelMismatchSnafu {
                        kernel: kernel.kernel_name(),
                        numel,
                        first: first.kernel_name(),
                    }
                    .fail(),
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(SubKernelCall { kernel_name: kernel.kernel_name().to_string(), arg_indices, numel_indices })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DispatcherDef { name, arg_names, numel_names, calls })
}
