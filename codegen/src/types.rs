//! Types for multi-kernel code generation.

use std::fmt;

use itertools::Itertools;

use crate::traits::SubKernel;

/// Prefix of an iteration dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangePrefix {
    X,
    Y,
    Z,
    /// Reduction dimension.
    R,
}

impl RangePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::R => "r",
        }
    }

    pub fn is_reduction(&self) -> bool {
        matches!(self, Self::R)
    }

    /// Name of the size parameter for this dimension (`xnumel`, `rnumel`, ...).
    pub fn numel_name(&self) -> String {
        format!("{}numel", self.as_str())
    }
}

impl fmt::Display for RangePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One iteration dimension of a kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeTree {
    pub prefix: RangePrefix,
    /// Wrapper-side expression for the dimension size (literal or symbol).
    pub numel: String,
}

impl RangeTree {
    pub fn new(prefix: RangePrefix, numel: impl Into<String>) -> Self {
        Self { prefix, numel: numel.into() }
    }
}

/// Plain-data description of a kernel variant.
///
/// Formal parameters and the wrapper-side values bound to them are added in
/// pairs, so `arg_defs` and `call_args` always have the same length.
///
/// ```ignore
/// let kernel = KernelSignature::new("triton_red_fused_sum_0")
///     .arg("in_ptr0", "arg0_1")
///     .arg("out_ptr0", "buf0")
///     .range(RangePrefix::X, "s0")
///     .range(RangePrefix::R, "1024");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelSignature {
    name: String,
    arg_defs: Vec<String>,
    call_args: Vec<String>,
    range_trees: Vec<RangeTree>,
    inside_reduction: bool,
}

impl KernelSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Append a formal parameter and the value the wrapper passes for it.
    pub fn arg(mut self, def: impl Into<String>, call: impl Into<String>) -> Self {
        self.arg_defs.push(def.into());
        self.call_args.push(call.into());
        self
    }

    /// Append an iteration dimension.
    pub fn range(mut self, prefix: RangePrefix, numel: impl Into<String>) -> Self {
        self.range_trees.push(RangeTree::new(prefix, numel));
        self
    }

    /// Mark whether the kernel body performs its reduction inline.
    pub fn with_inside_reduction(mut self, inside: bool) -> Self {
        self.inside_reduction = inside;
        self
    }
}

impl SubKernel for KernelSignature {
    fn kernel_name(&self) -> &str {
        &self.name
    }

    fn arg_defs(&self) -> &[String] {
        &self.arg_defs
    }

    fn call_args(&self) -> &[String] {
        &self.call_args
    }

    fn range_trees(&self) -> &[RangeTree] {
        &self.range_trees
    }

    fn inside_reduction(&self) -> bool {
        self.inside_reduction
    }
}

/// How one variant is called from its dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubKernelCall {
    pub kernel_name: String,
    /// Positions in [`DispatcherDef::arg_names`] of the variant's own
    /// arguments, in the variant's declaration order.
    pub arg_indices: Vec<usize>,
    /// Positions in [`DispatcherDef::numel_names`] of the variant's
    /// iteration sizes.
    pub numel_indices: Vec<usize>,
}

/// Definition of a multi-kernel dispatcher.
///
/// The dispatcher entry point takes `arg_names`, then `numel_names`, then a
/// launch configuration and a stream. Each entry of `calls` binds one
/// variant (in group order) to its subset of that signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherDef {
    pub name: String,
    pub arg_names: Vec<String>,
    pub numel_names: Vec<String>,
    pub calls: Vec<SubKernelCall>,
}

impl DispatcherDef {
    /// Variant names in group order.
    pub fn kernel_names(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().map(|call| call.kernel_name.as_str())
    }

    /// Number of positional arguments before the launch configuration.
    pub fn arity(&self) -> usize {
        self.arg_names.len() + self.numel_names.len()
    }

    /// Check that every call indexes inside the dispatcher signature.
    pub fn is_well_formed(&self) -> bool {
        self.calls.iter().all(|call| {
            call.arg_indices.iter().all(|&i| i < self.arg_names.len())
                && call.numel_indices.iter().all(|&i| i < self.numel_names.len())
        })
    }
}

impl fmt::Display for DispatcherDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dispatcher {} [{}]", self.name, self.kernel_names().join(", "))?;
        writeln!(f, "  signature ({} | {} | grid, stream)", self.arg_names.join(", "), self.numel_names.join(", "))?;
        for (i, call) in self.calls.iter().enumerate() {
            let args = call.arg_indices.iter().map(|&a| self.arg_names.get(a).map_or("?", String::as_str)).join(", ");
            let numels =
                call.numel_indices.iter().map(|&n| self.numel_names.get(n).map_or("?", String::as_str)).join(", ");
            writeln!(f, "  call{i} {}({args} | {numels} | grid, stream)", call.kernel_name)?;
        }
        Ok(())
    }
}
