//! Executable kernel interface.
//!
//! A [`Program`] is one compiled variant of a kernel. The dispatcher never
//! inspects how it was produced; it only launches it with a positional
//! argument list, the iteration sizes, a launch configuration and a stream.

use crate::error::Result;

/// A single positional kernel argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelArg {
    /// Raw pointer to buffer data.
    Buffer(*mut u8),
    /// Integer scalar (sizes, strides, symbolic shape values).
    Int(i64),
    /// Floating point scalar.
    Float(f64),
}

impl KernelArg {
    /// Get the integer value, if this is an integer argument.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

/// Launch geometry for a kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LaunchConfig {
    /// Global work size (total number of work items per dimension).
    pub global_size: Option<[usize; 3]>,
    /// Local work size (work group size per dimension).
    pub local_size: Option<[usize; 3]>,
}

impl LaunchConfig {
    /// Grid derived from iteration sizes, one dimension per size (at most 3).
    ///
    /// Negative sizes clamp to zero.
    pub fn from_numels(numels: &[i64]) -> Self {
        let mut global = [1usize; 3];
        for (dim, &numel) in global.iter_mut().zip(numels) {
            *dim = usize::try_from(numel).unwrap_or(0);
        }
        Self { global_size: Some(global), local_size: None }
    }
}

/// Opaque execution stream handle (CUDA stream, command queue, or 0 for the host).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Stream(pub u64);

impl Stream {
    /// The default (null) stream.
    pub const DEFAULT: Stream = Stream(0);
}

/// A compiled, executable kernel variant.
///
/// Programs are shared between dispatchers and compile workers, so they
/// must be `Send + Sync`.
pub trait Program: Send + Sync {
    /// Launch the kernel.
    ///
    /// # Arguments
    ///
    /// * `args` - The kernel's own positional arguments, in declaration order
    /// * `numels` - Iteration sizes, in the order of the kernel's numel parameters
    /// * `launch` - Launch geometry
    /// * `stream` - Stream the launch is enqueued on
    ///
    /// # Safety
    ///
    /// Buffer pointers in `args` must be valid and properly aligned for the
    /// duration of the launch, and their sizes must match what the kernel
    /// expects.
    unsafe fn run(&self, args: &[KernelArg], numels: &[i64], launch: &LaunchConfig, stream: Stream) -> Result<()>;

    /// Get the kernel name (for dispatch tables and profiling).
    fn name(&self) -> &str;
}

impl std::fmt::Debug for dyn Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program").field("name", &self.name()).finish()
    }
}
