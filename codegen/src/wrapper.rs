//! In-memory wrapper program.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;

use crate::traits::WrapperCodegen;
use crate::types::DispatcherDef;

/// One emitted call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelCallSite {
    pub kernel_name: String,
    pub call_args: Vec<String>,
    pub grid: Vec<String>,
    pub device_index: usize,
}

impl fmt::Display for KernelCallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}; grid=[{}], device={})",
            self.kernel_name,
            self.call_args.iter().join(", "),
            self.grid.iter().join(", "),
            self.device_index
        )
    }
}

/// Wrapper program split into a preamble (dispatcher definitions) and a body
/// (call sites).
///
/// Keeps both the rendered text and the structured definitions; the runtime
/// `DispatchTable` is loaded from the latter.
#[derive(Debug, Default)]
pub struct WrapperBuffer {
    header: String,
    body: String,
    dispatchers: Vec<Arc<DispatcherDef>>,
    call_sites: Vec<KernelCallSite>,
}

impl WrapperBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered preamble.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Rendered call sites.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Dispatcher definitions in emission order.
    pub fn dispatchers(&self) -> &[Arc<DispatcherDef>] {
        &self.dispatchers
    }

    pub fn call_sites(&self) -> &[KernelCallSite] {
        &self.call_sites
    }

    pub fn into_dispatchers(self) -> Vec<Arc<DispatcherDef>> {
        self.dispatchers
    }
}

impl WrapperCodegen for WrapperBuffer {
    fn define_dispatcher(&mut self, def: &DispatcherDef) {
        self.header.push_str(&def.to_string());
        self.dispatchers.push(Arc::new(def.clone()));
    }

    fn generate_kernel_call(&mut self, kernel_name: &str, call_args: &[String], grid: &[String], device_index: usize) {
        let site = KernelCallSite {
            kernel_name: kernel_name.to_string(),
            call_args: call_args.to_vec(),
            grid: grid.to_vec(),
            device_index,
        };
        self.body.push_str(&site.to_string());
        self.body.push('\n');
        self.call_sites.push(site);
    }
}
