//! Variant benchmarking infrastructure.
//!
//! Provides timing utilities for measuring a zero-argument call, used by
//! [`MultiKernelCall`](crate::MultiKernelCall) to compare candidate variants
//! the first time a dispatcher runs.

use std::hint::black_box;
use std::time::{Duration, Instant};

use bon::bon;
use kernsel_device::Result as DeviceResult;

/// Configuration for variant benchmarking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkConfig {
    /// Number of timing runs per candidate.
    pub repeat: usize,
    /// Number of warmup runs (not timed).
    pub warmup_runs: usize,
    /// Whether to evict caches before every timing run.
    pub flush_between_reps: bool,
    /// Size of the buffer written to evict caches.
    pub flush_bytes: usize,
    /// Whether to return minimum time (true) or mean (false).
    pub take_minimum: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self { repeat: 40, warmup_runs: 1, flush_between_reps: true, flush_bytes: 32 << 20, take_minimum: true }
    }
}

#[bon]
impl BenchmarkConfig {
    /// Create a benchmark configuration with builder pattern.
    #[builder]
    pub fn new(
        #[builder(default = 40)] repeat: usize,
        #[builder(default = 1)] warmup_runs: usize,
        #[builder(default = true)] flush_between_reps: bool,
        #[builder(default = 32 << 20)] flush_bytes: usize,
        #[builder(default = true)] take_minimum: bool,
    ) -> Self {
        Self { repeat, warmup_runs, flush_between_reps, flush_bytes, take_minimum }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `KERNSEL_BENCH_REPEAT` - Timing runs per candidate (default: 40)
    /// * `KERNSEL_BENCH_WARMUP` - Warmup runs per candidate (default: 1)
    /// * `KERNSEL_BENCH_NOFLUSH` - Disable cache flushing if set
    /// * `KERNSEL_BENCH_FLUSH_BYTES` - Flush buffer size (default: 32 MiB)
    /// * `KERNSEL_BENCH_MEAN` - Compare mean instead of minimum time if set
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create configuration from `KERNSEL_BENCH_*` values returned by `lookup`.
    ///
    /// Unparsable numbers fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let repeat = lookup("KERNSEL_BENCH_REPEAT").and_then(|s| s.parse().ok()).unwrap_or(40);
        let warmup_runs = lookup("KERNSEL_BENCH_WARMUP").and_then(|s| s.parse().ok()).unwrap_or(1);
        let flush_between_reps = lookup("KERNSEL_BENCH_NOFLUSH").is_none();
        let flush_bytes = lookup("KERNSEL_BENCH_FLUSH_BYTES").and_then(|s| s.parse().ok()).unwrap_or(32 << 20);
        let take_minimum = lookup("KERNSEL_BENCH_MEAN").is_none();

        Self { repeat, warmup_runs, flush_between_reps, flush_bytes, take_minimum }
    }
}

/// Result of benchmarking one candidate.
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    /// Minimum execution time.
    pub min: Duration,
    /// Mean execution time.
    pub mean: Duration,
    /// All timing measurements.
    pub runs: Vec<Duration>,
}

impl BenchmarkResult {
    fn from_runs(runs: Vec<Duration>) -> Self {
        let min = runs.iter().copied().min().unwrap_or(Duration::ZERO);
        let total: Duration = runs.iter().sum();
        let mean = total / runs.len().max(1) as u32;
        Self { min, mean, runs }
    }

    /// Get the timing value based on config preference.
    pub fn timing(&self, take_minimum: bool) -> Duration {
        if take_minimum { self.min } else { self.mean }
    }
}

/// Evicts CPU caches by rewriting a buffer larger than the last-level cache.
#[derive(Debug)]
pub struct CacheFlusher {
    buffer: Vec<u8>,
    epoch: u8,
}

impl CacheFlusher {
    pub fn new(bytes: usize) -> Self {
        Self { buffer: vec![0; bytes], epoch: 0 }
    }

    pub fn flush(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.buffer.fill(self.epoch);
        black_box(&mut self.buffer);
    }
}

/// Time a zero-argument call.
///
/// Runs warmup iterations (discarded), then `config.repeat` timing
/// iterations, flushing caches before each one if configured. The first
/// error from `call` aborts the measurement.
pub fn benchmark_call(
    call: &dyn Fn() -> DeviceResult<()>,
    config: &BenchmarkConfig,
) -> DeviceResult<BenchmarkResult> {
    let mut flusher = config.flush_between_reps.then(|| CacheFlusher::new(config.flush_bytes));

    for _ in 0..config.warmup_runs {
        call()?;
    }

    let repeat = config.repeat.max(1);
    let mut runs = Vec::with_capacity(repeat);
    for _ in 0..repeat {
        if let Some(flusher) = flusher.as_mut() {
            flusher.flush();
        }
        let start = Instant::now();
        call()?;
        runs.push(start.elapsed());
    }

    Ok(BenchmarkResult::from_runs(runs))
}

/// Measures how long a candidate call takes.
pub trait Benchmarker: Send + Sync {
    /// Time `call` and return the duration used to rank it.
    ///
    /// Errors from `call` must be returned, not swallowed.
    fn benchmark(&self, call: &dyn Fn() -> DeviceResult<()>) -> DeviceResult<Duration>;
}

/// Wall-clock benchmarker driven by a [`BenchmarkConfig`].
///
/// Holds no mutable state, so one instance can be shared by any number of
/// dispatchers benchmarking at the same time. Each measurement allocates its
/// own flush buffer and frees it when done.
#[derive(Debug, Clone)]
pub struct WallClockBenchmarker {
    config: BenchmarkConfig,
}

impl WallClockBenchmarker {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(BenchmarkConfig::from_env())
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }
}

impl Default for WallClockBenchmarker {
    fn default() -> Self {
        Self::new(BenchmarkConfig::default())
    }
}

impl Benchmarker for WallClockBenchmarker {
    fn benchmark(&self, call: &dyn Fn() -> DeviceResult<()>) -> DeviceResult<Duration> {
        Ok(benchmark_call(call, &self.config)?.timing(self.config.take_minimum))
    }
}
