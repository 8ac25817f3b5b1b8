//! Parallelism sweeps over a single root.

use tracing::info;

use treebench_core::{WalkConfig, WalkError, WalkReport, available_cores};

use crate::walker::ForkWalker;

/// Pool sizes exercised by default: 1, 2, 4 and every available core,
/// ascending and without repeats.
pub fn default_levels() -> Vec<usize> {
    normalize_levels([1, 2, 4, available_cores()])
}

fn normalize_levels(levels: impl IntoIterator<Item = usize>) -> Vec<usize> {
    let mut levels: Vec<usize> = levels.into_iter().filter(|&n| n > 0).collect();
    levels.sort_unstable();
    levels.dedup();
    levels
}

/// Repeats a walk of one root across pool sizes and hashing modes.
///
/// Runs are ordered by hashing mode first, then by pool size, so all
/// traversal-only runs finish before any hashing run starts.
pub struct BenchmarkHarness {
    config: WalkConfig,
    levels: Vec<usize>,
    hash_modes: Vec<bool>,
}

impl BenchmarkHarness {
    /// Sweep the default levels, without and then with hashing.
    pub fn new(config: WalkConfig) -> Self {
        Self {
            config,
            levels: default_levels(),
            hash_modes: vec![false, true],
        }
    }

    /// Replace the pool sizes. Zeros are dropped, duplicates merged.
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = usize>) -> Self {
        self.levels = normalize_levels(levels);
        self
    }

    /// Replace the hashing modes to run, in order.
    pub fn with_hash_modes(mut self, modes: impl IntoIterator<Item = bool>) -> Self {
        self.hash_modes = modes.into_iter().collect();
        self
    }

    /// Pool sizes this harness will use.
    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    /// Run the sweep and collect every report.
    pub fn run(&self) -> Result<Vec<WalkReport>, WalkError> {
        self.run_with(|_| {})
    }

    /// Run the sweep, handing each report to `on_report` as soon as it is done.
    pub fn run_with(
        &self,
        mut on_report: impl FnMut(&WalkReport),
    ) -> Result<Vec<WalkReport>, WalkError> {
        if self.levels.is_empty() || self.hash_modes.is_empty() {
            return Err(WalkError::InvalidConfig {
                message: "benchmark needs at least one pool size and one hashing mode".to_string(),
            });
        }

        let mut reports = Vec::with_capacity(self.levels.len() * self.hash_modes.len());
        for &hash in &self.hash_modes {
            for &threads in &self.levels {
                let config = self.config.with_hashing(hash).with_threads(threads);
                let report = ForkWalker::new(config).walk()?;
                info!(
                    hashed = report.hashed,
                    parallelism = report.parallelism,
                    files = report.total_files,
                    elapsed_ms = report.elapsed_ms() as u64,
                    files_per_sec = report.files_per_second(),
                    "Benchmark run complete"
                );
                on_report(&report);
                reports.push(report);
            }
        }

        Ok(reports)
    }
}
