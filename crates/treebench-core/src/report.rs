//! Per-run benchmark results.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Outcome of one walk of a root under one pool size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkReport {
    /// Canonical root that was walked.
    pub root: PathBuf,
    /// Worker pool size.
    pub parallelism: usize,
    /// Whether file contents were digested.
    pub hashed: bool,
    /// Regular files counted across the whole tree.
    pub total_files: u64,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
    /// The root task itself failed, so `total_files` is zero.
    #[serde(default)]
    pub root_failed: bool,
}

impl WalkReport {
    /// Elapsed wall-clock time in whole milliseconds.
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Files counted per second of wall-clock time.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.total_files as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// One-line summary: `hash=<bool> parallelism=<NN> files=<n> elapsed=<ms>ms`.
    pub fn summary_line(&self) -> String {
        format!(
            "hash={} parallelism={:02} files={} elapsed={}ms",
            self.hashed,
            self.parallelism,
            self.total_files,
            self.elapsed_ms()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(elapsed: Duration) -> WalkReport {
        WalkReport {
            root: PathBuf::from("/data"),
            parallelism: 4,
            hashed: true,
            total_files: 250,
            elapsed,
            root_failed: false,
        }
    }

    #[test]
    fn test_summary_line_pads_parallelism() {
        let line = report(Duration::from_millis(1234)).summary_line();
        assert_eq!(line, "hash=true parallelism=04 files=250 elapsed=1234ms");
    }

    #[test]
    fn test_files_per_second() {
        assert_eq!(report(Duration::ZERO).files_per_second(), 0.0);
        let rate = report(Duration::from_secs(2)).files_per_second();
        assert!((rate - 125.0).abs() < f64::EPSILON);
    }
}
