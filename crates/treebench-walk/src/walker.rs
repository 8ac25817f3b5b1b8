//! Runs a root walk task on a dedicated worker pool.

use std::fs;
use std::time::Instant;

use rayon::ThreadPoolBuilder;
use tracing::{debug, error};

use treebench_core::{WalkConfig, WalkError, WalkReport};

use crate::task::{WalkContext, WalkTask};

/// Walks one root with a bounded, work-stealing worker pool.
pub struct ForkWalker {
    config: WalkConfig,
}

impl ForkWalker {
    /// Create a walker for a config.
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    /// The config this walker runs with.
    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Walk the configured root once and report the total.
    ///
    /// Only setup problems are returned as errors: an unusable root or a
    /// pool that cannot be started. A failure inside the walk itself is
    /// logged and shows up as `root_failed` with a zero count.
    pub fn walk(&self) -> Result<WalkReport, WalkError> {
        let root = self
            .config
            .root
            .canonicalize()
            .map_err(|e| WalkError::io(&self.config.root, e))?;

        let metadata = fs::metadata(&root).map_err(|e| WalkError::io(&root, e))?;
        if !metadata.is_dir() {
            return Err(WalkError::NotADirectory { path: root });
        }

        let threads = self.config.effective_threads();
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("treebench-{i}"))
            .stack_size(self.config.worker_stack_size)
            .build()
            .map_err(|e| WalkError::ThreadPool {
                threads,
                message: e.to_string(),
            })?;

        let ctx = WalkContext::new(&self.config);

        let start = Instant::now();
        let outcome = if ctx.filter().should_skip(&root) {
            debug!(root = %root.display(), "Root matches an exclusion, nothing to walk");
            Ok(0)
        } else {
            pool.install(|| WalkTask::root(root.clone(), &metadata, &ctx).run())
        };
        let elapsed = start.elapsed();

        let (total_files, root_failed) = match outcome {
            Ok(count) => (count, false),
            Err(err) => {
                error!(root = %root.display(), error = %err, "Walk failed at the root");
                (0, true)
            }
        };

        debug!(
            root = %root.display(),
            threads,
            hashed = ctx.compute_hashes(),
            total_files,
            elapsed_ms = elapsed.as_millis() as u64,
            "Walk finished"
        );

        Ok(WalkReport {
            root,
            parallelism: threads,
            hashed: ctx.compute_hashes(),
            total_files,
            elapsed,
            root_failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_root() {
        let temp = TempDir::new().unwrap();
        let report = ForkWalker::new(WalkConfig::new(temp.path()).with_threads(2))
            .walk()
            .unwrap();

        assert_eq!(report.total_files, 0);
        assert_eq!(report.parallelism, 2);
        assert!(!report.hashed);
        assert!(!report.root_failed);
        assert!(report.root.is_absolute());
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = ForkWalker::new(WalkConfig::new(temp.path().join("nope")))
            .walk()
            .unwrap_err();
        assert!(matches!(err, WalkError::NotFound { .. }));
    }

    #[test]
    fn test_file_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let err = ForkWalker::new(WalkConfig::new(&file)).walk().unwrap_err();
        assert!(matches!(err, WalkError::NotADirectory { .. }));
    }

    #[test]
    fn test_excluded_root() {
        let temp = TempDir::new().unwrap();
        let git = temp.path().join(".git");
        fs::create_dir(&git).unwrap();
        fs::write(git.join("HEAD"), "ref").unwrap();

        let report = ForkWalker::new(WalkConfig::new(&git)).walk().unwrap();
        assert_eq!(report.total_files, 0);
        assert!(!report.root_failed);
    }
}
