//! Walk configuration types.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Files below this many bytes are read in one call; larger files are
/// streamed in chunks of the same size.
pub const DEFAULT_SMALL_FILE_THRESHOLD: u64 = 1_000_000;

/// Stack reserved for each pool worker.
///
/// A task waiting on its children runs pending child tasks on its own
/// thread, so one chain of nested directories can pile up on one stack.
pub const DEFAULT_WORKER_STACK_SIZE: usize = 128 * 1024 * 1024;

/// Directory suffixes skipped unless overridden.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    "community/build",
    "build/jdk",
    "out/classes",
    "out/tests",
];

/// Configuration for a single walk run.
///
/// One value is handed to the root task and shared by reference with every
/// descendant; nothing in it changes while a run is in flight.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct WalkConfig {
    /// Root directory to walk.
    pub root: PathBuf,

    /// Digest every regular file instead of only reading its mtime.
    #[builder(default = "false")]
    #[serde(default)]
    pub compute_hashes: bool,

    /// Worker pool size (0 = available cores).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Stack size of each pool worker, in bytes.
    #[builder(default = "DEFAULT_WORKER_STACK_SIZE")]
    #[serde(default = "default_worker_stack_size")]
    pub worker_stack_size: usize,

    /// Whole-buffer / chunked-stream cut-over, also used as the chunk size.
    #[builder(default = "DEFAULT_SMALL_FILE_THRESHOLD")]
    #[serde(default = "default_threshold")]
    pub small_file_threshold: u64,

    /// Directory path suffixes whose subtrees are skipped.
    #[builder(default = "default_excludes()")]
    #[serde(default = "default_excludes")]
    pub exclude: Vec<PathBuf>,

    /// Print `<hex> <path>` for every computed digest.
    #[builder(default = "false")]
    #[serde(default)]
    pub print_digests: bool,

    /// Print every directory as its task is created.
    #[builder(default = "false")]
    #[serde(default)]
    pub print_dirs: bool,

    /// Maximum directory depth below the root (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,
}

fn default_threshold() -> u64 {
    DEFAULT_SMALL_FILE_THRESHOLD
}

fn default_worker_stack_size() -> usize {
    DEFAULT_WORKER_STACK_SIZE
}

/// The built-in exclusion list as owned paths.
pub fn default_excludes() -> Vec<PathBuf> {
    DEFAULT_EXCLUDES.iter().map(PathBuf::from).collect()
}

impl WalkConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Root path cannot be empty".to_string());
            }
            None => return Err("Root path is required".to_string()),
            _ => {}
        }
        if self.small_file_threshold == Some(0) {
            return Err("Small file threshold must be greater than zero".to_string());
        }
        if self.worker_stack_size == Some(0) {
            return Err("Worker stack size must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl WalkConfig {
    /// Create a new walk config builder.
    pub fn builder() -> WalkConfigBuilder {
        WalkConfigBuilder::default()
    }

    /// Create a traversal-only config for a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            compute_hashes: false,
            threads: 0,
            worker_stack_size: DEFAULT_WORKER_STACK_SIZE,
            small_file_threshold: DEFAULT_SMALL_FILE_THRESHOLD,
            exclude: default_excludes(),
            print_digests: false,
            print_dirs: false,
            max_depth: None,
        }
    }

    /// Copy of this config with hashing switched on or off.
    pub fn with_hashing(&self, enabled: bool) -> Self {
        Self {
            compute_hashes: enabled,
            ..self.clone()
        }
    }

    /// Copy of this config with a different pool size.
    pub fn with_threads(&self, threads: usize) -> Self {
        Self {
            threads,
            ..self.clone()
        }
    }

    /// Pool size actually used for a run.
    pub fn effective_threads(&self) -> usize {
        match self.threads {
            0 => available_cores(),
            n => n,
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Number of cores the process may use, at least 1.
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = WalkConfig::builder()
            .root("/home/user")
            .threads(4usize)
            .compute_hashes(true)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user"));
        assert_eq!(config.threads, 4);
        assert!(config.compute_hashes);
        assert_eq!(config.small_file_threshold, DEFAULT_SMALL_FILE_THRESHOLD);
        assert_eq!(config.exclude.len(), DEFAULT_EXCLUDES.len());
    }

    #[test]
    fn test_config_simple() {
        let config = WalkConfig::new("/home/user");
        assert_eq!(config.root, PathBuf::from("/home/user"));
        assert!(!config.compute_hashes);
        assert!(!config.print_dirs);
        assert_eq!(config.threads, 0);
    }

    #[test]
    fn test_builder_rejects_empty_root() {
        assert!(WalkConfig::builder().root("").build().is_err());
        assert!(WalkConfig::builder().build().is_err());
    }

    #[test]
    fn test_builder_rejects_zero_threshold() {
        let result = WalkConfig::builder()
            .root("/tmp")
            .small_file_threshold(0u64)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_worker_stack_size() {
        let config = WalkConfig::new("/data");
        assert_eq!(config.worker_stack_size, DEFAULT_WORKER_STACK_SIZE);

        let config = WalkConfig::builder()
            .root("/data")
            .worker_stack_size(8usize << 20)
            .build()
            .unwrap();
        assert_eq!(config.worker_stack_size, 8 << 20);

        let result = WalkConfig::builder()
            .root("/data")
            .worker_stack_size(0usize)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_with_helpers_leave_original_untouched() {
        let base = WalkConfig::new("/data");
        let hashed = base.with_hashing(true).with_threads(2);

        assert!(!base.compute_hashes);
        assert_eq!(base.threads, 0);
        assert!(hashed.compute_hashes);
        assert_eq!(hashed.effective_threads(), 2);
        assert_eq!(hashed.root, base.root);
    }

    #[test]
    fn test_effective_threads_auto() {
        let config = WalkConfig::new("/data");
        assert_eq!(config.effective_threads(), available_cores());
        assert!(config.effective_threads() >= 1);
    }
}
