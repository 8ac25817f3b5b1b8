//! Parallel walk engine for treebench.
//!
//! This crate walks a directory tree with one task per directory on a
//! bounded rayon pool, counting files and optionally digesting them.
//!
//! # Overview
//!
//! - **Fork per directory**: every subdirectory becomes its own task, forked
//!   by its parent as soon as it is found, so idle workers can steal whole
//!   subtrees.
//! - **Structured join**: a task waits for all of its children and sums
//!   their counts; a failed child counts as zero and never takes its
//!   siblings down.
//! - **Size-adaptive hashing**: small files are read in one call, large ones
//!   streamed in fixed-size chunks, both through BLAKE3.
//! - **Exclusions** by path suffix and **symlink cycle** protection.
//!
//! # Example
//!
//! ```rust,no_run
//! use treebench_walk::{ForkWalker, WalkConfig};
//!
//! let config = WalkConfig::new("/path/to/walk").with_hashing(true).with_threads(4);
//! let report = ForkWalker::new(config).walk().unwrap();
//!
//! println!("{} files in {} ms", report.total_files, report.elapsed_ms());
//! ```
//!
//! # Sweeps
//!
//! ```rust,no_run
//! use treebench_walk::{BenchmarkHarness, WalkConfig};
//!
//! let harness = BenchmarkHarness::new(WalkConfig::new("/path/to/walk"));
//! for report in harness.run().unwrap() {
//!     println!("{}", report.summary_line());
//! }
//! ```

mod ancestry;
mod bench;
mod digest;
mod exclude;
mod task;
mod walker;

pub use ancestry::{Ancestry, dir_identity};
pub use bench::{BenchmarkHarness, default_levels};
pub use digest::{DigestState, ReadMode, is_inaccessible};
pub use exclude::ExclusionFilter;
pub use task::{TaskState, WalkContext, WalkTask};
pub use walker::ForkWalker;

// Re-export core types for convenience
pub use treebench_core::{
    ContentDigest, DEFAULT_EXCLUDES, DEFAULT_SMALL_FILE_THRESHOLD, DirIdentity, WalkConfig,
    WalkError, WalkReport,
};
