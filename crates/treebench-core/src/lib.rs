//! Core types and configuration for treebench.
//!
//! This crate provides the plain data shared by the walk engine and the
//! benchmark binary: run configuration, error types, digests and reports.

mod config;
mod digest;
mod error;
mod report;

pub use config::{
    DEFAULT_EXCLUDES, DEFAULT_SMALL_FILE_THRESHOLD, DEFAULT_WORKER_STACK_SIZE, WalkConfig,
    WalkConfigBuilder, available_cores, default_excludes,
};
pub use digest::{ContentDigest, DIGEST_LEN, DirIdentity};
pub use error::WalkError;
pub use report::WalkReport;
