use std::path::PathBuf;
use std::time::Duration;

use treebench_core::{
    ContentDigest, DEFAULT_EXCLUDES, DEFAULT_SMALL_FILE_THRESHOLD, DEFAULT_WORKER_STACK_SIZE,
    DirIdentity, WalkConfig, WalkError, WalkReport,
};

#[test]
fn test_content_digest_creation_and_hex() {
    let bytes = [0xab; 32];
    let digest = ContentDigest::new(bytes);

    let hex = digest.to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(hex.starts_with("ab"));

    assert_eq!(digest, ContentDigest::new(bytes));
    assert_ne!(digest, ContentDigest::new([0xcd; 32]));
    assert_ne!(digest, ContentDigest::empty());
}

#[test]
fn test_dir_identity() {
    let a = DirIdentity::inode(12345, 67890);
    let b = DirIdentity::Inode {
        device: 12345,
        inode: 67890,
    };
    assert_eq!(a, b);
    assert_ne!(a, DirIdentity::inode(12345, 1));
    assert_ne!(a, DirIdentity::Path(PathBuf::from("/tmp")));
}

#[test]
fn test_walk_config_builder() {
    let config = WalkConfig::builder()
        .root("/test/path")
        .max_depth(Some(5))
        .threads(8usize)
        .small_file_threshold(4096u64)
        .print_digests(true)
        .print_dirs(true)
        .exclude(vec![PathBuf::from("target"), PathBuf::from("node_modules")])
        .build()
        .unwrap();

    assert_eq!(config.root.to_str().unwrap(), "/test/path");
    assert_eq!(config.max_depth, Some(5));
    assert_eq!(config.threads, 8);
    assert_eq!(config.small_file_threshold, 4096);
    assert!(config.print_digests);
    assert!(config.print_dirs);
    assert!(!config.compute_hashes);
    assert_eq!(config.exclude.len(), 2);
}

#[test]
fn test_walk_config_defaults_from_json() {
    let config: WalkConfig = serde_json::from_str(r#"{"root": "/data"}"#).unwrap();

    assert_eq!(config.root, PathBuf::from("/data"));
    assert!(!config.compute_hashes);
    assert_eq!(config.threads, 0);
    assert_eq!(config.small_file_threshold, DEFAULT_SMALL_FILE_THRESHOLD);
    assert_eq!(config.exclude.len(), DEFAULT_EXCLUDES.len());
    assert!(config.max_depth.is_none());
    assert_eq!(config.worker_stack_size, DEFAULT_WORKER_STACK_SIZE);
}

#[test]
fn test_walk_report_json() {
    let report = WalkReport {
        root: PathBuf::from("/data"),
        parallelism: 2,
        hashed: false,
        total_files: 10,
        elapsed: Duration::from_millis(15),
        root_failed: false,
    };

    let json = serde_json::to_string(&report).unwrap();
    let back: WalkReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
    assert_eq!(back.summary_line(), "hash=false parallelism=02 files=10 elapsed=15ms");
}

#[test]
fn test_error_display() {
    let err = WalkError::NotADirectory {
        path: PathBuf::from("/etc/hosts"),
    };
    assert_eq!(err.to_string(), "Root path is not a directory: /etc/hosts");

    let err = WalkError::InvalidConfig {
        message: "bad".to_string(),
    };
    assert_eq!(err.to_string(), "Invalid configuration: bad");
}
