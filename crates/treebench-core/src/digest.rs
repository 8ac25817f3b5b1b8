//! Content digest and directory identity types.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Length in bytes of a computed digest.
pub const DIGEST_LEN: usize = 32;

/// BLAKE3 content digest of one file.
///
/// A file whose content could not be read because it was locked or
/// inaccessible gets the empty digest instead of an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(Option<[u8; DIGEST_LEN]>);

impl ContentDigest {
    /// Create a digest from raw bytes.
    pub fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(Some(bytes))
    }

    /// The digest reported for unreadable files.
    pub fn empty() -> Self {
        Self(None)
    }

    /// True for the empty digest.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Digest bytes; empty slice for the empty digest.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.0 {
            Some(bytes) => bytes,
            None => &[],
        }
    }

    /// Get the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.as_bytes().iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Identity of a directory, used to notice symlink cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirIdentity {
    /// Device and inode number.
    Inode { device: u64, inode: u64 },
    /// Canonical path, where inode numbers are unavailable.
    Path(PathBuf),
}

impl DirIdentity {
    /// Identity from device/inode numbers.
    pub fn inode(device: u64, inode: u64) -> Self {
        Self::Inode { device, inode }
    }
}
