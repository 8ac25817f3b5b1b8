//! Size-adaptive BLAKE3 file digests.
//!
//! Small files are read with a single call and hashed in one go; anything at
//! or above the threshold is streamed in threshold-sized chunks so peak
//! memory stays bounded no matter how large the file is. Both paths feed the
//! same hasher, so the digest never depends on which one was taken.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use blake3::Hasher;
use tracing::{trace, warn};

use treebench_core::{ContentDigest, WalkError};

/// How a file's content is read for hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Read the entire file into memory with one call.
    WholeBuffer,
    /// Stream through the reused chunk buffer in fixed-size reads.
    Chunked,
}

impl ReadMode {
    /// Pick the read mode for a file of `size` bytes.
    pub fn for_size(size: u64, threshold: u64) -> Self {
        if size < threshold {
            Self::WholeBuffer
        } else {
            Self::Chunked
        }
    }
}

/// Per-task digest accumulator.
///
/// Holds a reusable hasher and chunk buffer. Each walk task owns exactly one;
/// it is never handed to another task.
pub struct DigestState {
    hasher: Hasher,
    threshold: u64,
    buffer: Vec<u8>,
}

impl DigestState {
    /// Create a digest state with the given whole-buffer/chunked cut-over.
    pub fn new(threshold: u64) -> Self {
        Self {
            hasher: Hasher::new(),
            threshold: threshold.max(1),
            buffer: Vec::new(),
        }
    }

    /// Read mode that [`digest`](Self::digest) will use for `size` bytes.
    pub fn plan(&self, size: u64) -> ReadMode {
        ReadMode::for_size(size, self.threshold)
    }

    /// Digest a file, choosing the read mode from its size.
    ///
    /// A locked or inaccessible file yields [`ContentDigest::empty`] and a
    /// warning; any other I/O failure is returned.
    pub fn digest(&mut self, path: &Path, size: u64) -> Result<ContentDigest, WalkError> {
        let mode = self.plan(size);
        trace!(path = %path.display(), size, mode = ?mode, "Digesting file");
        self.digest_as(path, mode)
    }

    /// Digest a file with an explicit read mode.
    pub fn digest_as(&mut self, path: &Path, mode: ReadMode) -> Result<ContentDigest, WalkError> {
        let result = match mode {
            ReadMode::WholeBuffer => self.digest_whole(path),
            ReadMode::Chunked => self.digest_chunked(path),
        };

        match result {
            Ok(digest) => Ok(digest),
            Err(err) if is_inaccessible(&err) => {
                warn!(path = %path.display(), error = %err, "File locked or inaccessible, empty digest");
                Ok(ContentDigest::empty())
            }
            Err(err) => Err(WalkError::io(path, err)),
        }
    }

    fn digest_whole(&mut self, path: &Path) -> io::Result<ContentDigest> {
        let data = fs::read(path)?;
        self.hasher.reset();
        self.hasher.update(&data);
        Ok(self.finish())
    }

    fn digest_chunked(&mut self, path: &Path) -> io::Result<ContentDigest> {
        let chunk = usize::try_from(self.threshold).unwrap_or(usize::MAX);
        let mut file = File::open(path)?;
        self.buffer.resize(chunk, 0);
        self.hasher.reset();

        loop {
            let bytes_read = match file.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            self.hasher.update(&self.buffer[..bytes_read]);
        }

        Ok(self.finish())
    }

    fn finish(&self) -> ContentDigest {
        ContentDigest::new(*self.hasher.finalize().as_bytes())
    }
}

impl fmt::Debug for DigestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestState")
            .field("threshold", &self.threshold)
            .field("buffer_len", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

/// True when an error means the file is locked or otherwise not readable
/// right now, as opposed to a genuine I/O failure.
pub fn is_inaccessible(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::PermissionDenied | ErrorKind::ResourceBusy | ErrorKind::WouldBlock
    ) || is_lock_violation(err)
}

/// ERROR_SHARING_VIOLATION and ERROR_LOCK_VIOLATION.
#[cfg(windows)]
fn is_lock_violation(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(32 | 33))
}

#[cfg(not(windows))]
fn is_lock_violation(_err: &io::Error) -> bool {
    false
}
