//! Ancestor chains for symlink cycle detection.

use std::fs::Metadata;
use std::path::Path;
use std::sync::Arc;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use treebench_core::DirIdentity;

/// Immutable chain of directory identities from the root down to a task.
///
/// Each task holds the chain ending at its own directory. Following a
/// symlink back into a directory already on the chain would loop forever,
/// so such a directory is not descended into. Reaching the same directory
/// through two unrelated links is not a cycle and is walked both times.
#[derive(Debug)]
pub struct Ancestry {
    identity: DirIdentity,
    depth: u32,
    parent: Option<Arc<Ancestry>>,
}

impl Ancestry {
    /// Chain for the traversal root.
    pub fn root(identity: DirIdentity) -> Arc<Self> {
        Arc::new(Self {
            identity,
            depth: 0,
            parent: None,
        })
    }

    /// Extend the chain by one directory.
    pub fn child(self: &Arc<Self>, identity: DirIdentity) -> Arc<Self> {
        Arc::new(Self {
            identity,
            depth: self.depth + 1,
            parent: Some(Arc::clone(self)),
        })
    }

    /// Depth below the root (root = 0).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Identity of the directory this chain ends at.
    pub fn identity(&self) -> &DirIdentity {
        &self.identity
    }

    /// Check whether a directory is this one or one of its ancestors.
    pub fn contains(&self, identity: &DirIdentity) -> bool {
        let mut link = Some(self);
        while let Some(node) = link {
            if &node.identity == identity {
                return true;
            }
            link = node.parent.as_deref();
        }
        false
    }
}

/// Identity of a directory from its (link-followed) metadata.
#[cfg(unix)]
pub fn dir_identity(_path: &Path, metadata: &Metadata) -> DirIdentity {
    DirIdentity::inode(metadata.dev(), metadata.ino())
}

#[cfg(not(unix))]
pub fn dir_identity(path: &Path, _metadata: &Metadata) -> DirIdentity {
    DirIdentity::Path(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_self_and_ancestors() {
        let root = Ancestry::root(DirIdentity::inode(1, 10));
        let child = root.child(DirIdentity::inode(1, 11));
        let grandchild = child.child(DirIdentity::inode(1, 12));

        assert_eq!(grandchild.depth(), 2);
        assert!(grandchild.contains(&DirIdentity::inode(1, 10)));
        assert!(grandchild.contains(&DirIdentity::inode(1, 11)));
        assert!(grandchild.contains(&DirIdentity::inode(1, 12)));
        assert!(!child.contains(&DirIdentity::inode(1, 12)));
    }

    #[test]
    fn test_siblings_are_independent() {
        let root = Ancestry::root(DirIdentity::inode(1, 10));
        let left = root.child(DirIdentity::inode(1, 20));
        let right = root.child(DirIdentity::inode(1, 30));

        assert!(!left.contains(right.identity()));
        assert!(!right.contains(left.identity()));
    }

    #[test]
    fn test_different_devices() {
        let root = Ancestry::root(DirIdentity::inode(1, 10));
        assert!(!root.contains(&DirIdentity::inode(2, 10)));
    }

    #[test]
    fn test_identity_from_metadata() {
        let temp = tempfile::TempDir::new().unwrap();
        let meta = std::fs::metadata(temp.path()).unwrap();

        let a = dir_identity(temp.path(), &meta);
        let b = dir_identity(temp.path(), &std::fs::metadata(temp.path()).unwrap());
        assert_eq!(a, b);
    }
}
