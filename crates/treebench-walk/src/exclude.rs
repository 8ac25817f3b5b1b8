//! Directory exclusion by path suffix.

use std::path::{Path, PathBuf};

/// Decides whether a directory subtree is skipped.
///
/// A directory matches when one of the configured suffixes equals the
/// trailing components of its path, so `out/tests` matches `/src/out/tests`
/// but not `/src/about/tests`.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    suffixes: Vec<PathBuf>,
}

impl ExclusionFilter {
    /// Create a filter from a list of suffixes. Empty entries are dropped.
    pub fn new<I, P>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &PathBuf| !p.as_os_str().is_empty())
                .collect(),
        }
    }

    /// True when the whole subtree rooted at `dir` must be skipped.
    pub fn should_skip(&self, dir: &Path) -> bool {
        self.suffixes.iter().any(|suffix| dir.ends_with(suffix))
    }

    /// Configured suffixes.
    pub fn suffixes(&self) -> &[PathBuf] {
        &self.suffixes
    }
}
