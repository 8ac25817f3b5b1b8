//! Fork-per-directory walk tasks.
//!
//! A [`WalkTask`] owns exactly one directory. It lists the directory once,
//! counts and optionally digests the files it finds, and forks a child task
//! onto the current rayon pool for every subdirectory it is allowed to enter.
//! The task then waits for all of its children and adds their counts to its
//! own. Children report back through a write-once slot, so a parent can tell
//! a child that finished with a count from one that failed.

use std::fs::{self, DirEntry, Metadata};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use rayon::Scope;
use tracing::{error, trace, warn};

use treebench_core::{WalkConfig, WalkError};

use crate::ancestry::{Ancestry, dir_identity};
use crate::digest::DigestState;
use crate::exclude::ExclusionFilter;

/// Read-only settings shared by every task of one run.
#[derive(Debug, Clone)]
pub struct WalkContext {
    compute_hashes: bool,
    print_digests: bool,
    print_dirs: bool,
    small_file_threshold: u64,
    max_depth: Option<u32>,
    filter: ExclusionFilter,
    #[cfg(test)]
    fail_on: Option<PathBuf>,
}

impl WalkContext {
    /// Build the shared context for a run.
    pub fn new(config: &WalkConfig) -> Self {
        Self {
            compute_hashes: config.compute_hashes,
            print_digests: config.print_digests,
            print_dirs: config.print_dirs,
            small_file_threshold: config.small_file_threshold,
            max_depth: config.max_depth,
            filter: ExclusionFilter::new(config.exclude.iter().cloned()),
            #[cfg(test)]
            fail_on: None,
        }
    }

    /// The directory exclusion filter.
    pub fn filter(&self) -> &ExclusionFilter {
        &self.filter
    }

    /// Whether file contents are digested.
    pub fn compute_hashes(&self) -> bool {
        self.compute_hashes
    }

    #[cfg(test)]
    fn fail_point(&self, path: &Path) -> Result<(), WalkError> {
        if self.fail_on.as_deref() == Some(path) {
            return Err(WalkError::io(path, std::io::Error::other("injected failure")));
        }
        Ok(())
    }

    #[cfg(not(test))]
    #[inline(always)]
    fn fail_point(&self, _path: &Path) -> Result<(), WalkError> {
        Ok(())
    }
}

/// Lifecycle of a walk task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Directory and settings fixed, not yet scheduled.
    Created,
    /// Listing the directory.
    Running,
    /// Listing finished, waiting for forked children.
    AwaitingChildren,
    /// All children folded in; the count is final.
    Joined,
}

type ChildSlot = Arc<OnceLock<Result<u64, WalkError>>>;

/// A forked child and the slot it reports into.
#[derive(Debug)]
struct ChildHandle {
    dir: PathBuf,
    slot: ChildSlot,
}

/// Traversal of one directory and, through its children, its subtree.
///
/// Kept small: a waiting parent may run its children inline on the same
/// worker, so every directory level costs one task's worth of stack.
#[derive(Debug)]
pub struct WalkTask<'ctx> {
    dir: PathBuf,
    ctx: &'ctx WalkContext,
    ancestry: Arc<Ancestry>,
    files: u64,
    children: Vec<ChildHandle>,
    state: TaskState,
    digest: Option<Box<DigestState>>,
}

impl<'ctx> WalkTask<'ctx> {
    /// Create the task for the traversal root.
    ///
    /// `metadata` is the link-followed metadata of `dir`.
    pub fn root(dir: PathBuf, metadata: &Metadata, ctx: &'ctx WalkContext) -> Self {
        let ancestry = Ancestry::root(dir_identity(&dir, metadata));
        Self::new(dir, ctx, ancestry)
    }

    fn new(dir: PathBuf, ctx: &'ctx WalkContext, ancestry: Arc<Ancestry>) -> Self {
        if ctx.print_dirs {
            println!("{}", dir.display());
        }
        Self {
            dir,
            ctx,
            ancestry,
            files: 0,
            children: Vec::new(),
            state: TaskState::Created,
            digest: None,
        }
    }

    /// Directory this task owns.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Files counted so far; the subtree total once [`TaskState::Joined`].
    pub fn files(&self) -> u64 {
        self.files
    }

    /// Walk the directory, wait for every forked child and fold their counts.
    ///
    /// Must run inside a rayon pool. Returns the subtree file count, or the
    /// error that made this task abandon its subtree.
    pub fn run(&mut self) -> Result<u64, WalkError> {
        debug_assert_eq!(self.state, TaskState::Created);
        self.set_state(TaskState::Running);

        let scanned = rayon::scope(|scope| {
            let result = self.scan(scope);
            self.set_state(TaskState::AwaitingChildren);
            result
        });

        // The scope has joined every child by now, even on failure.
        if let Err(err) = scanned {
            self.children.clear();
            return Err(err);
        }

        self.fold_children();
        self.set_state(TaskState::Joined);
        Ok(self.files)
    }

    fn scan<'scope>(&mut self, scope: &Scope<'scope>) -> Result<(), WalkError>
    where
        'ctx: 'scope,
    {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %self.dir.display(), error = %err, "Failed to list directory");
                return Ok(());
            }
        };

        for entry in entries {
            match entry {
                Ok(entry) => self.visit(entry, scope)?,
                Err(err) => {
                    warn!(dir = %self.dir.display(), error = %err, "Directory listing interrupted");
                    break;
                }
            }
        }

        Ok(())
    }

    fn visit<'scope>(&mut self, entry: DirEntry, scope: &Scope<'scope>) -> Result<(), WalkError>
    where
        'ctx: 'scope,
    {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| WalkError::io(&path, e))?;

        if file_type.is_dir() {
            match entry.metadata() {
                Ok(metadata) => self.fork(path, &metadata, scope),
                Err(err) => warn!(dir = %path.display(), error = %err, "Failed to stat directory"),
            }
            return Ok(());
        }

        if file_type.is_symlink() {
            match fs::metadata(&path) {
                Ok(target) if target.is_dir() => self.fork(path, &target, scope),
                _ => trace!(path = %path.display(), "Symlink observed, not counted"),
            }
            return Ok(());
        }

        self.files += 1;
        self.ctx.fail_point(&path)?;
        let metadata = entry.metadata().map_err(|e| WalkError::io(&path, e))?;

        if self.ctx.compute_hashes && file_type.is_file() {
            let threshold = self.ctx.small_file_threshold;
            let state = self
                .digest
                .get_or_insert_with(|| Box::new(DigestState::new(threshold)));
            let digest = state.digest(&path, metadata.len())?;
            if self.ctx.print_digests {
                println!("{digest} {}", path.display());
            }
        } else {
            std::hint::black_box(metadata.modified().ok());
        }

        Ok(())
    }

    fn fork<'scope>(&mut self, dir: PathBuf, metadata: &Metadata, scope: &Scope<'scope>)
    where
        'ctx: 'scope,
    {
        if self.ctx.filter.should_skip(&dir) {
            trace!(dir = %dir.display(), "Skipping excluded directory");
            return;
        }

        let depth = self.ancestry.depth() + 1;
        if self.ctx.max_depth.is_some_and(|max| depth > max) {
            trace!(dir = %dir.display(), depth, "Skipping directory below max depth");
            return;
        }

        let identity = dir_identity(&dir, metadata);
        if self.ancestry.contains(&identity) {
            warn!(dir = %dir.display(), "Symlink cycle detected, not descending");
            return;
        }

        let mut child = WalkTask::new(dir.clone(), self.ctx, self.ancestry.child(identity));
        let slot: ChildSlot = Arc::new(OnceLock::new());
        let child_slot = Arc::clone(&slot);

        scope.spawn(move |_| {
            let _ = child_slot.set(child.run());
        });

        self.children.push(ChildHandle { dir, slot });
    }

    fn fold_children(&mut self) {
        for child in self.children.drain(..) {
            match child.slot.get() {
                Some(Ok(count)) => self.files += count,
                Some(Err(err)) => {
                    error!(dir = %child.dir.display(), error = %err, "Subtree failed, counting zero files");
                }
                None => {
                    error!(dir = %child.dir.display(), "Subtree never reported, counting zero files");
                }
            }
        }
    }

    fn set_state(&mut self, next: TaskState) {
        trace!(dir = %self.dir.display(), from = ?self.state, to = ?next, "Task state");
        self.state = next;
    }
}
