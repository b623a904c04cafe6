//! Read/write primitives the engine needs from each VCS.
//!
//! All calls block. Implementations own their transport; the engine never
//! retries a failed call.

use std::collections::BTreeSet;
use std::path::Path;

use crate::commit::{CommitRequest, TargetCommit};
use crate::revision::{RevisionNumber, SourceInfo, SourceRevision};

/// Read side of the svn repository, rooted at the mirrored subtree.
pub trait SourceRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `svn info` on a path relative to the subtree (`""` is the subtree).
    fn info(&self, path: &str) -> Result<SourceInfo, Self::Error>;

    /// Current head revision of the repository.
    fn head_revision(&self) -> Result<RevisionNumber, Self::Error> {
        self.info("").map(|info| info.revision)
    }

    /// Revisions in `start..=end` touching any of `paths` (relative to the
    /// subtree), oldest first, with changed paths and stop-on-copy.
    fn log(
        &self,
        paths: &[&str],
        start: RevisionNumber,
        end: RevisionNumber,
    ) -> Result<Vec<SourceRevision>, Self::Error>;

    /// Content of a repository-absolute file path at a revision.
    fn fetch_file(&self, path: &str, revision: RevisionNumber) -> Result<Vec<u8>, Self::Error>;
}

/// Read/write side of the git working tree.
pub trait TargetRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Root of the working tree; paths handed to the stage calls are relative to it.
    fn work_dir(&self) -> &Path;

    /// Up to `max_count` commits reachable from `HEAD` that touch any of
    /// `paths` (all commits when empty), most recent first.
    fn log(&self, paths: &[String], max_count: usize) -> Result<Vec<TargetCommit>, Self::Error>;

    /// File paths changed by `commit` relative to its first parent. Deletions
    /// and the source side of renames are reported at their old location.
    fn changed_paths(&self, commit: &TargetCommit) -> Result<BTreeSet<String>, Self::Error>;

    fn checkout(&mut self, branch: &str) -> Result<(), Self::Error>;

    /// Stage the working-tree state of `path`.
    fn stage_add(&mut self, path: &str) -> Result<(), Self::Error>;

    /// Remove `path` (recursively) from the index and the working tree.
    fn stage_remove(&mut self, path: &str) -> Result<(), Self::Error>;

    /// Whether the index differs from `HEAD`.
    fn has_staged_changes(&self) -> Result<bool, Self::Error>;

    fn commit(&mut self, request: &CommitRequest) -> Result<TargetCommit, Self::Error>;
}
