use std::path::PathBuf;

use mirror_core::RevisionNumber;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures that abort one project/branch layout.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An svn identity with no author table entry reached a commit comparison
    /// or a commit.
    #[error("no author mapping for svn user '{identity}' (revision r{revision})")]
    UnknownAuthor {
        identity: String,
        revision: RevisionNumber,
    },

    /// History was walked back to revision 0 without a match.
    #[error("no svn revision of '{project}' matches the recent git history (searched r0..=r{head})")]
    CorrelationExhausted {
        project: String,
        head: RevisionNumber,
    },

    /// The git branch holds no commit under the mirrored paths.
    #[error("git history of '{project}' has no commit under {paths:?}")]
    NoTargetHistory { project: String, paths: Vec<String> },

    /// Both the old and the new subpath exist in the working tree.
    #[error("both '{svn_path}' and '{git_path}' exist in the working tree of '{project}'")]
    AmbiguousLayout {
        project: String,
        svn_path: String,
        git_path: String,
    },

    /// Two source paths of one revision map onto the same target path.
    #[error("r{revision}: '{first}' and '{second}' both map to '{target}'")]
    PathCollision {
        revision: RevisionNumber,
        target: String,
        first: String,
        second: String,
    },

    #[error("svn: {0}")]
    Source(#[source] BoxError),

    #[error("git: {0}")]
    Target(#[source] BoxError),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub fn svn<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Source(Box::new(error))
    }

    pub fn git<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Target(Box::new(error))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
