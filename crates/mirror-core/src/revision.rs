//! Source-side history: one svn revision and the paths it touched.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// svn revision numbers are monotonic and never negative.
pub type RevisionNumber = u64;

/// What happened to a path in a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl FromStr for ChangeKind {
    type Err = CoreError;

    /// Parse an svn action code. A replacement (`R`) is a delete followed by
    /// an add of the same path, so replaying it as an add yields the same tree.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "R" => Ok(Self::Added),
            "M" => Ok(Self::Modified),
            "D" => Ok(Self::Deleted),
            other => Err(CoreError::UnknownAction(other.to_string())),
        }
    }
}

/// Node type of a changed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Directory,
    /// Older servers report no kind; such paths cannot be replayed.
    Unknown,
}

impl NodeKind {
    /// Map the `kind` attribute of `svn log --xml`.
    #[must_use]
    pub fn from_svn(kind: &str) -> Self {
        match kind {
            "file" => Self::File,
            "dir" => Self::Directory,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedPath {
    /// Repository-absolute path, e.g. `/app/trunk/src/lib.c`.
    pub path: String,
    pub change: ChangeKind,
    pub node: NodeKind,
}

impl ChangedPath {
    #[must_use]
    pub fn new(path: impl Into<String>, change: ChangeKind, node: NodeKind) -> Self {
        Self {
            path: path.into(),
            change,
            node,
        }
    }
}

/// One source revision as reported by the svn log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRevision {
    pub revision: RevisionNumber,
    /// svn identity; empty when the revision has no author.
    pub author: String,
    pub message: String,
    pub date: DateTime<Utc>,
    /// Changed paths in the order the server reported them.
    pub changed_paths: Vec<ChangedPath>,
}

/// Result of `svn info` on a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Repository revision the info was taken at (HEAD for URLs).
    pub revision: RevisionNumber,
    /// Last revision that changed the path.
    pub last_changed_revision: RevisionNumber,
}
