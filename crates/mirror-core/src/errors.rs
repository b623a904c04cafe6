//! Cross-cutting error types for svnmirror.
//!
//! Backend failures (`SvnError`, `GitError`) and run failures (`SyncError`)
//! live in their own crates. This module only covers what the core types can
//! reject on their own.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// An svn changed-path action code outside `A`, `M`, `D`, `R`.
    #[error("Unknown change action '{0}'")]
    UnknownAction(String),

    /// A layout field failed validation.
    #[error("Invalid layout for '{project}': {reason}")]
    InvalidLayout { project: String, reason: String },

    /// The path filter is not a valid regular expression.
    #[error("Invalid filter '{pattern}': {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
