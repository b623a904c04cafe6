//! # mirror-core
//!
//! Core types shared by every svnmirror crate:
//! - Source revisions and their changed paths (`revision`)
//! - Target commits, signatures and commit requests (`commit`)
//! - Project/branch layouts describing how an svn subtree maps onto a git subtree (`layout`)
//! - The author table (`authors`)
//! - The read/write traits the engine drives both VCS backends through (`vcs`)
//! - Cross-cutting error types (`errors`)

pub mod authors;
pub mod commit;
pub mod errors;
pub mod layout;
pub mod revision;
pub mod vcs;

pub use authors::AuthorDirectory;
pub use commit::{CommitRequest, Signature, TargetCommit};
pub use errors::CoreError;
pub use layout::{PathMode, ProjectLayout, SvnBranch};
pub use revision::{ChangeKind, ChangedPath, NodeKind, RevisionNumber, SourceInfo, SourceRevision};
pub use vcs::{SourceRepository, TargetRepository};
