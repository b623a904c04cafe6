//! # mirror-git
//!
//! The git side of svnmirror.
//!
//! Uses `gix` (pure Rust git implementation) for:
//! - Repository discovery
//! - Rev-walks over recent history
//! - Tree-to-tree diffs against the first parent
//!
//! and the `git` executable for checkout, staging and commits.
//!
//! This crate isolates the `gix` dependency from the rest of the workspace,
//! so compile time impact is limited to this crate only.

mod command;
mod error;
mod repo;

pub use error::GitError;
pub use repo::GitRepository;
