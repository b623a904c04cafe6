//! # mirror-svn
//!
//! Subversion read access for svnmirror.
//!
//! Runs the `svn` command-line client with `--xml` output and decodes it with
//! `quick-xml`. Only the read primitives the correlator and replayer need are
//! exposed, through [`mirror_core::SourceRepository`].

mod client;
mod error;
mod xml;

pub use client::SvnClient;
pub use error::SvnError;
