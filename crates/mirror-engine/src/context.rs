use mirror_config::SyncSettings;
use mirror_core::{AuthorDirectory, RevisionNumber, Signature};

use crate::error::SyncError;

/// Everything a run shares across layouts. Built once, then borrowed.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub authors: AuthorDirectory,
    pub settings: SyncSettings,
}

impl RunContext {
    #[must_use]
    pub const fn new(authors: AuthorDirectory, settings: SyncSettings) -> Self {
        Self { authors, settings }
    }

    /// Git identity of an svn user, or [`SyncError::UnknownAuthor`].
    pub fn resolve_author(
        &self,
        identity: &str,
        revision: RevisionNumber,
    ) -> Result<&Signature, SyncError> {
        self.authors
            .resolve(identity)
            .ok_or_else(|| SyncError::UnknownAuthor {
                identity: identity.to_string(),
                revision,
            })
    }
}
