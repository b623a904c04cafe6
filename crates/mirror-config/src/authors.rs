//! Author table loading.

use std::path::Path;

use mirror_core::AuthorDirectory;

use crate::error::ConfigError;

/// Read and parse the author table at `path`.
pub fn load_authors(path: &Path) -> Result<AuthorDirectory, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::AuthorTable {
        path: path.to_path_buf(),
        source,
    })?;
    let authors = AuthorDirectory::parse(&content);
    tracing::debug!(path = %path.display(), count = authors.len(), "author table loaded");
    Ok(authors)
}
