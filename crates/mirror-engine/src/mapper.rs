//! Translation between svn paths, git paths and the mirror-relative namespace
//! both are compared in.
//!
//! A mirror-relative path is the part below the mirrored subpath, e.g.
//! `/app/trunk/lib/a.c` and `lib/a.c` are both `a.c` for a `lib` subpath.

use mirror_core::layout::{join_segments, normalize};
use mirror_core::{PathMode, ProjectLayout};

use crate::error::SyncError;

#[derive(Debug, Clone)]
pub struct PathMapper<'a> {
    layout: &'a ProjectLayout,
    branch_prefix: String,
    old_prefix: String,
    svn_path: String,
    git_prefixes: Vec<String>,
}

impl<'a> PathMapper<'a> {
    #[must_use]
    pub fn new(layout: &'a ProjectLayout) -> Self {
        Self {
            layout,
            branch_prefix: layout.branch_prefix(),
            old_prefix: layout
                .old_path_prefix
                .as_deref()
                .map(normalize)
                .unwrap_or_default(),
            svn_path: normalize(&layout.svn_path),
            git_prefixes: layout.target_history_paths(),
        }
    }

    #[must_use]
    pub const fn layout(&self) -> &ProjectLayout {
        self.layout
    }

    /// Git prefixes the target history is read from; empty for the whole repository.
    #[must_use]
    pub fn target_prefixes(&self) -> &[String] {
        &self.git_prefixes
    }

    /// Mirror-relative form of a repository-absolute svn path.
    ///
    /// The path must lie under the branch prefix, optionally followed by the
    /// old path prefix, then the svn subpath. Returns `None` otherwise, and for
    /// the subtree root itself.
    #[must_use]
    pub fn source_relative(&self, raw: &str) -> Option<String> {
        let below_branch = strip_segment_prefix(raw.trim_end_matches('/'), &self.branch_prefix)?;
        let below_branch = below_branch.trim_start_matches('/');

        let below_old = if self.old_prefix.is_empty() {
            below_branch
        } else {
            strip_segment_prefix(below_branch, &self.old_prefix)
                .map_or(below_branch, |rest| rest.trim_start_matches('/'))
        };

        let relative = if self.svn_path.is_empty() {
            below_old
        } else {
            strip_segment_prefix(below_old, &self.svn_path)?.trim_start_matches('/')
        };
        non_empty(relative)
    }

    /// Mirror-relative form of a git path, under any recognised prefix.
    #[must_use]
    pub fn target_relative(&self, path: &str) -> Option<String> {
        let path = path.trim_matches('/');
        if self.git_prefixes.is_empty() {
            return non_empty(path);
        }
        self.git_prefixes.iter().find_map(|prefix| {
            strip_segment_prefix(path, prefix).and_then(|rest| non_empty(rest.trim_start_matches('/')))
        })
    }

    /// Git subpath replayed revisions are written under.
    ///
    /// In dual-path mode `exists` is asked which of the two subpaths is on
    /// disk: the git subpath wins when neither is, and both at once is an error.
    pub fn target_base(&self, exists: impl Fn(&str) -> bool) -> Result<String, SyncError> {
        let git_path = normalize(&self.layout.git_path);
        if self.layout.mode() == PathMode::Single || git_path.is_empty() || self.svn_path.is_empty()
        {
            return Ok(git_path);
        }

        match (exists(&git_path), exists(&self.svn_path)) {
            (true, true) => Err(SyncError::AmbiguousLayout {
                project: self.layout.name.clone(),
                svn_path: self.svn_path.clone(),
                git_path,
            }),
            (false, true) => Ok(self.svn_path.clone()),
            _ => Ok(git_path),
        }
    }

    /// Working-tree path of a mirror-relative path under `base`.
    #[must_use]
    pub fn target_path(base: &str, relative: &str) -> String {
        join_segments(&[base, relative])
    }
}

/// `path` with `prefix` removed, if `prefix` covers whole segments of it.
fn strip_segment_prefix<'p>(path: &'p str, prefix: &str) -> Option<&'p str> {
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

fn non_empty(path: &str) -> Option<String> {
    (!path.is_empty()).then(|| path.to_string())
}
