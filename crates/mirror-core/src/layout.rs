//! Project/branch layout: how one svn subtree maps onto one git subtree.

use std::fmt;
use std::path::PathBuf;

use regex::Regex;

use crate::errors::CoreError;

/// svn branch of a project. `trunk` is the unbranched root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SvnBranch {
    Trunk,
    Named(String),
}

impl SvnBranch {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "" | "trunk" => Self::Trunk,
            other => Self::Named(other.to_string()),
        }
    }

    /// Directory of the branch inside the svn project.
    #[must_use]
    pub fn prefix(&self) -> String {
        match self {
            Self::Trunk => "trunk".to_string(),
            Self::Named(name) => format!("branches/{name}"),
        }
    }
}

impl fmt::Display for SvnBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trunk => f.write_str("trunk"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Whether the mirrored subtree has the same name on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    /// One fixed git subpath.
    Single,
    /// The git subpath is a rename of the svn subpath and either may be on disk.
    Dual,
}

/// Immutable for a run. Paths are stored without leading or trailing slashes.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Display name, `project[branch]`.
    pub name: String,
    pub svn_project: String,
    pub svn_path: String,
    pub svn_branch: SvnBranch,
    /// Legacy segment between the branch and the subpath.
    pub old_path_prefix: Option<String>,
    /// Root of the git working tree.
    pub git_root: PathBuf,
    pub git_path: String,
    /// Branch to check out before correlating; `None` keeps the current one.
    pub git_branch: Option<String>,
    /// Evaluated against mirror-relative paths.
    pub filter: Regex,
}

impl ProjectLayout {
    /// Compile a path filter.
    pub fn compile_filter(pattern: &str) -> Result<Regex, CoreError> {
        Regex::new(pattern).map_err(|source| CoreError::InvalidFilter {
            pattern: pattern.to_string(),
            source,
        })
    }

    /// Check field invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.svn_project.trim_matches('/').is_empty() {
            return Err(CoreError::InvalidLayout {
                project: self.name.clone(),
                reason: "svn_project must not be empty".to_string(),
            });
        }
        match &self.svn_branch {
            SvnBranch::Named(name) if name.contains('/') => Err(CoreError::InvalidLayout {
                project: self.name.clone(),
                reason: format!("branch name '{name}' must be a single path segment"),
            }),
            _ => Ok(()),
        }
    }

    #[must_use]
    pub fn mode(&self) -> PathMode {
        if normalize(&self.svn_path) == normalize(&self.git_path) {
            PathMode::Single
        } else {
            PathMode::Dual
        }
    }

    /// Repository-absolute prefix of the branch, e.g. `/app/trunk`.
    #[must_use]
    pub fn branch_prefix(&self) -> String {
        format!(
            "/{}",
            join_segments(&[&self.svn_project, &self.svn_branch.prefix()])
        )
    }

    /// Repository-relative path of the mirrored svn subtree.
    #[must_use]
    pub fn svn_subtree(&self) -> String {
        join_segments(&[
            &self.svn_project,
            &self.svn_branch.prefix(),
            self.old_path_prefix.as_deref().unwrap_or_default(),
            &self.svn_path,
        ])
    }

    /// Git prefixes under which mirrored history may be found, current first.
    ///
    /// An empty result means the whole repository is mirrored.
    #[must_use]
    pub fn target_history_paths(&self) -> Vec<String> {
        let current = normalize(&self.git_path);
        let previous = match self.mode() {
            PathMode::Single => self
                .old_path_prefix
                .as_deref()
                .map(|prefix| join_segments(&[prefix, &current]))
                .unwrap_or_default(),
            PathMode::Dual => normalize(&self.svn_path),
        };
        if current.is_empty() || (self.mode() == PathMode::Dual && previous.is_empty()) {
            return Vec::new();
        }
        let mut paths = vec![current];
        if !previous.is_empty() && !paths.contains(&previous) {
            paths.push(previous);
        }
        paths
    }

    /// Whether a mirror-relative path passes the filter.
    #[must_use]
    pub fn accepts(&self, relative: &str) -> bool {
        self.filter.is_match(relative)
    }
}

/// Strip leading and trailing slashes.
#[must_use]
pub fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// Join path segments with `/`, skipping empty ones.
#[must_use]
pub fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
