//! Per-project mirror configuration and its expansion into layouts.

use std::path::PathBuf;

use mirror_core::{ProjectLayout, SvnBranch};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_svn_branches() -> Vec<String> {
    vec!["trunk".to_string()]
}

fn default_filter() -> String {
    ".*".to_string()
}

const fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectConfig {
    /// Top-level svn directory of the project.
    #[serde(default)]
    pub svn_project: String,

    /// Mirrored subtree inside each svn branch.
    #[serde(default)]
    pub svn_path: String,

    /// `trunk` or names under `branches/`.
    #[serde(default = "default_svn_branches")]
    pub svn_branches: Vec<String>,

    /// Git working tree root.
    #[serde(default)]
    pub git_project: PathBuf,

    /// Mirrored subtree inside the git repository.
    #[serde(default)]
    pub git_path: String,

    /// Git branches paired by position with `svn_branches`. Empty keeps the
    /// currently checked out branch.
    #[serde(default)]
    pub git_branches: Vec<String>,

    /// Legacy segment between the svn branch and the subpath.
    #[serde(default)]
    pub old_path_prefix: String,

    /// Regular expression over mirror-relative paths.
    #[serde(default = "default_filter")]
    pub filter: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            svn_project: String::new(),
            svn_path: String::new(),
            svn_branches: default_svn_branches(),
            git_project: PathBuf::new(),
            git_path: String::new(),
            git_branches: Vec::new(),
            old_path_prefix: String::new(),
            filter: default_filter(),
            enabled: default_enabled(),
        }
    }
}

impl ProjectConfig {
    /// One layout per svn branch, in configuration order.
    pub fn layouts(&self, key: &str) -> Result<Vec<ProjectLayout>, ConfigError> {
        if self.git_project.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("projects.{key}.git_project"),
                reason: "must name the git working tree".to_string(),
            });
        }
        if self.svn_branches.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("projects.{key}.svn_branches"),
                reason: "must list at least one branch".to_string(),
            });
        }
        if !self.git_branches.is_empty() && self.git_branches.len() != self.svn_branches.len() {
            return Err(ConfigError::InvalidValue {
                field: format!("projects.{key}.git_branches"),
                reason: format!(
                    "{} git branches for {} svn branches",
                    self.git_branches.len(),
                    self.svn_branches.len()
                ),
            });
        }

        let filter = ProjectLayout::compile_filter(&self.filter)?;
        let svn_project = if self.svn_project.is_empty() {
            key.to_string()
        } else {
            self.svn_project.trim_matches('/').to_string()
        };
        let old_path_prefix = Some(self.old_path_prefix.trim_matches('/'))
            .filter(|prefix| !prefix.is_empty())
            .map(ToString::to_string);

        self.svn_branches
            .iter()
            .enumerate()
            .map(|(index, branch)| {
                let svn_branch = SvnBranch::parse(branch);
                let layout = ProjectLayout {
                    name: format!("{key}[{svn_branch}]"),
                    svn_project: svn_project.clone(),
                    svn_path: self.svn_path.trim_matches('/').to_string(),
                    svn_branch,
                    old_path_prefix: old_path_prefix.clone(),
                    git_root: self.git_project.clone(),
                    git_path: self.git_path.trim_matches('/').to_string(),
                    git_branch: self
                        .git_branches
                        .get(index)
                        .map(|b| b.trim().to_string())
                        .filter(|b| !b.is_empty()),
                    filter: filter.clone(),
                };
                layout.validate()?;
                Ok(layout)
            })
            .collect()
    }
}
