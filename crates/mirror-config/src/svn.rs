//! Subversion client configuration.

use serde::{Deserialize, Serialize};

fn default_binary() -> String {
    "svn".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SvnConfig {
    /// Repository root URL (e.g., `https://svn.example.org/repos`).
    #[serde(default)]
    pub root: String,

    /// `svn` executable to run.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Passed as `--username` when set.
    #[serde(default)]
    pub username: String,

    /// Passed as `--password` when set. Prefer `SVNMIRROR_SVN__PASSWORD`.
    #[serde(default)]
    pub password: String,
}

impl Default for SvnConfig {
    fn default() -> Self {
        Self {
            root: String::new(),
            binary: default_binary(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl SvnConfig {
    pub fn is_configured(&self) -> bool {
        !self.root.trim().is_empty()
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}
