//! Git client configuration.

use serde::{Deserialize, Serialize};

fn default_binary() -> String {
    "git".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitConfig {
    /// `git` executable used for checkout, staging and commits.
    #[serde(default = "default_binary")]
    pub binary: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
        }
    }
}
