//! # mirror-config
//!
//! Layered configuration loading for svnmirror using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SVNMIRROR_*` prefix, `__` as separator)
//! 2. The file passed with `--config`, otherwise `./svnmirror.toml`
//! 3. User-level `~/.config/svnmirror/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SVNMIRROR_SVN__PASSWORD` -> `svn.password`,
//! `SVNMIRROR_PROJECTS__APP__FILTER` -> `projects.app.filter`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use mirror_config::MirrorConfig;
//!
//! let config = MirrorConfig::load_with_dotenv(None).expect("config");
//! for layout in config.layouts(&[]).expect("layouts") {
//!     println!("{} <- {}", layout.name, layout.svn_subtree());
//! }
//! ```

mod authors;
mod error;
mod git;
mod project;
mod svn;
mod sync;

pub use authors::load_authors;
pub use error::ConfigError;
pub use git::GitConfig;
pub use project::ProjectConfig;
pub use svn::SvnConfig;
pub use sync::{SyncSettings, TimestampPolicy};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use mirror_core::ProjectLayout;
use serde::{Deserialize, Serialize};

/// Project-local configuration file name.
pub const LOCAL_CONFIG_FILE: &str = "svnmirror.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub svn: SvnConfig,
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfig>,
}

impl MirrorConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path
            && !path.exists()
        {
            return Err(ConfigError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        Self::figment(config_path)
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load `.env` from the current directory, then [`Self::load`].
    pub fn load_with_dotenv(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(config_path)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Explicit or project-local config
        let local_path = config_path.map_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE), Path::to_path_buf);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("SVNMIRROR_").split("__"))
    }

    /// Expand the configured projects into layouts, in project-name order.
    ///
    /// With an empty `selected`, every enabled project is returned; otherwise
    /// exactly the named projects, enabled or not.
    pub fn layouts(&self, selected: &[String]) -> Result<Vec<ProjectLayout>, ConfigError> {
        if !self.svn.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "svn".to_string(),
            });
        }
        if self.projects.is_empty() {
            return Err(ConfigError::NotConfigured {
                section: "projects".to_string(),
            });
        }
        self.sync.validate()?;

        if let Some(unknown) = selected.iter().find(|name| !self.projects.contains_key(*name)) {
            return Err(ConfigError::InvalidValue {
                field: "project".to_string(),
                reason: format!("no project named '{unknown}'"),
            });
        }

        let mut layouts = Vec::new();
        for (key, project) in &self.projects {
            let wanted = if selected.is_empty() {
                project.enabled
            } else {
                selected.contains(key)
            };
            if !wanted {
                tracing::debug!(project = %key, "project skipped");
                continue;
            }
            layouts.extend(project.layouts(key)?);
        }
        Ok(layouts)
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("svnmirror").join("config.toml"))
    }
}
