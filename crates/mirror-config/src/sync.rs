//! Correlation and replay tuning.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of recent git commits compared during correlation.
const fn default_lookback() -> usize {
    50
}

/// Default number of revisions below the window end fetched per svn log call.
const fn default_window() -> u64 {
    10
}

fn default_author_path() -> PathBuf {
    PathBuf::from("authors.txt")
}

/// Which time a replayed commit carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// The svn revision date, shown in the system time zone.
    #[default]
    Preserve,
    /// Whatever time the commit is created at.
    CommitTime,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSettings {
    /// Author table, `identity = Display Name <contact>` per line.
    #[serde(default = "default_author_path")]
    pub author_path: PathBuf,

    #[serde(default = "default_lookback")]
    pub lookback: usize,

    #[serde(default = "default_window")]
    pub window: u64,

    #[serde(default)]
    pub timestamps: TimestampPolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            author_path: default_author_path(),
            lookback: default_lookback(),
            window: default_window(),
            timestamps: TimestampPolicy::default(),
        }
    }
}

impl SyncSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.lookback".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.window".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
