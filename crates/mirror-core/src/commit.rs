//! Target-side history: git commits and the request used to create one.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A git identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
}

impl Signature {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// A commit already recorded in the target repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCommit {
    /// Full hex object id.
    pub id: String,
    pub parents: Vec<String>,
    pub author: Signature,
    pub message: String,
}

impl TargetCommit {
    #[must_use]
    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    /// Abbreviated id for log output.
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.id.get(..10).unwrap_or(&self.id)
    }
}

/// Everything the target needs to record one replayed revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
    /// `None` lets the target stamp the commit with the current time.
    pub timestamp: Option<DateTime<FixedOffset>>,
}
