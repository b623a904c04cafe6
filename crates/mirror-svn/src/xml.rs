//! Decoding of `svn log --xml` and `svn info --xml`.

use chrono::{DateTime, Utc};
use mirror_core::{ChangeKind, ChangedPath, NodeKind, SourceInfo, SourceRevision};
use serde::Deserialize;

use crate::error::SvnError;

#[derive(Debug, Deserialize)]
struct LogDocument {
    #[serde(rename = "logentry", default)]
    entries: Vec<LogEntry>,
}

#[derive(Debug, Deserialize)]
struct LogEntry {
    #[serde(rename = "@revision")]
    revision: u64,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    paths: Option<PathList>,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PathList {
    #[serde(rename = "path", default)]
    items: Vec<PathEntry>,
}

#[derive(Debug, Deserialize)]
struct PathEntry {
    #[serde(rename = "@action")]
    action: String,
    #[serde(rename = "@kind", default)]
    kind: String,
    #[serde(rename = "$text", default)]
    path: String,
}

#[derive(Debug, Deserialize)]
struct InfoDocument {
    entry: InfoEntry,
}

#[derive(Debug, Deserialize)]
struct InfoEntry {
    #[serde(rename = "@revision")]
    revision: u64,
    #[serde(default)]
    commit: Option<InfoCommit>,
}

#[derive(Debug, Deserialize)]
struct InfoCommit {
    #[serde(rename = "@revision")]
    revision: u64,
}

/// Parse a log document into revisions, oldest first.
pub fn parse_log(xml: &str) -> Result<Vec<SourceRevision>, SvnError> {
    let document: LogDocument = quick_xml::de::from_str(xml)?;
    let mut revisions = document
        .entries
        .into_iter()
        .map(into_revision)
        .collect::<Result<Vec<_>, _>>()?;
    revisions.sort_by_key(|r| r.revision);
    Ok(revisions)
}

pub fn parse_info(xml: &str) -> Result<SourceInfo, SvnError> {
    let document: InfoDocument = quick_xml::de::from_str(xml)?;
    let entry = document.entry;
    Ok(SourceInfo {
        revision: entry.revision,
        last_changed_revision: entry.commit.map_or(entry.revision, |c| c.revision),
    })
}

fn into_revision(entry: LogEntry) -> Result<SourceRevision, SvnError> {
    let revision = entry.revision;
    let date = match entry.date.as_deref() {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map_err(|source| SvnError::Date {
                revision,
                value: value.to_string(),
                source,
            })?
            .with_timezone(&Utc),
        None => {
            tracing::warn!(revision, "revision has no date");
            DateTime::UNIX_EPOCH
        }
    };

    let changed_paths = entry
        .paths
        .map(|list| list.items)
        .unwrap_or_default()
        .into_iter()
        .map(|item| {
            let change = item
                .action
                .parse::<ChangeKind>()
                .map_err(|source| SvnError::ChangedPath { revision, source })?;
            Ok(ChangedPath::new(item.path, change, NodeKind::from_svn(&item.kind)))
        })
        .collect::<Result<Vec<_>, SvnError>>()?;

    Ok(SourceRevision {
        revision,
        author: entry.author.unwrap_or_default(),
        message: entry.msg.unwrap_or_default(),
        date,
        changed_paths,
    })
}
