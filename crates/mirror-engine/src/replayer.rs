//! Replaying one svn revision as one git commit.
//!
//! A revision is planned first (filter, map, collision check), the author is
//! resolved next, and only then is the working tree touched.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Local;
use mirror_config::TimestampPolicy;
use mirror_core::{
    ChangeKind, CommitRequest, NodeKind, RevisionNumber, SourceRepository, SourceRevision,
    TargetCommit, TargetRepository,
};
use serde::Serialize;

use crate::context::RunContext;
use crate::error::SyncError;
use crate::mapper::PathMapper;

/// What to do with one target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Action {
    Remove,
    CreateDir,
    WriteFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    pub action: Action,
    /// Repository-absolute svn path.
    pub source: String,
    /// Path relative to the git working tree.
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayPlan {
    pub revision: RevisionNumber,
    /// Removals first, then directories, then files; each group by target path.
    pub changes: Vec<PlannedChange>,
}

impl ReplayPlan {
    /// Whether applying the plan stages anything.
    #[must_use]
    pub fn stages(&self) -> bool {
        self.changes.iter().any(|c| c.action != Action::CreateDir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No changed path survives mapping and filtering.
    NothingToReplay,
    /// Changes were applied but the staged tree equals `HEAD`.
    NoEffectiveChange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    Committed {
        revision: RevisionNumber,
        commit: TargetCommit,
    },
    Skipped {
        revision: RevisionNumber,
        reason: SkipReason,
    },
}

impl ReplayOutcome {
    #[must_use]
    pub const fn revision(&self) -> RevisionNumber {
        match self {
            Self::Committed { revision, .. } | Self::Skipped { revision, .. } => *revision,
        }
    }
}

/// Filter and map the changed paths of `revision` onto the working tree.
///
/// `exists` probes working-tree-relative paths for dual-path layouts.
pub fn plan(
    mapper: &PathMapper<'_>,
    revision: &SourceRevision,
    exists: impl Fn(&str) -> bool,
) -> Result<ReplayPlan, SyncError> {
    let layout = mapper.layout();
    let mut by_target: BTreeMap<String, PlannedChange> = BTreeMap::new();
    let mut base: Option<String> = None;

    for changed in &revision.changed_paths {
        let Some(relative) = mapper.source_relative(&changed.path) else {
            tracing::trace!(path = %changed.path, "outside mirrored subtree");
            continue;
        };
        if !layout.accepts(&relative) {
            tracing::trace!(path = %changed.path, "filtered out");
            continue;
        }

        let action = match (changed.change, changed.node) {
            (ChangeKind::Deleted, _) => Action::Remove,
            (ChangeKind::Added | ChangeKind::Modified, NodeKind::Directory) => Action::CreateDir,
            (ChangeKind::Added | ChangeKind::Modified, NodeKind::File) => Action::WriteFile,
            (ChangeKind::Added | ChangeKind::Modified, NodeKind::Unknown) => {
                tracing::warn!(
                    revision = revision.revision,
                    path = %changed.path,
                    "unsupported node kind, path skipped"
                );
                continue;
            }
        };

        if base.is_none() {
            base = Some(mapper.target_base(&exists)?);
        }
        let target = PathMapper::target_path(base.as_deref().unwrap_or_default(), &relative);

        // A move between the old and current prefix deletes and adds the same
        // target; the addition wins.
        if let Some(previous) = by_target.get(&target) {
            match (previous.action, action) {
                (_, Action::Remove) => continue,
                (Action::Remove, _) => {}
                _ => {
                    return Err(SyncError::PathCollision {
                        revision: revision.revision,
                        target,
                        first: previous.source.clone(),
                        second: changed.path.clone(),
                    });
                }
            }
        }
        by_target.insert(
            target.clone(),
            PlannedChange {
                action,
                source: changed.path.clone(),
                target,
            },
        );
    }

    let mut changes = by_target.into_values().collect::<Vec<_>>();
    changes.sort_by(|a, b| a.action.cmp(&b.action).then_with(|| a.target.cmp(&b.target)));
    Ok(ReplayPlan {
        revision: revision.revision,
        changes,
    })
}

/// Replay `revision` onto the working tree of `target`, committing once if
/// anything changed.
pub fn replay<S, T>(
    ctx: &RunContext,
    mapper: &PathMapper<'_>,
    source: &S,
    target: &mut T,
    revision: &SourceRevision,
) -> Result<ReplayOutcome, SyncError>
where
    S: SourceRepository,
    T: TargetRepository,
{
    let work_dir = target.work_dir().to_path_buf();
    let plan = plan(mapper, revision, |path| work_dir.join(path).exists())?;

    if !plan.stages() {
        apply_directories(&work_dir, &plan)?;
        tracing::debug!(revision = revision.revision, "nothing to replay");
        return Ok(ReplayOutcome::Skipped {
            revision: revision.revision,
            reason: SkipReason::NothingToReplay,
        });
    }

    let author = ctx
        .resolve_author(&revision.author, revision.revision)?
        .clone();

    for change in &plan.changes {
        match change.action {
            Action::Remove => {
                tracing::debug!(path = %change.target, "remove");
                target.stage_remove(&change.target).map_err(SyncError::git)?;
            }
            Action::CreateDir => create_dir(&work_dir.join(&change.target))?,
            Action::WriteFile => {
                tracing::debug!(path = %change.target, "write");
                let full = work_dir.join(&change.target);
                if let Some(parent) = full.parent() {
                    create_dir(parent)?;
                }
                let bytes = source
                    .fetch_file(&change.source, revision.revision)
                    .map_err(SyncError::svn)?;
                std::fs::write(&full, bytes).map_err(|e| SyncError::io(&full, e))?;
                target.stage_add(&change.target).map_err(SyncError::git)?;
            }
        }
    }

    if !target.has_staged_changes().map_err(SyncError::git)? {
        tracing::warn!(revision = revision.revision, "revision left the tree unchanged, no commit");
        return Ok(ReplayOutcome::Skipped {
            revision: revision.revision,
            reason: SkipReason::NoEffectiveChange,
        });
    }

    let timestamp = match ctx.settings.timestamps {
        TimestampPolicy::Preserve => Some(revision.date.with_timezone(&Local).fixed_offset()),
        TimestampPolicy::CommitTime => None,
    };
    let request = CommitRequest {
        author: author.clone(),
        committer: author,
        message: revision.message.clone(),
        timestamp,
    };
    let commit = target.commit(&request).map_err(SyncError::git)?;
    tracing::info!(
        revision = revision.revision,
        commit = %commit.short_id(),
        author = %request.author,
        "revision replayed"
    );
    Ok(ReplayOutcome::Committed {
        revision: revision.revision,
        commit,
    })
}

fn apply_directories(work_dir: &Path, plan: &ReplayPlan) -> Result<(), SyncError> {
    plan.changes
        .iter()
        .filter(|c| c.action == Action::CreateDir)
        .try_for_each(|c| create_dir(&work_dir.join(&c.target)))
}

fn create_dir(path: &Path) -> Result<(), SyncError> {
    std::fs::create_dir_all(path).map_err(|e| SyncError::io(path, e))
}
