//! Driving layouts end to end: checkout, correlate, replay.

use std::collections::BTreeSet;
use std::path::PathBuf;

use mirror_core::{ProjectLayout, RevisionNumber, SourceRepository, TargetRepository};
use serde::Serialize;

use crate::context::RunContext;
use crate::correlator::correlate;
use crate::error::SyncError;
use crate::mapper::PathMapper;
use crate::replayer::{self, ReplayOutcome, SkipReason};

/// What a run does after correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Replay the backlog.
    Sync,
    /// Report the backlog only.
    Status,
}

/// Opens the two repositories of a layout.
pub trait Backends {
    type Source: SourceRepository;
    type Target: TargetRepository;

    fn open(&self, layout: &ProjectLayout) -> Result<(Self::Source, Self::Target), SyncError>;
}

/// Hooks for progress display. Every method defaults to doing nothing.
pub trait Observer {
    fn backlog(&mut self, _layout: &ProjectLayout, _revisions: usize) {}
    fn replayed(&mut self, _outcome: &ReplayOutcome) {}
    fn finished(&mut self, _report: &LayoutReport) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommittedRevision {
    pub revision: RevisionNumber,
    pub commit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRevision {
    pub revision: RevisionNumber,
    pub reason: SkipReason,
}

/// Result of one layout. Partial on failure: commits made before the
/// failing revision stay recorded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayoutReport {
    pub name: String,
    pub svn_subtree: String,
    pub git_root: PathBuf,
    pub head: Option<RevisionNumber>,
    pub convergence: Option<RevisionNumber>,
    pub convergence_commit: Option<String>,
    pub backlog: Vec<RevisionNumber>,
    pub committed: Vec<CommittedRevision>,
    pub skipped: Vec<SkippedRevision>,
    /// svn users in the backlog without an author mapping (status mode).
    pub missing_authors: Vec<String>,
    pub error: Option<String>,
}

impl LayoutReport {
    fn new(layout: &ProjectLayout) -> Self {
        Self {
            name: layout.name.clone(),
            svn_subtree: layout.svn_subtree(),
            git_root: layout.git_root.clone(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: Mode,
    pub layouts: Vec<LayoutReport>,
}

impl RunSummary {
    #[must_use]
    pub fn failures(&self) -> usize {
        self.layouts.iter().filter(|r| r.failed()).count()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    #[must_use]
    pub fn commits(&self) -> usize {
        self.layouts.iter().map(|r| r.committed.len()).sum()
    }
}

/// Run every layout in order. A failing layout is recorded and the next one
/// still runs.
pub fn run_all<B: Backends>(
    ctx: &RunContext,
    layouts: &[ProjectLayout],
    backends: &B,
    mode: Mode,
    observer: &mut dyn Observer,
) -> RunSummary {
    let mut reports = Vec::with_capacity(layouts.len());
    for layout in layouts {
        let span = tracing::info_span!("project", name = %layout.name);
        let _guard = span.enter();

        let report = match backends.open(layout) {
            Ok((source, mut target)) => {
                sync_layout(ctx, layout, &source, &mut target, mode, observer)
            }
            Err(error) => {
                let mut report = LayoutReport::new(layout);
                record_failure(&mut report, &error);
                report
            }
        };
        observer.finished(&report);
        reports.push(report);
    }
    RunSummary {
        mode,
        layouts: reports,
    }
}

/// Run one layout against already opened repositories.
pub fn sync_layout<S, T>(
    ctx: &RunContext,
    layout: &ProjectLayout,
    source: &S,
    target: &mut T,
    mode: Mode,
    observer: &mut dyn Observer,
) -> LayoutReport
where
    S: SourceRepository,
    T: TargetRepository,
{
    let mut report = LayoutReport::new(layout);
    if let Err(error) = run_layout(ctx, layout, source, target, mode, observer, &mut report) {
        record_failure(&mut report, &error);
    }
    report
}

fn record_failure(report: &mut LayoutReport, error: &SyncError) {
    tracing::error!(%error, "layout aborted");
    report.error = Some(error.to_string());
}

fn run_layout<S, T>(
    ctx: &RunContext,
    layout: &ProjectLayout,
    source: &S,
    target: &mut T,
    mode: Mode,
    observer: &mut dyn Observer,
    report: &mut LayoutReport,
) -> Result<(), SyncError>
where
    S: SourceRepository,
    T: TargetRepository,
{
    if let Some(branch) = &layout.git_branch {
        tracing::debug!(%branch, "checking out");
        target.checkout(branch).map_err(SyncError::git)?;
    }

    let mapper = PathMapper::new(layout);
    let correlation = correlate(ctx, &mapper, source, target)?;
    report.head = Some(correlation.head);
    report.convergence = Some(correlation.convergence);
    report.convergence_commit = Some(correlation.convergence_commit.clone());
    report.backlog = correlation.backlog_revisions();
    observer.backlog(layout, correlation.backlog.len());

    match mode {
        Mode::Status => {
            let work_dir = target.work_dir().to_path_buf();
            let mut missing = BTreeSet::new();
            for revision in &correlation.backlog {
                let plan = replayer::plan(&mapper, revision, |p| work_dir.join(p).exists())?;
                if plan.stages() && ctx.authors.resolve(&revision.author).is_none() {
                    missing.insert(revision.author.clone());
                }
            }
            if !missing.is_empty() {
                tracing::warn!(authors = ?missing, "backlog authors missing from the author table");
            }
            report.missing_authors = missing.into_iter().collect();
        }
        Mode::Sync => {
            for revision in &correlation.backlog {
                let outcome = replayer::replay(ctx, &mapper, source, target, revision)?;
                match &outcome {
                    ReplayOutcome::Committed { revision, commit } => {
                        report.committed.push(CommittedRevision {
                            revision: *revision,
                            commit: commit.id.clone(),
                        });
                    }
                    ReplayOutcome::Skipped { revision, reason } => {
                        report.skipped.push(SkippedRevision {
                            revision: *revision,
                            reason: *reason,
                        });
                    }
                }
                observer.replayed(&outcome);
            }
            tracing::info!(
                committed = report.committed.len(),
                skipped = report.skipped.len(),
                "layout synchronized"
            );
        }
    }
    Ok(())
}
