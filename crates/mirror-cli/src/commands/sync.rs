use anyhow::Context;
use mirror_config::MirrorConfig;
use mirror_core::ProjectLayout;
use mirror_engine::{LayoutReport, Mode, Observer, ReplayOutcome, RunSummary, run_all};
use serde::Serialize;

use crate::backends::CommandLineBackends;
use crate::bootstrap;
use crate::cli::{GlobalFlags, ProjectArgs};
use crate::output::{self, Tabular};
use crate::progress::Progress;

pub fn handle(
    args: &ProjectArgs,
    config: &MirrorConfig,
    flags: &GlobalFlags,
    mode: Mode,
) -> anyhow::Result<()> {
    let layouts = config
        .layouts(&args.projects)
        .context("invalid project configuration")?;
    let ctx = bootstrap::run_context(config)?;
    tracing::info!(layouts = layouts.len(), ?mode, "run started");

    let backends = CommandLineBackends::new(config);
    let mut progress = ReplayProgress::new(mode);
    let summary = run_all(&ctx, &layouts, &backends, mode, &mut progress);

    output::output(&SummaryView(&summary), flags.format)?;

    let failures = summary.failures();
    if failures > 0 {
        anyhow::bail!("{failures} of {} layouts failed", summary.layouts.len());
    }
    Ok(())
}

/// One progress bar per layout with a backlog to replay.
struct ReplayProgress {
    mode: Mode,
    current: Progress,
}

impl ReplayProgress {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            current: Progress::hidden(),
        }
    }
}

impl Observer for ReplayProgress {
    fn backlog(&mut self, layout: &ProjectLayout, revisions: usize) {
        if self.mode == Mode::Sync && revisions > 0 {
            self.current = Progress::bar(u64::try_from(revisions).unwrap_or(u64::MAX), &layout.name);
        }
    }

    fn replayed(&mut self, outcome: &ReplayOutcome) {
        self.current.inc(1);
        self.current.set_message(&format!("r{}", outcome.revision()));
    }

    fn finished(&mut self, report: &LayoutReport) {
        if report.failed() {
            self.current.finish_err("failed");
        } else {
            self.current
                .finish_ok(&format!("{} commits", report.committed.len()));
        }
        self.current = Progress::hidden();
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct SummaryView<'a>(&'a RunSummary);

fn status_of(mode: Mode, report: &LayoutReport) -> &'static str {
    if report.failed() {
        "failed"
    } else if mode == Mode::Status && !report.backlog.is_empty() {
        "pending"
    } else {
        "synced"
    }
}

fn note_of(report: &LayoutReport) -> String {
    if let Some(error) = &report.error {
        return error.clone();
    }
    if !report.missing_authors.is_empty() {
        return format!("unmapped authors: {}", report.missing_authors.join(", "));
    }
    String::new()
}

fn revision_cell(revision: Option<u64>) -> String {
    revision.map_or_else(|| "-".to_string(), |r| r.to_string())
}

impl Tabular for SummaryView<'_> {
    fn headers(&self) -> Vec<&'static str> {
        vec![
            "layout", "head", "converged", "backlog", "committed", "skipped", "status", "note",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .layouts
            .iter()
            .map(|report| {
                vec![
                    report.name.clone(),
                    revision_cell(report.head),
                    revision_cell(report.convergence),
                    report.backlog.len().to_string(),
                    report.committed.len().to_string(),
                    report.skipped.len().to_string(),
                    status_of(self.0.mode, report).to_string(),
                    note_of(report),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use mirror_engine::CommittedRevision;
    use pretty_assertions::assert_eq;

    use super::*;

    fn report(name: &str) -> LayoutReport {
        LayoutReport {
            name: name.to_string(),
            head: Some(120),
            convergence: Some(118),
            backlog: vec![119, 120],
            ..LayoutReport::default()
        }
    }

    #[test]
    fn rows_summarise_each_layout() {
        let mut synced = report("app[trunk]");
        synced.committed = vec![
            CommittedRevision {
                revision: 119,
                commit: "a".repeat(40),
            },
            CommittedRevision {
                revision: 120,
                commit: "b".repeat(40),
            },
        ];
        let mut failed = report("tools[trunk]");
        failed.error = Some("no author mapping for svn user 'ghost' (revision r119)".to_string());

        let summary = RunSummary {
            mode: Mode::Sync,
            layouts: vec![synced, failed],
        };
        let rows = SummaryView(&summary).rows();
        assert_eq!(
            rows[0],
            vec!["app[trunk]", "120", "118", "2", "2", "0", "synced", ""]
        );
        assert_eq!(rows[1][6], "failed");
        assert!(rows[1][7].contains("ghost"));
    }

    #[test]
    fn status_mode_marks_pending_backlogs() {
        let mut pending = report("app[trunk]");
        pending.missing_authors = vec!["ghost".to_string()];
        let summary = RunSummary {
            mode: Mode::Status,
            layouts: vec![pending],
        };
        let rows = SummaryView(&summary).rows();
        assert_eq!(rows[0][6], "pending");
        assert_eq!(rows[0][7], "unmapped authors: ghost");
    }

    #[test]
    fn json_view_is_the_summary_itself() {
        let summary = RunSummary {
            mode: Mode::Status,
            layouts: vec![report("app[trunk]")],
        };
        let value = serde_json::to_value(SummaryView(&summary)).unwrap();
        assert_eq!(value["mode"], "status");
        assert_eq!(value["layouts"][0]["convergence"], 118);
        assert_eq!(value["layouts"][0]["backlog"], serde_json::json!([119, 120]));
    }
}
