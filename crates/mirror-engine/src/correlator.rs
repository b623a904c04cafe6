//! Locating the svn revision the git history has already caught up to.
//!
//! svn history is walked backward in fixed-size windows from the last
//! revision that changed the mirrored subtree. Inside a window each revision,
//! newest first, is compared against the most recent git commits under the
//! mirrored prefixes. A revision and a commit are
//! equivalent when the commit message contains the revision message, the
//! mapped svn author has the commit author's name, and both touch the same set
//! of filtered mirror-relative paths. The first equivalent revision is the
//! convergence point; every revision fetched above it is the backlog.

use std::collections::BTreeSet;

use mirror_core::{
    ChangeKind, NodeKind, RevisionNumber, SourceRepository, SourceRevision, TargetCommit,
    TargetRepository,
};
use serde::Serialize;

use crate::context::RunContext;
use crate::error::SyncError;
use crate::mapper::PathMapper;

/// Outcome of a successful correlation.
#[derive(Debug, Clone, Serialize)]
pub struct Correlation {
    /// svn HEAD when correlation started.
    pub head: RevisionNumber,
    /// Most recent svn revision already reflected in git.
    pub convergence: RevisionNumber,
    /// The git commit that reflects it.
    pub convergence_commit: String,
    /// Revisions after the convergence point, ascending.
    #[serde(skip)]
    pub backlog: Vec<SourceRevision>,
}

impl Correlation {
    #[must_use]
    pub fn backlog_revisions(&self) -> Vec<RevisionNumber> {
        self.backlog.iter().map(|rev| rev.revision).collect()
    }
}

/// A recent git commit with its mirror-relative paths, computed on first use.
struct Candidate {
    commit: TargetCommit,
    paths: Option<BTreeSet<String>>,
}

pub fn correlate<S, T>(
    ctx: &RunContext,
    mapper: &PathMapper<'_>,
    source: &S,
    target: &T,
) -> Result<Correlation, SyncError>
where
    S: SourceRepository,
    T: TargetRepository,
{
    let layout = mapper.layout();
    let info = source.info("").map_err(SyncError::svn)?;
    let head = info.revision;
    tracing::info!(head, last_changed = info.last_changed_revision, "svn head revision");

    let recent = target
        .log(mapper.target_prefixes(), ctx.settings.lookback)
        .map_err(SyncError::git)?;
    if recent.is_empty() {
        return Err(SyncError::NoTargetHistory {
            project: layout.name.clone(),
            paths: mapper.target_prefixes().to_vec(),
        });
    }
    tracing::debug!(commits = recent.len(), "recent git commits loaded");

    let mut candidates = recent
        .into_iter()
        .map(|commit| Candidate {
            commit,
            paths: None,
        })
        .collect::<Vec<_>>();

    // Newest first while searching.
    let mut fetched: Vec<SourceRevision> = Vec::new();
    // Nothing above the last change to the subtree can be a backlog entry.
    let mut end = info.last_changed_revision.min(head);
    loop {
        let start = end.saturating_sub(ctx.settings.window);
        tracing::debug!(start, end, "fetching svn window");
        let window = source.log(&[""], start, end).map_err(SyncError::svn)?;

        for revision in window.into_iter().rev() {
            if let Some(commit) = find_equivalent(ctx, mapper, target, &revision, &mut candidates)? {
                tracing::info!(
                    revision = revision.revision,
                    commit = %commit.short_id(),
                    backlog = fetched.len(),
                    "convergence point found"
                );
                fetched.reverse();
                return Ok(Correlation {
                    head,
                    convergence: revision.revision,
                    convergence_commit: commit.id.clone(),
                    backlog: fetched,
                });
            }
            fetched.push(revision);
        }

        if start == 0 {
            return Err(SyncError::CorrelationExhausted {
                project: layout.name.clone(),
                head,
            });
        }
        end = start - 1;
    }
}

impl Candidate {
    fn paths<T: TargetRepository>(
        &mut self,
        mapper: &PathMapper<'_>,
        target: &T,
    ) -> Result<&BTreeSet<String>, SyncError> {
        let paths = match self.paths.take() {
            Some(paths) => paths,
            None => {
                let changed = target.changed_paths(&self.commit).map_err(SyncError::git)?;
                target_paths(mapper, &changed)
            }
        };
        Ok(&*self.paths.insert(paths))
    }
}

/// The most recent candidate equivalent to `revision`, if any.
fn find_equivalent<'c, T: TargetRepository>(
    ctx: &RunContext,
    mapper: &PathMapper<'_>,
    target: &T,
    revision: &SourceRevision,
    candidates: &'c mut [Candidate],
) -> Result<Option<&'c TargetCommit>, SyncError> {
    let mut svn_paths: Option<SourcePaths> = None;

    for index in 0..candidates.len() {
        let candidate = &mut candidates[index];
        if !candidate.commit.message.contains(&revision.message) {
            continue;
        }

        let author = ctx.resolve_author(&revision.author, revision.revision)?;
        if author.name != candidate.commit.author.name {
            tracing::debug!(
                revision = revision.revision,
                commit = %candidate.commit.short_id(),
                svn_author = %author.name,
                git_author = %candidate.commit.author.name,
                "author differs"
            );
            continue;
        }

        let svn_paths = svn_paths.get_or_insert_with(|| SourcePaths::of(mapper, revision));
        let git_paths = candidate.paths(mapper, target)?;
        let equivalent = svn_paths.matches(git_paths);
        tracing::debug!(
            revision = revision.revision,
            commit = %candidate.commit.short_id(),
            equivalent,
            "compared changed paths"
        );
        if equivalent {
            return Ok(Some(&candidates[index].commit));
        }
    }
    Ok(None)
}

/// Filtered mirror-relative paths of a git commit.
fn target_paths(mapper: &PathMapper<'_>, changed: &BTreeSet<String>) -> BTreeSet<String> {
    let layout = mapper.layout();
    changed
        .iter()
        .filter_map(|path| mapper.target_relative(path))
        .filter(|relative| layout.accepts(relative))
        .collect()
}

/// Filtered mirror-relative paths an svn revision is expected to leave in git.
#[derive(Debug, Default, PartialEq, Eq)]
struct SourcePaths {
    files: BTreeSet<String>,
    /// Deleted directories. git reports the files that were under them.
    removed_dirs: BTreeSet<String>,
}

impl SourcePaths {
    /// Directories that were not deleted leave no trace in git and are left
    /// out. A deletion of unknown node kind may have been either.
    fn of(mapper: &PathMapper<'_>, revision: &SourceRevision) -> Self {
        let layout = mapper.layout();
        let mut paths = Self::default();
        for changed in &revision.changed_paths {
            let Some(relative) = mapper.source_relative(&changed.path) else {
                continue;
            };
            if !layout.accepts(&relative) {
                continue;
            }
            match (changed.change, changed.node) {
                (ChangeKind::Deleted, NodeKind::Directory | NodeKind::Unknown) => {
                    paths.removed_dirs.insert(relative);
                }
                (_, NodeKind::Directory) => {}
                _ => {
                    paths.files.insert(relative);
                }
            }
        }
        paths
    }

    /// Every file shows up in git, and every git path is a file or lies under
    /// a removed directory.
    fn matches(&self, git_paths: &BTreeSet<String>) -> bool {
        self.files.is_subset(git_paths)
            && git_paths.iter().all(|path| {
                self.files.contains(path)
                    || self
                        .removed_dirs
                        .iter()
                        .any(|dir| is_within(path, dir))
            })
    }
}

fn is_within(path: &str, dir: &str) -> bool {
    path.strip_prefix(dir)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use mirror_config::SyncSettings;
    use mirror_core::Signature;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::{
        FakeSource, FakeTarget, added, authors, deleted, layout, modified, revision,
    };

    fn john() -> Signature {
        Signature::new("John Doe", "john@example.org")
    }

    fn ctx() -> RunContext {
        RunContext::new(authors(), SyncSettings::default())
    }

    #[test]
    fn matches_message_author_and_paths() {
        let l = layout("", "", "lib/.*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(104, "msmith", "Initial import", &[added("/proj/trunk/lib/a.c")]));
        source.push(revision(105, "jdoe", "Fix bug #42", &[modified("/proj/trunk/lib/a.c")]));
        source.push(revision(106, "jdoe", "Drop old header", &[deleted("/proj/trunk/lib/old.h")]));

        let mut target = FakeTarget::new();
        target.seed(&john(), "Fix bug #42 (svn r105)", &[("lib/a.c", "v2")], &[]);

        let correlation = correlate(&ctx(), &mapper, &source, &target).unwrap();
        assert_eq!(correlation.head, 106);
        assert_eq!(correlation.convergence, 105);
        assert_eq!(correlation.backlog_revisions(), vec![106]);
        assert_eq!(correlation.convergence_commit, target.head().unwrap().id);
    }

    #[test]
    fn most_recent_equivalent_revision_wins() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(10, "jdoe", "tweak", &[modified("/proj/trunk/lib/a.c")]));
        source.push(revision(11, "jdoe", "tweak", &[modified("/proj/trunk/lib/a.c")]));

        let mut target = FakeTarget::new();
        target.seed(&john(), "tweak", &[("lib/a.c", "1")], &[]);
        target.seed(&john(), "tweak", &[("lib/a.c", "2")], &[]);

        let correlation = correlate(&ctx(), &mapper, &source, &target).unwrap();
        assert_eq!(correlation.convergence, 11);
        assert!(correlation.backlog.is_empty());
    }

    #[test]
    fn differing_paths_do_not_match() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(3, "jdoe", "edit", &[modified("/proj/trunk/lib/a.c")]));
        source.push(revision(
            4,
            "jdoe",
            "edit",
            &[modified("/proj/trunk/lib/a.c"), added("/proj/trunk/lib/b.c")],
        ));

        let mut target = FakeTarget::new();
        target.seed(&john(), "edit", &[("lib/a.c", "x")], &[]);

        let correlation = correlate(&ctx(), &mapper, &source, &target).unwrap();
        assert_eq!(correlation.convergence, 3);
        assert_eq!(correlation.backlog_revisions(), vec![4]);
    }

    #[test]
    fn filter_excludes_paths_from_comparison() {
        let l = layout("", "", "^lib/");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(
            7,
            "jdoe",
            "mixed",
            &[modified("/proj/trunk/lib/a.c"), modified("/proj/trunk/docs/x.txt")],
        ));

        let mut target = FakeTarget::new();
        target.seed(&john(), "mixed", &[("lib/a.c", "x")], &[]);

        let correlation = correlate(&ctx(), &mapper, &source, &target).unwrap();
        assert_eq!(correlation.convergence, 7);
    }

    #[test]
    fn author_must_match_display_name() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(1, "jdoe", "same", &[added("/proj/trunk/lib/a.c")]));
        source.push(revision(2, "msmith", "same", &[modified("/proj/trunk/lib/a.c")]));

        let mut target = FakeTarget::new();
        target.seed(&john(), "same", &[("lib/a.c", "1")], &[]);
        target.seed(&john(), "same", &[("lib/a.c", "2")], &[]);

        let correlation = correlate(&ctx(), &mapper, &source, &target).unwrap();
        assert_eq!(correlation.convergence, 1);
        assert_eq!(correlation.backlog_revisions(), vec![2]);
    }

    #[test]
    fn unmapped_author_with_matching_message_is_fatal() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(5, "ghost", "edit", &[modified("/proj/trunk/lib/a.c")]));

        let mut target = FakeTarget::new();
        target.seed(&john(), "edit", &[("lib/a.c", "x")], &[]);

        let err = correlate(&ctx(), &mapper, &source, &target).unwrap_err();
        assert!(matches!(
            err,
            SyncError::UnknownAuthor { identity, revision: 5 } if identity == "ghost"
        ));
    }

    #[test]
    fn unmapped_author_with_other_message_is_skipped() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(5, "jdoe", "edit", &[modified("/proj/trunk/lib/a.c")]));
        source.push(revision(6, "ghost", "unrelated", &[modified("/proj/trunk/lib/a.c")]));

        let mut target = FakeTarget::new();
        target.seed(&john(), "edit", &[("lib/a.c", "x")], &[]);

        let correlation = correlate(&ctx(), &mapper, &source, &target).unwrap();
        assert_eq!(correlation.convergence, 5);
    }

    #[test]
    fn walks_back_across_windows() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(3, "jdoe", "mirrored", &[added("/proj/trunk/lib/a.c")]));
        for rev in 4..=30 {
            source.push(revision(rev, "jdoe", "later", &[modified("/proj/trunk/lib/a.c")]));
        }

        let mut target = FakeTarget::new();
        target.seed(&john(), "mirrored", &[("lib/a.c", "x")], &[]);

        let correlation = correlate(&ctx(), &mapper, &source, &target).unwrap();
        assert_eq!(correlation.convergence, 3);
        assert_eq!(correlation.backlog_revisions(), (4..=30).collect::<Vec<_>>());
        assert_eq!(
            *source.log_calls.borrow(),
            vec![(20, 30), (9, 19), (0, 8)]
        );
    }

    #[test]
    fn windows_start_at_the_last_change_to_the_subtree() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(3, "jdoe", "mirrored", &[added("/proj/trunk/lib/a.c")]));
        source.push(revision(4, "jdoe", "pending", &[modified("/proj/trunk/lib/a.c")]));
        source.set_head(40);

        let mut target = FakeTarget::new();
        target.seed(&john(), "mirrored", &[("lib/a.c", "x")], &[]);

        let correlation = correlate(&ctx(), &mapper, &source, &target).unwrap();
        assert_eq!(correlation.head, 40);
        assert_eq!(correlation.convergence, 3);
        assert_eq!(correlation.backlog_revisions(), vec![4]);
        assert_eq!(*source.log_calls.borrow(), vec![(0, 4)]);
    }

    #[test]
    fn directory_additions_are_not_compared() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(
            2,
            "jdoe",
            "new module",
            &[
                ("/proj/trunk/lib/sub", ChangeKind::Added, NodeKind::Directory),
                added("/proj/trunk/lib/sub/m.c"),
            ],
        ));

        let mut target = FakeTarget::new();
        target.seed(&john(), "new module", &[("lib/sub/m.c", "m")], &[]);

        assert_eq!(
            correlate(&ctx(), &mapper, &source, &target).unwrap().convergence,
            2
        );
    }

    #[test]
    fn deletions_match_by_old_location() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(8, "jdoe", "remove", &[deleted("/proj/trunk/lib/old.h")]));

        let mut target = FakeTarget::new();
        target.seed(&john(), "add", &[("lib/old.h", "h")], &[]);
        target.seed(&john(), "remove", &[], &["lib/old.h"]);

        assert_eq!(
            correlate(&ctx(), &mapper, &source, &target).unwrap().convergence,
            8
        );
    }

    #[test]
    fn deleted_directory_matches_the_files_removed_under_it() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(1, "jdoe", "add sub", &[added("/proj/trunk/lib/sub/x.c")]));
        source.push(revision(
            2,
            "jdoe",
            "drop sub",
            &[("/proj/trunk/lib/sub", ChangeKind::Deleted, NodeKind::Directory)],
        ));

        let mut target = FakeTarget::new();
        target.seed(&john(), "add sub", &[("lib/sub/x.c", "x"), ("lib/sub/y.c", "y")], &[]);
        target.seed(&john(), "drop sub", &[], &["lib/sub/x.c", "lib/sub/y.c"]);

        let correlation = correlate(&ctx(), &mapper, &source, &target).unwrap();
        assert_eq!(correlation.convergence, 2);
        assert!(correlation.backlog.is_empty());
    }

    #[test]
    fn deleted_directory_does_not_cover_unrelated_paths() {
        let removed = SourcePaths {
            files: BTreeSet::new(),
            removed_dirs: BTreeSet::from(["sub".to_string()]),
        };
        let git = |paths: &[&str]| paths.iter().map(|p| (*p).to_string()).collect::<BTreeSet<_>>();
        assert!(removed.matches(&git(&["sub/x.c", "sub/deep/y.c"])));
        assert!(!removed.matches(&git(&["sub/x.c", "subway.c"])));
        assert!(!removed.matches(&git(&["other/x.c"])));
    }

    #[test]
    fn dual_mode_recognises_history_under_the_old_name() {
        let l = layout("old", "new", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(4, "jdoe", "before rename", &[modified("/proj/trunk/old/a.c")]));

        let mut target = FakeTarget::new();
        target.seed(&john(), "before rename", &[("old/a.c", "x")], &[]);

        assert_eq!(
            correlate(&ctx(), &mapper, &source, &target).unwrap().convergence,
            4
        );
    }

    #[test]
    fn exhausted_history_is_fatal() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(2, "jdoe", "svn only", &[added("/proj/trunk/lib/a.c")]));

        let mut target = FakeTarget::new();
        target.seed(&john(), "git only", &[("lib/a.c", "x")], &[]);

        let err = correlate(&ctx(), &mapper, &source, &target).unwrap_err();
        assert!(matches!(err, SyncError::CorrelationExhausted { head: 2, .. }));
    }

    #[test]
    fn empty_git_history_fails_fast() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(2, "jdoe", "x", &[added("/proj/trunk/lib/a.c")]));
        let target = FakeTarget::new();

        let err = correlate(&ctx(), &mapper, &source, &target).unwrap_err();
        assert!(matches!(err, SyncError::NoTargetHistory { .. }));
        assert!(source.log_calls.borrow().is_empty());
    }

    #[test]
    fn correlation_is_deterministic() {
        let l = layout("lib", "lib", ".*");
        let mapper = PathMapper::new(&l);

        let mut source = FakeSource::new();
        source.push(revision(1, "jdoe", "a", &[added("/proj/trunk/lib/a.c")]));
        source.push(revision(2, "jdoe", "b", &[added("/proj/trunk/lib/b.c")]));

        let mut target = FakeTarget::new();
        target.seed(&john(), "a", &[("lib/a.c", "x")], &[]);

        let first = correlate(&ctx(), &mapper, &source, &target).unwrap();
        let second = correlate(&ctx(), &mapper, &source, &target).unwrap();
        assert_eq!(first.convergence, second.convergence);
        assert_eq!(first.backlog_revisions(), second.backlog_revisions());
    }
}
