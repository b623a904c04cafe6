//! In-memory svn and git stand-ins for engine tests.
//!
//! `FakeTarget` keeps a real working tree in a tempdir (the replayer writes
//! files with `std::fs`) but models the index and history in memory.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use mirror_core::{
    AuthorDirectory, ChangeKind, ChangedPath, CommitRequest, NodeKind, ProjectLayout,
    RevisionNumber, Signature, SourceInfo, SourceRepository, SourceRevision, SvnBranch,
    TargetCommit, TargetRepository,
};
use tempfile::TempDir;

pub fn layout(svn_path: &str, git_path: &str, filter: &str) -> ProjectLayout {
    ProjectLayout {
        name: "proj[trunk]".to_string(),
        svn_project: "proj".to_string(),
        svn_path: svn_path.to_string(),
        svn_branch: SvnBranch::Trunk,
        old_path_prefix: None,
        git_root: PathBuf::from("/unused"),
        git_path: git_path.to_string(),
        git_branch: None,
        filter: ProjectLayout::compile_filter(filter).unwrap(),
    }
}

pub fn authors() -> AuthorDirectory {
    AuthorDirectory::parse(
        "jdoe = John Doe <john@example.org>\nmsmith = Mary Smith <mary@example.org>\n",
    )
}

pub fn date(revision: RevisionNumber) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        + chrono::Duration::hours(i64::try_from(revision).unwrap())
}

pub fn revision(
    number: RevisionNumber,
    author: &str,
    message: &str,
    paths: &[(&str, ChangeKind, NodeKind)],
) -> SourceRevision {
    SourceRevision {
        revision: number,
        author: author.to_string(),
        message: message.to_string(),
        date: date(number),
        changed_paths: paths
            .iter()
            .map(|(path, change, node)| ChangedPath::new(*path, *change, *node))
            .collect(),
    }
}

pub fn modified(path: &str) -> (&str, ChangeKind, NodeKind) {
    (path, ChangeKind::Modified, NodeKind::File)
}

pub fn added(path: &str) -> (&str, ChangeKind, NodeKind) {
    (path, ChangeKind::Added, NodeKind::File)
}

pub fn deleted(path: &str) -> (&str, ChangeKind, NodeKind) {
    (path, ChangeKind::Deleted, NodeKind::File)
}

#[derive(Debug, Default)]
pub struct FakeSource {
    revisions: BTreeMap<RevisionNumber, SourceRevision>,
    files: HashMap<(String, RevisionNumber), Vec<u8>>,
    head: RevisionNumber,
    /// `(start, end)` of every log call.
    pub log_calls: RefCell<Vec<(RevisionNumber, RevisionNumber)>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, revision: SourceRevision) {
        self.head = self.head.max(revision.revision);
        self.revisions.insert(revision.revision, revision);
    }

    /// Bump the head without a revision touching the subtree.
    pub fn set_head(&mut self, head: RevisionNumber) {
        self.head = head;
    }

    pub fn file(&mut self, path: &str, revision: RevisionNumber, content: &str) {
        self.files
            .insert((path.to_string(), revision), content.as_bytes().to_vec());
    }
}

impl SourceRepository for FakeSource {
    type Error = io::Error;

    fn info(&self, _path: &str) -> Result<SourceInfo, io::Error> {
        Ok(SourceInfo {
            revision: self.head,
            last_changed_revision: self.revisions.keys().next_back().copied().unwrap_or(0),
        })
    }

    fn log(
        &self,
        _paths: &[&str],
        start: RevisionNumber,
        end: RevisionNumber,
    ) -> Result<Vec<SourceRevision>, io::Error> {
        self.log_calls.borrow_mut().push((start, end));
        Ok(self
            .revisions
            .range(start..=end)
            .map(|(_, rev)| rev.clone())
            .collect())
    }

    fn fetch_file(&self, path: &str, revision: RevisionNumber) -> Result<Vec<u8>, io::Error> {
        self.files
            .get(&(path.to_string(), revision))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{path}@{revision}")))
    }
}

#[derive(Debug, Clone)]
struct Recorded {
    commit: TargetCommit,
    changed: BTreeSet<String>,
}

#[derive(Debug)]
pub struct FakeTarget {
    dir: TempDir,
    head_tree: BTreeMap<String, Vec<u8>>,
    index: BTreeMap<String, Vec<u8>>,
    history: Vec<Recorded>,
    pub requests: Vec<CommitRequest>,
    pub checkouts: Vec<String>,
}

impl FakeTarget {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            head_tree: BTreeMap::new(),
            index: BTreeMap::new(),
            history: Vec::new(),
            requests: Vec::new(),
            checkouts: Vec::new(),
        }
    }

    /// Record a commit as if it had been made by an earlier mirror run.
    pub fn seed(&mut self, author: &Signature, message: &str, files: &[(&str, &str)], removed: &[&str]) {
        for (path, content) in files {
            let full = self.dir.path().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(&full, content).unwrap();
            self.stage_add(path).unwrap();
        }
        for path in removed {
            self.stage_remove(path).unwrap();
        }
        self.commit(&CommitRequest {
            author: author.clone(),
            committer: author.clone(),
            message: message.to_string(),
            timestamp: None,
        })
        .unwrap();
    }

    pub fn commits(&self) -> usize {
        self.history.len()
    }

    pub fn head(&self) -> Option<&TargetCommit> {
        self.history.last().map(|r| &r.commit)
    }

    pub fn head_changes(&self) -> BTreeSet<String> {
        self.history.last().map(|r| r.changed.clone()).unwrap_or_default()
    }

    pub fn tracked(&self, path: &str) -> Option<String> {
        self.head_tree
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

fn under(path: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || path == prefix
        || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

impl TargetRepository for FakeTarget {
    type Error = io::Error;

    fn work_dir(&self) -> &Path {
        self.dir.path()
    }

    fn log(&self, paths: &[String], max_count: usize) -> Result<Vec<TargetCommit>, io::Error> {
        Ok(self
            .history
            .iter()
            .rev()
            .filter(|r| {
                paths.is_empty()
                    || r.changed
                        .iter()
                        .any(|changed| paths.iter().any(|prefix| under(changed, prefix)))
            })
            .take(max_count)
            .map(|r| r.commit.clone())
            .collect())
    }

    fn changed_paths(&self, commit: &TargetCommit) -> Result<BTreeSet<String>, io::Error> {
        self.history
            .iter()
            .find(|r| r.commit.id == commit.id)
            .map(|r| r.changed.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, commit.id.clone()))
    }

    fn checkout(&mut self, branch: &str) -> Result<(), io::Error> {
        self.checkouts.push(branch.to_string());
        Ok(())
    }

    fn stage_add(&mut self, path: &str) -> Result<(), io::Error> {
        let bytes = std::fs::read(self.dir.path().join(path))?;
        self.index.insert(path.to_string(), bytes);
        Ok(())
    }

    fn stage_remove(&mut self, path: &str) -> Result<(), io::Error> {
        self.index.retain(|tracked, _| !under(tracked, path));
        let full = self.dir.path().join(path);
        if full.is_dir() {
            std::fs::remove_dir_all(full)?;
        } else if full.exists() {
            std::fs::remove_file(full)?;
        }
        Ok(())
    }

    fn has_staged_changes(&self) -> Result<bool, io::Error> {
        Ok(self.index != self.head_tree)
    }

    fn commit(&mut self, request: &CommitRequest) -> Result<TargetCommit, io::Error> {
        let changed = self
            .index
            .iter()
            .filter(|(path, bytes)| self.head_tree.get(*path) != Some(*bytes))
            .map(|(path, _)| path.clone())
            .chain(
                self.head_tree
                    .keys()
                    .filter(|path| !self.index.contains_key(*path))
                    .cloned(),
            )
            .collect::<BTreeSet<_>>();
        let commit = TargetCommit {
            id: format!("{:040x}", self.history.len() + 1),
            parents: self.head().map(|c| c.id.clone()).into_iter().collect(),
            author: request.author.clone(),
            message: request.message.clone(),
        };
        self.head_tree = self.index.clone();
        self.history.push(Recorded {
            commit: commit.clone(),
            changed,
        });
        self.requests.push(request.clone());
        Ok(commit)
    }
}
