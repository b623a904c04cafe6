use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use mirror_core::{CommitRequest, Signature, TargetCommit, TargetRepository};

use crate::command::GitCommand;
use crate::error::GitError;

/// The git side of a mirror: one working tree.
///
/// History is read with `gix`; checkout, staging and commits go through the
/// `git` executable.
pub struct GitRepository {
    root: PathBuf,
    repo: gix::Repository,
    git: GitCommand,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepository {
    /// Open the repository containing `path`; the working tree root becomes
    /// the base of every path this type deals in.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = gix::discover(path).map_err(|_| GitError::NotGitRepo(path.to_path_buf()))?;
        let root = repo
            .work_dir()
            .map(Path::to_path_buf)
            .ok_or_else(|| GitError::Git(format!("{} is a bare repository", path.display())))?;
        let git = GitCommand::new("git", &root);
        Ok(Self { root, repo, git })
    }

    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.git.set_binary(binary);
        self
    }

    /// Pick up refs and objects written by the git executable.
    fn reload(&mut self) -> Result<(), GitError> {
        self.repo = gix::open(self.repo.git_dir())
            .map_err(|e| GitError::Git(format!("reopen repository: {e}")))?;
        Ok(())
    }

    fn find_commit(&self, id: &str) -> Result<gix::Commit<'_>, GitError> {
        let oid: gix::ObjectId = id.parse().map_err(|_| GitError::InvalidId(id.to_string()))?;
        self.repo
            .find_commit(oid)
            .map_err(|e| GitError::Git(format!("find commit {id}: {e}")))
    }

    /// Blob paths changed between `commit` and its first parent.
    fn diff_first_parent(&self, commit: &gix::Commit<'_>) -> Result<BTreeSet<String>, GitError> {
        let new_tree = commit
            .tree()
            .map_err(|e| GitError::Git(format!("load new tree: {e}")))?;
        let old_tree = match commit.parent_ids().next() {
            Some(parent) => self
                .repo
                .find_commit(parent.detach())
                .map_err(|e| GitError::Git(format!("find parent commit: {e}")))?
                .tree()
                .map_err(|e| GitError::Git(format!("load old tree: {e}")))?,
            None => self.repo.empty_tree(),
        };

        let changes = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)
            .map_err(|e| GitError::Git(format!("diff tree to tree: {e}")))?;

        let mut paths = BTreeSet::new();
        for change in changes.iter().filter(|change| !change.entry_mode().is_tree()) {
            // A rename removes its source; report both ends.
            if let gix::object::tree::diff::ChangeDetached::Rewrite {
                source_location,
                copy: false,
                ..
            } = change
            {
                paths.insert(source_location.to_string());
            }
            paths.insert(change.location().to_string());
        }
        Ok(paths)
    }

    fn to_target_commit(commit: &gix::Commit<'_>) -> Result<TargetCommit, GitError> {
        let author = commit
            .author()
            .map_err(|e| GitError::Git(format!("decode author: {e}")))?;
        let message = commit
            .message_raw()
            .map_err(|e| GitError::Git(format!("decode message: {e}")))?;
        Ok(TargetCommit {
            id: commit.id.to_string(),
            parents: commit.parent_ids().map(|id| id.to_string()).collect(),
            author: Signature::new(author.name.to_string(), author.email.to_string()),
            message: message.to_string(),
        })
    }
}

/// Whether `path` is `prefix` or lies below it.
fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// git's internal date format, `<unix seconds> <+hhmm>`.
fn git_date(timestamp: &chrono::DateTime<chrono::FixedOffset>) -> String {
    format!("{} {}", timestamp.timestamp(), timestamp.format("%z"))
}

impl TargetRepository for GitRepository {
    type Error = GitError;

    fn work_dir(&self) -> &Path {
        &self.root
    }

    fn log(&self, paths: &[String], max_count: usize) -> Result<Vec<TargetCommit>, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::Git(format!("read HEAD: {e}")))?;
        let Some(head_id) = head.id() else {
            return Ok(Vec::new());
        };

        let walk = self
            .repo
            .rev_walk([head_id.detach()])
            .all()
            .map_err(|e| GitError::Git(format!("rev-walk: {e}")))?;

        let mut commits = Vec::new();
        for info in walk {
            if commits.len() >= max_count {
                break;
            }
            let info = info.map_err(|e| GitError::Git(format!("rev-walk: {e}")))?;
            let commit = self
                .repo
                .find_commit(info.id)
                .map_err(|e| GitError::Git(format!("find commit {}: {e}", info.id)))?;

            let touches = paths.is_empty()
                || self
                    .diff_first_parent(&commit)?
                    .iter()
                    .any(|changed| paths.iter().any(|prefix| is_under(changed, prefix)));
            if touches {
                commits.push(Self::to_target_commit(&commit)?);
            }
        }
        Ok(commits)
    }

    fn changed_paths(&self, commit: &TargetCommit) -> Result<BTreeSet<String>, GitError> {
        let found = self.find_commit(&commit.id)?;
        self.diff_first_parent(&found)
    }

    fn checkout(&mut self, branch: &str) -> Result<(), GitError> {
        self.git.run(&["checkout", "--quiet", branch])?;
        self.reload()
    }

    fn stage_add(&mut self, path: &str) -> Result<(), GitError> {
        // Tracked in svn means tracked here, whatever .gitignore says.
        self.git.run(&["add", "--all", "--force", "--", path])?;
        Ok(())
    }

    fn stage_remove(&mut self, path: &str) -> Result<(), GitError> {
        self.git
            .run(&["rm", "-r", "--quiet", "--ignore-unmatch", "--", path])?;

        // Untracked leftovers (empty directories, ignored files) stay on disk after `git rm`.
        let full = self.root.join(path);
        if full.is_dir() {
            std::fs::remove_dir_all(&full)?;
        } else if full.exists() {
            std::fs::remove_file(&full)?;
        }
        Ok(())
    }

    fn has_staged_changes(&self) -> Result<bool, GitError> {
        let args = ["diff", "--cached", "--quiet"];
        let output = self.git.output(self.git.command(&args), &args)?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => {
                self.git.check(&output, &args)?;
                Ok(false)
            }
        }
    }

    fn commit(&mut self, request: &CommitRequest) -> Result<TargetCommit, GitError> {
        let args = [
            "commit",
            "--quiet",
            "--no-verify",
            "--no-gpg-sign",
            "--allow-empty-message",
            "--cleanup=verbatim",
            "--message",
            request.message.as_str(),
        ];
        let mut command = self.git.command(&args);
        command
            .env("GIT_AUTHOR_NAME", &request.author.name)
            .env("GIT_AUTHOR_EMAIL", &request.author.email)
            .env("GIT_COMMITTER_NAME", &request.committer.name)
            .env("GIT_COMMITTER_EMAIL", &request.committer.email);
        if let Some(timestamp) = &request.timestamp {
            let date = git_date(timestamp);
            command
                .env("GIT_AUTHOR_DATE", &date)
                .env("GIT_COMMITTER_DATE", &date);
        }
        let output = self.git.output(command, &args)?;
        self.git.check(&output, &args)?;

        self.reload()?;
        let head = self
            .repo
            .head_commit()
            .map_err(|e| GitError::Git(format!("read new HEAD: {e}")))?;
        Self::to_target_commit(&head)
    }
}
