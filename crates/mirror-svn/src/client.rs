use std::process::Command;

use mirror_core::{RevisionNumber, SourceInfo, SourceRepository, SourceRevision};

use crate::error::SvnError;
use crate::xml;

/// Read access to one svn subtree through the `svn` command-line client.
#[derive(Debug, Clone)]
pub struct SvnClient {
    binary: String,
    repo_root: String,
    subtree: String,
    username: Option<String>,
    password: Option<String>,
}

impl SvnClient {
    /// `repo_root` is the repository root URL, `subtree` the mirrored path below it.
    #[must_use]
    pub fn new(repo_root: impl Into<String>, subtree: impl Into<String>) -> Self {
        Self {
            binary: "svn".to_string(),
            repo_root: repo_root.into().trim_end_matches('/').to_string(),
            subtree: subtree.into().trim_matches('/').to_string(),
            username: None,
            password: None,
        }
    }

    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Empty values are ignored.
    #[must_use]
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string()).filter(|u| !u.is_empty());
        self.password = Some(password.to_string()).filter(|p| !p.is_empty());
        self
    }

    #[must_use]
    pub fn subtree_url(&self) -> String {
        self.url_for(&self.subtree)
    }

    fn url_for(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        if path.is_empty() {
            self.repo_root.clone()
        } else {
            format!("{}/{path}", self.repo_root)
        }
    }

    fn subtree_path(&self, relative: &str) -> String {
        let relative = relative.trim_matches('/');
        if relative.is_empty() {
            self.subtree.clone()
        } else if self.subtree.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{relative}", self.subtree)
        }
    }

    pub(crate) fn log_args(
        &self,
        paths: &[&str],
        start: RevisionNumber,
        end: RevisionNumber,
    ) -> Vec<String> {
        let mut args = vec![
            "log".to_string(),
            "--xml".to_string(),
            "--verbose".to_string(),
            "--stop-on-copy".to_string(),
            "--revision".to_string(),
            format!("{start}:{end}"),
            self.subtree_url(),
        ];
        args.extend(
            paths
                .iter()
                .map(|p| p.trim_matches('/'))
                .filter(|p| !p.is_empty())
                .map(ToString::to_string),
        );
        args
    }

    fn auth_args(&self) -> Vec<String> {
        let mut args = vec!["--non-interactive".to_string()];
        if let Some(username) = &self.username {
            args.push("--username".to_string());
            args.push(username.clone());
        }
        if let Some(password) = &self.password {
            args.push("--password".to_string());
            args.push(password.clone());
        }
        args
    }

    fn run(&self, args: &[String]) -> Result<Vec<u8>, SvnError> {
        tracing::trace!(binary = %self.binary, ?args, "svn");
        let output = Command::new(&self.binary)
            .args(args)
            .args(self.auth_args())
            .output()
            .map_err(|source| SvnError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(SvnError::Command {
                command: format!("{} {}", self.binary, args.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl SourceRepository for SvnClient {
    type Error = SvnError;

    fn info(&self, path: &str) -> Result<SourceInfo, SvnError> {
        let url = self.url_for(&self.subtree_path(path));
        let stdout = self.run(&["info".to_string(), "--xml".to_string(), url])?;
        xml::parse_info(&String::from_utf8(stdout)?)
    }

    fn log(
        &self,
        paths: &[&str],
        start: RevisionNumber,
        end: RevisionNumber,
    ) -> Result<Vec<SourceRevision>, SvnError> {
        let stdout = self.run(&self.log_args(paths, start, end))?;
        let revisions = xml::parse_log(&String::from_utf8(stdout)?)?;
        tracing::debug!(start, end, count = revisions.len(), "svn log");
        Ok(revisions)
    }

    fn fetch_file(&self, path: &str, revision: RevisionNumber) -> Result<Vec<u8>, SvnError> {
        // The peg revision also protects paths that contain '@'.
        let target = format!("{}@{revision}", self.url_for(path));
        self.run(&["cat".to_string(), target])
    }
}
