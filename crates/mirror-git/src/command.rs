//! Thin wrapper around the `git` executable for the write side.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::GitError;

#[derive(Debug, Clone)]
pub(crate) struct GitCommand {
    binary: String,
    work_dir: PathBuf,
}

impl GitCommand {
    pub(crate) fn new(binary: impl Into<String>, work_dir: &Path) -> Self {
        Self {
            binary: binary.into(),
            work_dir: work_dir.to_path_buf(),
        }
    }

    pub(crate) fn set_binary(&mut self, binary: impl Into<String>) {
        self.binary = binary.into();
    }

    /// A command preconfigured with the binary and working directory.
    pub(crate) fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(args).current_dir(&self.work_dir);
        command
    }

    /// Run to completion, returning the raw output whatever the exit status.
    pub(crate) fn output(&self, mut command: Command, args: &[&str]) -> Result<Output, GitError> {
        tracing::trace!(binary = %self.binary, ?args, "git");
        command.output().map_err(|source| GitError::Spawn {
            binary: self.binary.clone(),
            source,
        })
    }

    /// Run and require a zero exit status.
    pub(crate) fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.output(self.command(args), args)?;
        self.check(&output, args)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub(crate) fn check(&self, output: &Output, args: &[&str]) -> Result<(), GitError> {
        if output.status.success() {
            return Ok(());
        }
        Err(GitError::Command {
            command: format!("{} {}", self.binary, args.join(" ")),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
