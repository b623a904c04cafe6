use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod global;

pub use global::{GlobalFlags, OutputFormat};

/// Top-level CLI parser for the `svnmirror` binary.
#[derive(Debug, Parser)]
#[command(
    name = "svnmirror",
    version,
    about = "Incrementally mirror svn project subtrees into git working trees"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./svnmirror.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay svn revisions not yet mirrored into git
    Sync(ProjectArgs),
    /// Show the convergence point and pending backlog without committing
    Status(ProjectArgs),
    /// List the loaded author table
    Authors,
}

#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Only run these projects (repeatable); disabled projects may be named
    #[arg(short, long = "project", value_name = "NAME")]
    pub projects: Vec<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            config: self.config.clone(),
            format: self.format,
            quiet: self.quiet,
        }
    }
}
