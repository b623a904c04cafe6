use mirror_config::MirrorConfig;
use mirror_core::ProjectLayout;
use mirror_engine::{Backends, SyncError};
use mirror_git::GitRepository;
use mirror_svn::SvnClient;

/// Opens the `svn` client and git working tree of each layout from config.
pub struct CommandLineBackends<'a> {
    config: &'a MirrorConfig,
}

impl<'a> CommandLineBackends<'a> {
    pub const fn new(config: &'a MirrorConfig) -> Self {
        Self { config }
    }
}

impl Backends for CommandLineBackends<'_> {
    type Source = SvnClient;
    type Target = GitRepository;

    fn open(&self, layout: &ProjectLayout) -> Result<(SvnClient, GitRepository), SyncError> {
        let svn = &self.config.svn;
        let mut source = SvnClient::new(svn.root.trim(), layout.svn_subtree()).with_binary(&svn.binary);
        if svn.has_credentials() {
            source = source.with_credentials(&svn.username, &svn.password);
        }
        tracing::debug!(url = %source.subtree_url(), "svn subtree");

        let target = GitRepository::open(&layout.git_root)
            .map_err(SyncError::git)?
            .with_binary(&self.config.git.binary);
        Ok((source, target))
    }
}
