use anyhow::Context;
use mirror_config::{MirrorConfig, load_authors};
use mirror_engine::RunContext;

use crate::cli::GlobalFlags;

/// Load `.env`, then the layered configuration.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<MirrorConfig> {
    MirrorConfig::load_with_dotenv(flags.config.as_deref())
        .context("failed to load svnmirror configuration")
}

/// Build the per-process run context: author table plus sync settings.
pub fn run_context(config: &MirrorConfig) -> anyhow::Result<RunContext> {
    let authors = load_authors(&config.sync.author_path).with_context(|| {
        format!(
            "failed to load author table {}",
            config.sync.author_path.display()
        )
    })?;
    if authors.is_empty() {
        tracing::warn!(
            path = %config.sync.author_path.display(),
            "author table has no entries; every replayed revision will fail"
        );
    }
    Ok(RunContext::new(authors, config.sync.clone()))
}
