use std::path::PathBuf;

use mirror_config::MirrorConfig;
use serde::Serialize;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::output::{self, Tabular};

#[derive(Debug, Serialize)]
struct AuthorRow {
    identity: String,
    name: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct AuthorsReport {
    path: PathBuf,
    count: usize,
    authors: Vec<AuthorRow>,
}

impl Tabular for AuthorsReport {
    fn headers(&self) -> Vec<&'static str> {
        vec!["identity", "name", "email"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.authors
            .iter()
            .map(|row| vec![row.identity.clone(), row.name.clone(), row.email.clone()])
            .collect()
    }
}

pub fn handle(config: &MirrorConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let ctx = bootstrap::run_context(config)?;
    let authors = ctx
        .authors
        .iter()
        .map(|(identity, signature)| AuthorRow {
            identity: identity.to_string(),
            name: signature.name.clone(),
            email: signature.email.clone(),
        })
        .collect::<Vec<_>>();

    output::output(
        &AuthorsReport {
            path: config.sync.author_path.clone(),
            count: authors.len(),
            authors,
        },
        flags.format,
    )
}
