//! svn identity → git signature table.
//!
//! The table is line oriented, one `identity = Display Name <contact>` per
//! line. Lines that do not have that shape are ignored so the file can carry
//! comments and blank lines.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::commit::Signature;

static AUTHOR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*) = (.*) <(.*)>").expect("author line pattern compiles"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorDirectory {
    entries: BTreeMap<String, Signature>,
}

impl AuthorDirectory {
    /// Parse an author table.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in content.lines() {
            let Some(caps) = AUTHOR_LINE.captures(line) else {
                continue;
            };
            let identity = caps[1].to_string();
            let signature = Signature::new(&caps[2], &caps[3]);
            tracing::trace!(%identity, %signature, "author added");
            entries.insert(identity, signature);
        }
        Self { entries }
    }

    pub fn insert(&mut self, identity: impl Into<String>, signature: Signature) {
        self.entries.insert(identity.into(), signature);
    }

    #[must_use]
    pub fn resolve(&self, identity: &str) -> Option<&Signature> {
        self.entries.get(identity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Signature)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Signature)> for AuthorDirectory {
    fn from_iter<I: IntoIterator<Item = (String, Signature)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
