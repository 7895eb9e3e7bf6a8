mod ignore_store;
mod sqlite_store;

use std::sync::Arc;

pub use ignore_store::{IgnoreEntry, IgnoreStore, MemoryIgnoreStore};
use log::{debug, warn};
pub use sqlite_store::SqliteIgnoreStore;

use crate::{
    config::ProofreadConfig,
    document::{Document, DocumentHost as _},
    extract::FlatText,
    matches::{Category, Match},
};

/// Drop matches whose kind of check is switched off. Matches in neither the
/// spelling nor the grammar category are always kept.
#[must_use]
pub fn filter_by_options(matches: Vec<Match>, config: &ProofreadConfig) -> Vec<Match> {
    matches
        .into_iter()
        .filter(|flagged| match flagged.category() {
            Category::Spelling => config.enable_spellcheck,
            Category::Grammar => config.enable_grammar_check,
            Category::Other => true,
        })
        .collect()
}

/// Removes matches the user doesn't want to see: disabled kinds of checks
/// first, then everything on the document's ignore list.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    store: Option<Arc<dyn IgnoreStore>>,
}

impl FilterChain {
    #[must_use]
    pub fn new(store: Option<Arc<dyn IgnoreStore>>) -> Self { Self { store } }

    #[must_use]
    pub fn store(&self) -> Option<&Arc<dyn IgnoreStore>> { self.store.as_ref() }

    /// Apply every filter in order. `document` must be the snapshot `flat`
    /// was extracted from.
    pub async fn filter(
        &self,
        matches: Vec<Match>,
        document: &Document,
        flat: &FlatText,
        config: &ProofreadConfig,
    ) -> Vec<Match> {
        let matches = filter_by_options(matches, config);

        match config.document_id.as_deref() {
            Some(document_id) => {
                self.filter_ignored(matches, document, flat, document_id)
                    .await
            }
            None => matches,
        }
    }

    async fn filter_ignored(
        &self,
        matches: Vec<Match>,
        document: &Document,
        flat: &FlatText,
        document_id: &str,
    ) -> Vec<Match> {
        let Some(store) = &self.store else {
            return matches;
        };

        let mut kept = Vec::with_capacity(matches.len());
        for flagged in matches {
            let word = flat
                .resolve(flagged.offset, flagged.length)
                .map(|range| document.text_between(range.from, range.to))
                .unwrap_or_default();
            let entry = IgnoreEntry::for_match(&flagged, word, document_id);

            match store.contains(&entry).await {
                Ok(true) => debug!("Ignoring {entry:?}"),
                Ok(false) => kept.push(flagged),
                Err(error) => {
                    warn!("Cannot query the ignore store, keeping the match: {error}");
                    kept.push(flagged);
                }
            }
        }

        kept
    }
}
