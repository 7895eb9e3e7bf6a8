use std::{collections::HashSet, fmt::Debug};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    errors::ProofreadError,
    matches::{Category, Match},
};

/// A dismissed issue, scoped to a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IgnoreEntry {
    Spelling {
        word: String,
        document_id: String,
    },
    Grammar {
        rule_id: String,
        context_text: String,
        context_offset: usize,
        document_id: String,
    },
}

impl IgnoreEntry {
    /// Spelling issues are identified by the flagged word, everything else
    /// by the rule and the context it was reported in.
    #[must_use]
    pub fn for_match(flagged: &Match, word: String, document_id: &str) -> Self {
        match flagged.category() {
            Category::Spelling => Self::Spelling {
                word,
                document_id: document_id.to_owned(),
            },
            Category::Grammar | Category::Other => Self::Grammar {
                rule_id: flagged.rule_id.clone(),
                context_text: flagged.context_text.clone(),
                context_offset: flagged.context_offset,
                document_id: document_id.to_owned(),
            },
        }
    }
}

/// Persists the issues a user chose to ignore. Entries are unique on their
/// natural key and never change once written.
#[async_trait]
pub trait IgnoreStore: Debug + Send + Sync {
    async fn get_spelling(&self, word: &str, document_id: &str) -> Result<bool, ProofreadError>;

    async fn put_spelling(&self, word: &str, document_id: &str) -> Result<(), ProofreadError>;

    async fn get_grammar(
        &self,
        rule_id: &str,
        context_text: &str,
        context_offset: usize,
        document_id: &str,
    ) -> Result<bool, ProofreadError>;

    async fn put_grammar(
        &self,
        rule_id: &str,
        context_text: &str,
        context_offset: usize,
        document_id: &str,
    ) -> Result<(), ProofreadError>;

    async fn contains(&self, entry: &IgnoreEntry) -> Result<bool, ProofreadError> {
        match entry {
            IgnoreEntry::Spelling { word, document_id } => {
                self.get_spelling(word, document_id).await
            }
            IgnoreEntry::Grammar {
                rule_id,
                context_text,
                context_offset,
                document_id,
            } => {
                self.get_grammar(rule_id, context_text, *context_offset, document_id)
                    .await
            }
        }
    }

    async fn put(&self, entry: &IgnoreEntry) -> Result<(), ProofreadError> {
        match entry {
            IgnoreEntry::Spelling { word, document_id } => {
                self.put_spelling(word, document_id).await
            }
            IgnoreEntry::Grammar {
                rule_id,
                context_text,
                context_offset,
                document_id,
            } => {
                self.put_grammar(rule_id, context_text, *context_offset, document_id)
                    .await
            }
        }
    }
}

/// Keeps the ignore list for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryIgnoreStore {
    entries: Mutex<HashSet<IgnoreEntry>>,
}

impl MemoryIgnoreStore {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub async fn len(&self) -> usize { self.entries.lock().await.len() }

    pub async fn is_empty(&self) -> bool { self.entries.lock().await.is_empty() }
}

#[async_trait]
impl IgnoreStore for MemoryIgnoreStore {
    async fn get_spelling(&self, word: &str, document_id: &str) -> Result<bool, ProofreadError> {
        Ok(self.entries.lock().await.contains(&IgnoreEntry::Spelling {
            word: word.to_owned(),
            document_id: document_id.to_owned(),
        }))
    }

    async fn put_spelling(&self, word: &str, document_id: &str) -> Result<(), ProofreadError> {
        self.entries.lock().await.insert(IgnoreEntry::Spelling {
            word: word.to_owned(),
            document_id: document_id.to_owned(),
        });

        Ok(())
    }

    async fn get_grammar(
        &self,
        rule_id: &str,
        context_text: &str,
        context_offset: usize,
        document_id: &str,
    ) -> Result<bool, ProofreadError> {
        Ok(self.entries.lock().await.contains(&IgnoreEntry::Grammar {
            rule_id: rule_id.to_owned(),
            context_text: context_text.to_owned(),
            context_offset,
            document_id: document_id.to_owned(),
        }))
    }

    async fn put_grammar(
        &self,
        rule_id: &str,
        context_text: &str,
        context_offset: usize,
        document_id: &str,
    ) -> Result<(), ProofreadError> {
        self.entries.lock().await.insert(IgnoreEntry::Grammar {
            rule_id: rule_id.to_owned(),
            context_text: context_text.to_owned(),
            context_offset,
            document_id: document_id.to_owned(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::matches::test_match;

    #[test]
    fn test_entry_for_match() {
        let mut grammar = test_match(0, 3, "GRAMMAR");
        grammar.context_text = "He go home".to_owned();
        grammar.context_offset = 3;

        assert_eq!(
            IgnoreEntry::for_match(&test_match(0, 3, "TYPOS"), "teh".to_owned(), "doc1"),
            IgnoreEntry::Spelling {
                word: "teh".to_owned(),
                document_id: "doc1".to_owned()
            }
        );
        assert_eq!(
            IgnoreEntry::for_match(&grammar, "go".to_owned(), "doc1"),
            IgnoreEntry::Grammar {
                rule_id: "GRAMMAR_RULE".to_owned(),
                context_text: "He go home".to_owned(),
                context_offset: 3,
                document_id: "doc1".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_memory_store_is_scoped_by_document() {
        let store = MemoryIgnoreStore::new();

        store.put_spelling("teh", "doc1").await.unwrap();
        store.put_spelling("teh", "doc1").await.unwrap();

        assert_eq!(store.len().await, 1);
        assert!(store.get_spelling("teh", "doc1").await.unwrap());
        assert!(!store.get_spelling("teh", "doc2").await.unwrap());
        assert!(!store.get_grammar("teh", "", 0, "doc1").await.unwrap());
    }
}
