use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use reconcile_annotations::{
    CheckService, Document, DocumentHost as _, IgnoreStore, MemoryIgnoreStore, Node,
    ProofreadConfig, ProofreadError, ProofreadSession, RawMatch, StyleClass,
};
use serde::Deserialize;

/// A document, what the checking service reports for it and the
/// annotations that should end up on it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleScenario {
    pub name: String,

    /// Text nodes per paragraph, `<image>` stands for an inline leaf.
    pub paragraphs: Vec<Vec<String>>,

    #[serde(default)]
    pub config: ProofreadConfig,

    pub matches: Vec<RawMatch>,

    #[serde(default)]
    pub ignored_words: Vec<IgnoredWord>,

    #[serde(default)]
    pub ignored_grammar_errors: Vec<IgnoredGrammarError>,

    pub expected: Vec<ExpectedAnnotation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoredWord {
    pub value: String,
    pub document_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoredGrammarError {
    pub rule_id: String,
    pub context_text: String,
    pub context_offset: usize,
    pub document_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedAnnotation {
    pub text: String,
    pub from: usize,
    pub to: usize,
    pub style: StyleClass,
}

/// Replies with the same matches to every request.
#[derive(Debug)]
pub struct FixedService {
    matches: Vec<RawMatch>,
    requests: AtomicUsize,
}

#[async_trait]
impl CheckService for FixedService {
    async fn check(&self, _text: &str, _language: &str) -> Result<Vec<RawMatch>, ProofreadError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.matches.clone())
    }
}

impl ExampleScenario {
    pub fn document(&self) -> Document {
        Document::new(
            self.paragraphs
                .iter()
                .map(|segments| {
                    Node::paragraph(
                        segments
                            .iter()
                            .map(|segment| match segment.as_str() {
                                "<image>" => Node::inline("image"),
                                text => Node::text(text),
                            })
                            .collect(),
                    )
                })
                .collect(),
        )
    }

    pub async fn session(&self) -> (ProofreadSession<Document>, Arc<FixedService>) {
        let mut config = self.config.clone();
        config
            .api_url
            .get_or_insert_with(|| "http://localhost:8081/v2/check".to_owned());

        let store = MemoryIgnoreStore::new();
        for word in &self.ignored_words {
            store
                .put_spelling(&word.value, &word.document_id)
                .await
                .expect("Failed to store ignored word");
        }
        for error in &self.ignored_grammar_errors {
            store
                .put_grammar(
                    &error.rule_id,
                    &error.context_text,
                    error.context_offset,
                    &error.document_id,
                )
                .await
                .expect("Failed to store ignored grammar error");
        }

        let service = Arc::new(FixedService {
            matches: self.matches.clone(),
            requests: AtomicUsize::new(0),
        });
        let session = ProofreadSession::new(
            self.document(),
            config,
            service.clone(),
            Some(Arc::new(store)),
        );

        (session, service)
    }

    pub async fn assert_annotations(&self, session: &ProofreadSession<Document>) {
        let host = session.host();
        let document = host.lock().await;
        let actual = document
            .annotations()
            .iter()
            .map(|annotation| ExpectedAnnotation {
                text: document.text_between(annotation.from, annotation.to),
                from: annotation.from,
                to: annotation.to,
                style: annotation.style,
            })
            .collect::<Vec<_>>();

        assert_eq!(actual, self.expected, "Scenario: {}", self.name);
    }
}

impl FixedService {
    pub fn requests(&self) -> usize { self.requests.load(Ordering::SeqCst) }
}
