mod annotation;
mod change_detector;
mod config;
mod consts;
mod document;
mod errors;
mod extract;
mod fetcher;
mod filter;
mod matches;
mod reconciler;
mod session;
mod types;
mod utils;

pub use annotation::{Annotation, AnnotationBatch};
pub use change_detector::ChangeDetector;
pub use config::{IgnoreStoreConfig, ProofreadConfig};
pub use document::{
    Assoc, Document, DocumentError, DocumentHost, Node, Step, Transaction, content_size,
};
pub use errors::ProofreadError;
pub use extract::{FlatText, extract};
pub use fetcher::{
    CheckResponse, CheckService, Fetched, LanguageToolService, RawCategory, RawContext, RawMatch,
    RawReplacement, RawRule, SuggestionFetcher,
};
pub use filter::{
    FilterChain, IgnoreEntry, IgnoreStore, MemoryIgnoreStore, SqliteIgnoreStore,
    filter_by_options,
};
pub use matches::{Category, Match, StyleClass};
pub use reconciler::{ReconcileScope, plan, reconcile, strip_annotations};
pub use session::{CheckRequest, ProofreadSession, SessionPhase};
pub use types::span::Span;
