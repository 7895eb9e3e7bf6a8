mod phase;
mod request;

use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
pub use phase::SessionPhase;
pub use request::CheckRequest;
use tokio::{sync::Mutex, task::JoinHandle};
use uuid::Uuid;

use crate::{
    annotation::{Annotation, AnnotationBatch},
    change_detector::ChangeDetector,
    config::ProofreadConfig,
    document::{Document, DocumentError, DocumentHost, Transaction},
    errors::ProofreadError,
    extract::extract,
    fetcher::{CheckService, LanguageToolService, SuggestionFetcher},
    filter::{FilterChain, IgnoreEntry, IgnoreStore, SqliteIgnoreStore},
    matches::Match,
    reconciler::{ReconcileScope, reconcile},
};

/// Keeps the annotations of one document in sync with its content.
///
/// Every edit the host commits has to be passed to `handle_transaction`.
/// Checks run on spawned tasks; each one gets a sequence number and only the
/// latest one is allowed to touch the document.
#[derive(Debug)]
pub struct ProofreadSession<H: DocumentHost> {
    inner: Arc<Inner<H>>,
}

impl<H: DocumentHost> Clone for ProofreadSession<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[derive(Debug)]
struct Inner<H: DocumentHost> {
    host: Arc<Mutex<H>>,
    config: ProofreadConfig,
    fetcher: SuggestionFetcher,
    filters: FilterChain,
    state: StdMutex<SessionState>,
    tasks: StdMutex<Vec<JoinHandle<()>>>,
}

#[derive(Debug, Default)]
struct SessionState {
    detector: ChangeDetector,
    phase: SessionPhase,
    automatic_mode: bool,
    sequence: u64,
    /// Everything requested since the last committed check.
    pending: Option<CheckRequest>,
}

impl<H: DocumentHost> ProofreadSession<H> {
    #[must_use]
    pub fn new(
        host: H,
        config: ProofreadConfig,
        service: Arc<dyn CheckService>,
        store: Option<Arc<dyn IgnoreStore>>,
    ) -> Self {
        let state = SessionState {
            automatic_mode: config.automatic_mode,
            ..SessionState::default()
        };

        Self {
            inner: Arc::new(Inner {
                host: Arc::new(Mutex::new(host)),
                fetcher: SuggestionFetcher::new(&config, service),
                filters: FilterChain::new(store),
                config,
                state: StdMutex::new(state),
                tasks: StdMutex::new(Vec::new()),
            }),
        }
    }

    /// Create a session talking to the LanguageTool endpoint at `apiUrl`,
    /// with the SQLite ignore store when one is configured.
    ///
    /// # Errors
    ///
    /// Fails if the ignore store can't be opened.
    pub async fn connect(host: H, config: ProofreadConfig) -> Result<Self, ProofreadError> {
        let service = Arc::new(LanguageToolService::new(
            config.api_url.as_deref().unwrap_or_default(),
        ));

        let store: Option<Arc<dyn IgnoreStore>> = match &config.ignore_store {
            Some(store_config) => Some(Arc::new(SqliteIgnoreStore::try_new(store_config).await?)),
            None => None,
        };

        Ok(Self::new(host, config, service, store))
    }

    #[must_use]
    pub fn host(&self) -> Arc<Mutex<H>> { Arc::clone(&self.inner.host) }

    #[must_use]
    pub fn config(&self) -> &ProofreadConfig { &self.inner.config }

    #[must_use]
    pub fn fetcher(&self) -> &SuggestionFetcher { &self.inner.fetcher }

    #[must_use]
    pub fn phase(&self) -> SessionPhase { self.lock_state().phase }

    #[must_use]
    pub fn automatic_mode(&self) -> bool { self.lock_state().automatic_mode }

    /// Attach to the document: the first user edit is skipped and, in
    /// automatic mode, a full check is scheduled.
    pub fn start(&self) {
        let automatic_mode = {
            let mut state = self.lock_state();
            state.detector.arm();
            state.automatic_mode
        };

        if automatic_mode {
            self.schedule(CheckRequest::Full);
        }
    }

    /// Process a transaction the host has committed.
    pub fn handle_transaction(&self, transaction: &Transaction) {
        let span = {
            let mut state = self.lock_state();
            state.pending = state.pending.map(|request| request.map(transaction));

            let Some(span) = state.detector.detect_span(transaction) else {
                return;
            };

            if !state.automatic_mode {
                return;
            }

            span
        };

        self.schedule(CheckRequest::Fragment(span));
    }

    /// Replace `[from, to)` with `text` as a user edit.
    ///
    /// # Errors
    ///
    /// Fails if the host rejects the edit.
    pub async fn edit(
        &self,
        from: usize,
        to: usize,
        text: &str,
    ) -> Result<Transaction, ProofreadError> {
        let transaction = self.inner.host.lock().await.replace(from, to, text)?;
        self.handle_transaction(&transaction);

        Ok(transaction)
    }

    /// Check the whole document right away, regardless of the automatic
    /// mode.
    pub async fn proofread(&self) {
        let sequence = self.next_sequence(CheckRequest::Full, SessionPhase::Fetching);
        self.run_check(sequence, CheckRequest::Full).await;
    }

    /// Switching automatic checks back on checks the whole document.
    pub async fn set_automatic_mode(&self, enabled: bool) {
        self.lock_state().automatic_mode = enabled;
        info!("Automatic proofreading {}", if enabled { "enabled" } else { "disabled" });

        if enabled {
            self.proofread().await;
        }
    }

    /// Replace the text of an annotation with one of its suggestions.
    ///
    /// # Errors
    ///
    /// Fails if there is no such annotation or replacement, or if the host
    /// rejects the edit.
    pub async fn accept_replacement(
        &self,
        uuid: Uuid,
        index: usize,
    ) -> Result<Transaction, ProofreadError> {
        let transaction = {
            let mut host = self.inner.host.lock().await;
            let annotation = host
                .annotation(uuid)
                .cloned()
                .ok_or(DocumentError::UnknownAnnotation(uuid))?;
            let flagged = annotation.decode_match()?;
            let replacement = flagged
                .replacements
                .get(index)
                .ok_or(ProofreadError::NoSuchReplacement { uuid, index })?;

            let transaction = host.replace(annotation.from, annotation.to, replacement)?;
            if host.annotation(uuid).is_some() {
                host.apply_annotations(AnnotationBatch {
                    remove: vec![uuid],
                    add: Vec::new(),
                });
            }

            transaction
        };

        self.handle_transaction(&transaction);

        Ok(transaction)
    }

    /// Remove an annotation and remember to hide the issue in this document
    /// from now on. The ignore list is written in the background.
    ///
    /// # Errors
    ///
    /// Fails if there is no such annotation.
    pub async fn ignore(&self, uuid: Uuid) -> Result<(), ProofreadError> {
        let entry = {
            let mut host = self.inner.host.lock().await;
            let annotation = host
                .annotation(uuid)
                .cloned()
                .ok_or(DocumentError::UnknownAnnotation(uuid))?;
            let flagged = annotation.decode_match()?;
            let word = host.text_between(annotation.from, annotation.to);

            host.apply_annotations(AnnotationBatch {
                remove: vec![uuid],
                add: Vec::new(),
            });

            self.inner
                .config
                .document_id
                .as_deref()
                .map(|document_id| IgnoreEntry::for_match(&flagged, word, document_id))
        };

        let (Some(entry), Some(store)) = (entry, self.inner.filters.store().cloned()) else {
            return Ok(());
        };

        self.track(tokio::spawn(async move {
            if let Err(error) = store.put(&entry).await {
                warn!("Cannot store ignored issue {entry:?}: {error}");
            }
        }));

        Ok(())
    }

    /// The annotation covering `position`, with the match it was created
    /// from.
    pub async fn annotation_at(&self, position: usize) -> Option<(Annotation, Match)> {
        let host = self.inner.host.lock().await;
        let annotation = host
            .annotations()
            .iter()
            .find(|annotation| annotation.from <= position && position < annotation.to)?
            .clone();

        match annotation.decode_match() {
            Ok(flagged) => Some((annotation, flagged)),
            Err(error) => {
                warn!("Annotation {} has an invalid payload: {error}", annotation.uuid);
                None
            }
        }
    }

    /// Wait for every spawned check and ignore list write to finish.
    pub async fn flush(&self) {
        loop {
            let tasks = std::mem::take(&mut *self.lock_tasks());
            if tasks.is_empty() {
                return;
            }

            for task in tasks {
                if let Err(error) = task.await {
                    warn!("Background task failed: {error}");
                }
            }
        }
    }

    fn schedule(&self, request: CheckRequest) {
        let sequence = self.next_sequence(request, SessionPhase::Scheduled);
        let session = self.clone();

        self.track(tokio::spawn(async move {
            tokio::time::sleep(session.inner.config.debounce()).await;

            let request = {
                let state = session.lock_state();
                if state.sequence != sequence {
                    debug!("Check #{sequence} got superseded while waiting");
                    return;
                }

                state.pending
            };

            if let Some(request) = request {
                session.run_check(sequence, request).await;
            }
        }));
    }

    async fn run_check(&self, sequence: u64, request: CheckRequest) {
        let config = &self.inner.config;

        if !config.checks_enabled() {
            debug!("Both spelling and grammar checks are disabled");
            self.finish(sequence);
            return;
        }

        if !self.advance(sequence, SessionPhase::Fetching) {
            return;
        }

        let (snapshot, flat, version) = {
            let host = self.inner.host.lock().await;
            let snapshot = Document::new(host.nodes().to_vec());
            let flat = extract(snapshot.nodes());

            // Edits can't slip in between the snapshot and the disarm
            if request == CheckRequest::Full {
                self.lock_state().detector.disarm();
            }

            (snapshot, flat, host.version())
        };

        let (fetched, scope) = match request {
            CheckRequest::Full => (
                self.inner.fetcher.fetch_full(&flat).await,
                ReconcileScope::Full,
            ),
            CheckRequest::Fragment(span) => {
                let fetched = self
                    .inner
                    .fetcher
                    .fetch_fragment(&flat, flat.offsets_for(span))
                    .await;
                let window = flat
                    .resolve(fetched.trusted.from, fetched.trusted.len())
                    .map_or(span, |window| window.union(&span));

                (fetched, ReconcileScope::Fragment(window))
            }
        };

        let matches = self
            .inner
            .filters
            .filter(fetched.matches, &snapshot, &flat, config)
            .await;

        if !self.advance(sequence, SessionPhase::Reconciling) {
            return;
        }

        let mut host = self.inner.host.lock().await;
        {
            let mut state = self.lock_state();
            if state.sequence != sequence {
                debug!("Discarding the stale result of check #{sequence}");
                return;
            }

            if host.version() != version {
                debug!("The document changed during check #{sequence}, discarding its result");
                state.phase = SessionPhase::Idle;
                return;
            }

            state.pending = None;
        }

        reconcile(&mut *host, &matches, &flat, scope);
        drop(host);

        self.finish(sequence);
    }

    /// Start a new request, superseding every earlier one.
    fn next_sequence(&self, request: CheckRequest, phase: SessionPhase) -> u64 {
        let mut state = self.lock_state();
        state.pending = Some(match state.pending {
            Some(pending) => pending.merge(request),
            None => request,
        });
        state.sequence += 1;
        state.phase = phase;

        state.sequence
    }

    /// Move to `phase` unless a newer request exists.
    fn advance(&self, sequence: u64, phase: SessionPhase) -> bool {
        let mut state = self.lock_state();
        if state.sequence != sequence {
            debug!("Discarding the stale result of check #{sequence}");
            return false;
        }

        state.phase = phase;
        true
    }

    fn finish(&self, sequence: u64) {
        let mut state = self.lock_state();
        if state.sequence == sequence {
            state.pending = None;
            state.phase = SessionPhase::Idle;
        }
    }

    fn track(&self, task: JoinHandle<()>) {
        let mut tasks = self.lock_tasks();
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
