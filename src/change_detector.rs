use log::debug;

use crate::{document::Transaction, types::span::Span};

/// Decides which part of the document needs checking after a transaction.
///
/// The first edit after the detector gets armed is swallowed: editors
/// commonly normalise the freshly loaded document right away, and that
/// shouldn't trigger a second round trip while the initial full check is
/// about to run.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    suppress_next: bool,
}

impl ChangeDetector {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Swallow the next user edit.
    pub fn arm(&mut self) { self.suppress_next = true; }

    pub fn disarm(&mut self) { self.suppress_next = false; }

    #[must_use]
    pub fn is_armed(&self) -> bool { self.suppress_next }

    /// The span, in positions of the document after `transaction`, covering
    /// every change it made. `None` if there is nothing to check.
    pub fn detect_span(&mut self, transaction: &Transaction) -> Option<Span> {
        if transaction.is_system_edit() {
            return None;
        }

        let changed = transaction
            .changed_ranges()
            .into_iter()
            .reduce(|union, span| union.union(&span))?;

        if self.suppress_next {
            debug!("Skipping the first edit after start");
            self.suppress_next = false;
            return None;
        }

        Some(changed)
    }
}
