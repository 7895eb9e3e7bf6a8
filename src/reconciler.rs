use log::{debug, info, warn};

use crate::{
    annotation::{Annotation, AnnotationBatch},
    document::{DocumentHost, Transaction},
    extract::FlatText,
    matches::Match,
    types::span::Span,
};

/// Which existing annotations a reconciliation replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileScope {
    /// Every annotation in the document.
    Full,
    /// Annotations intersecting the given document range.
    Fragment(Span),
}

impl ReconcileScope {
    #[must_use]
    pub fn covers(&self, range: Span) -> bool {
        match self {
            ReconcileScope::Full => true,
            ReconcileScope::Fragment(span) => span.intersects(&range),
        }
    }
}

/// Work out the annotation edits turning `existing` into annotations for
/// `matches`.
///
/// Matches are placed in offset order. One that can't be resolved to a
/// non-empty range within the document, or that would overlap an annotation
/// already placed or kept, is skipped.
#[must_use]
pub fn plan(
    matches: &[Match],
    flat: &FlatText,
    existing: &[Annotation],
    content_size: usize,
    scope: ReconcileScope,
) -> AnnotationBatch {
    let (removed, kept): (Vec<&Annotation>, Vec<&Annotation>) = existing
        .iter()
        .partition(|annotation| scope.covers(annotation.range()));

    let mut occupied: Vec<Span> = kept.iter().map(|annotation| annotation.range()).collect();

    let mut ordered: Vec<&Match> = matches.iter().collect();
    ordered.sort_by_key(|flagged| (flagged.offset, flagged.length));

    let mut add = Vec::with_capacity(ordered.len());
    for flagged in ordered {
        let Some(range) = flat.resolve(flagged.offset, flagged.length) else {
            debug!(
                "Skipping match {}..{} outside of the extracted text",
                flagged.offset,
                flagged.end()
            );
            continue;
        };

        if range.is_empty() || range.to > content_size {
            debug!(
                "Skipping match {}..{} resolving to {}..{}",
                flagged.offset,
                flagged.end(),
                range.from,
                range.to
            );
            continue;
        }

        if occupied.iter().any(|other| other.intersects(&range)) {
            debug!("Skipping match {}..{} overlapping another", range.from, range.to);
            continue;
        }

        match Annotation::from_match(flagged, range) {
            Ok(annotation) => {
                occupied.push(range);
                add.push(annotation);
            }
            Err(error) => warn!("Cannot serialise match: {error}"),
        }
    }

    AnnotationBatch {
        remove: removed.iter().map(|annotation| annotation.uuid).collect(),
        add,
    }
}

/// Replace the annotations in `scope` with ones for `matches`, as a single
/// system edit. `flat` must have been extracted from the current content of
/// `host`.
pub fn reconcile<H: DocumentHost + ?Sized>(
    host: &mut H,
    matches: &[Match],
    flat: &FlatText,
    scope: ReconcileScope,
) -> Transaction {
    let batch = plan(
        matches,
        flat,
        host.annotations(),
        host.content_size(),
        scope,
    );

    if batch.is_empty() {
        return Transaction::system(Vec::new());
    }

    info!(
        "Committing annotations: {} removed, {} added",
        batch.remove.len(),
        batch.add.len()
    );

    host.apply_annotations(batch)
}

/// Remove every annotation, e.g. before exporting the content.
pub fn strip_annotations<H: DocumentHost + ?Sized>(host: &mut H) -> Transaction {
    let remove = host
        .annotations()
        .iter()
        .map(|annotation| annotation.uuid)
        .collect();

    host.apply_annotations(AnnotationBatch {
        remove,
        add: Vec::new(),
    })
}
