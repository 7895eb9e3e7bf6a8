use crate::{document::Transaction, types::span::Span};

/// What a scheduled check covers. Spans are document positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckRequest {
    Full,
    Fragment(Span),
}

impl CheckRequest {
    /// A request covering both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (CheckRequest::Fragment(left), CheckRequest::Fragment(right)) => {
                CheckRequest::Fragment(left.union(&right))
            }
            _ => CheckRequest::Full,
        }
    }

    /// Follow the document through `transaction`.
    #[must_use]
    pub fn map(self, transaction: &Transaction) -> Self {
        match self {
            CheckRequest::Full => CheckRequest::Full,
            CheckRequest::Fragment(span) => CheckRequest::Fragment(transaction.map_span(span)),
        }
    }
}
