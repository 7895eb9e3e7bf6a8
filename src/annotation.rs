use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    matches::{Match, StyleClass},
    types::span::Span,
};

/// A live decoration attached to the document range `[from, to)`.
///
/// The `uuid` identifies the annotation independently of its position, which
/// changes as the document is edited around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub uuid: Uuid,
    pub from: usize,
    pub to: usize,
    /// The serialised `Match` this annotation was created from.
    pub payload: String,
    pub style: StyleClass,
}

impl Annotation {
    /// # Errors
    ///
    /// Fails if the match cannot be serialised.
    pub fn from_match(flagged: &Match, range: Span) -> Result<Self, serde_json::Error> {
        Ok(Self {
            uuid: Uuid::new_v4(),
            from: range.from,
            to: range.to,
            payload: serde_json::to_string(flagged)?,
            style: flagged.category().style_class(),
        })
    }

    #[must_use]
    pub fn range(&self) -> Span { Span::new(self.from, self.to) }

    /// # Errors
    ///
    /// Fails if the payload isn't a serialised `Match`.
    pub fn decode_match(&self) -> Result<Match, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }
}

/// Annotation removals and additions applied to a document as one atomic
/// edit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotationBatch {
    pub remove: Vec<Uuid>,
    pub add: Vec<Annotation>,
}

impl AnnotationBatch {
    #[must_use]
    pub fn is_empty(&self) -> bool { self.remove.is_empty() && self.add.is_empty() }
}
