mod node;
mod transaction;

use std::fmt::Debug;

pub use node::{Node, content_size, descendants};
use thiserror::Error;
pub use transaction::{Assoc, Step, Transaction};
use uuid::Uuid;

use crate::annotation::{Annotation, AnnotationBatch};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Range {from}..{to} is outside of the document (of size {size})")]
    OutOfBounds { from: usize, to: usize, size: usize },

    #[error("Range {from}..{to} isn't contained by a single textblock")]
    RangeSpansBlocks { from: usize, to: usize },

    #[error("No annotation with id {0}")]
    UnknownAnnotation(Uuid),
}

/// The editing surface the annotation engine is attached to: a readable
/// tree, a transactional edit API and the annotations living on it.
///
/// Hosts are expected to forward every committed `Transaction` to
/// `ProofreadSession::handle_transaction`.
pub trait DocumentHost: Debug + Send + 'static {
    fn nodes(&self) -> &[Node];

    /// Incremented on every content change.
    fn version(&self) -> u64;

    fn content_size(&self) -> usize { content_size(self.nodes()) }

    fn text_between(&self, from: usize, to: usize) -> String {
        text_between(self.nodes(), from, to)
    }

    fn annotations(&self) -> &[Annotation];

    /// Apply removals and additions as one edit, tagged as a system edit.
    fn apply_annotations(&mut self, batch: AnnotationBatch) -> Transaction;

    /// Replace the content in `[from, to)` with `text`.
    ///
    /// # Errors
    ///
    /// Fails when the range doesn't fit in the document.
    fn replace(&mut self, from: usize, to: usize, text: &str) -> Result<Transaction, DocumentError>;

    fn annotation(&self, uuid: Uuid) -> Option<&Annotation> {
        self.annotations()
            .iter()
            .find(|annotation| annotation.uuid == uuid)
    }
}

/// An in-memory rich-text document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    nodes: Vec<Node>,
    annotations: Vec<Annotation>,
    version: u64,
}

impl Document {
    #[must_use]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            annotations: Vec::new(),
            version: 0,
        }
    }

    /// Build a document with one paragraph per blank-line separated block of
    /// `text`. Line breaks within a paragraph become spaces.
    #[must_use]
    pub fn from_plain_text(text: &str) -> Self {
        let mut paragraphs = Vec::new();
        let mut lines: Vec<&str> = Vec::new();

        for line in text.lines().chain(std::iter::once("")) {
            if line.trim().is_empty() {
                if !lines.is_empty() {
                    paragraphs.push(Node::paragraph(vec![Node::text(&lines.join(" "))]));
                    lines.clear();
                }
            } else {
                lines.push(line.trim_end());
            }
        }

        Self::new(paragraphs)
    }
}

impl DocumentHost for Document {
    fn nodes(&self) -> &[Node] { &self.nodes }

    fn version(&self) -> u64 { self.version }

    fn annotations(&self) -> &[Annotation] { &self.annotations }

    fn apply_annotations(&mut self, batch: AnnotationBatch) -> Transaction {
        let mut steps = Vec::with_capacity(batch.remove.len() + batch.add.len());

        self.annotations.retain(|annotation| {
            if batch.remove.contains(&annotation.uuid) {
                steps.push(Step::RemoveAnnotation {
                    from: annotation.from,
                    to: annotation.to,
                });
                false
            } else {
                true
            }
        });

        for annotation in batch.add {
            debug_assert!(
                annotation.from < annotation.to && annotation.to <= self.content_size(),
                "Annotations must cover a non-empty range within the document"
            );

            steps.push(Step::AddAnnotation {
                from: annotation.from,
                to: annotation.to,
            });
            self.annotations.push(annotation);
        }

        self.annotations
            .sort_by_key(|annotation| (annotation.from, annotation.to));

        Transaction::system(steps)
    }

    fn replace(
        &mut self,
        from: usize,
        to: usize,
        text: &str,
    ) -> Result<Transaction, DocumentError> {
        let size = self.content_size();
        if from > to || to > size {
            return Err(DocumentError::OutOfBounds { from, to, size });
        }

        let inserted = text.chars().count();
        if from == to && inserted == 0 {
            return Ok(Transaction::default());
        }

        if !replace_in(&mut self.nodes, 0, from, to, text) {
            return Err(DocumentError::RangeSpansBlocks { from, to });
        }

        let step = Step::Replace { from, to, inserted };

        // Annotations whose whole range got replaced collapse and are dropped
        self.annotations.retain_mut(|annotation| {
            annotation.from = step.map(annotation.from, Assoc::After);
            annotation.to = step.map(annotation.to, Assoc::Before);
            annotation.from < annotation.to
        });

        self.version += 1;

        Ok(Transaction::new(vec![step]))
    }
}

fn text_between(nodes: &[Node], from: usize, to: usize) -> String {
    let mut result = String::new();

    descendants(nodes, 0, &mut |node, position| {
        if let Node::Text { text } = node {
            result.extend(
                text.chars()
                    .enumerate()
                    .filter(|(index, _)| (from..to).contains(&(position + index)))
                    .map(|(_, character)| character),
            );
        }
    });

    result
}

fn replace_in(nodes: &mut [Node], start: usize, from: usize, to: usize, text: &str) -> bool {
    let mut position = start;

    for node in nodes.iter_mut() {
        let size = node.size();
        let is_textblock = node.is_textblock();

        if let Node::Block { children, .. } = node {
            let content_from = position + 1;
            let content_to = position + size - 1;

            if content_from <= from && to <= content_to {
                if is_textblock {
                    replace_inline(children, content_from, from, to, text);
                    return true;
                }

                return replace_in(children, content_from, from, to, text);
            }
        }

        position += size;
    }

    false
}

enum Atom {
    /// A character and the index of the text node it belongs to.
    Character(char, usize),
    Leaf(Node),
}

/// Splice `text` into the inline content of a textblock while keeping the
/// boundaries of untouched text nodes.
fn replace_inline(children: &mut Vec<Node>, start: usize, from: usize, to: usize, text: &str) {
    let mut atoms = Vec::new();
    for (group, child) in children.drain(..).enumerate() {
        match child {
            Node::Text { text } => {
                atoms.extend(text.chars().map(|character| Atom::Character(character, group)));
            }
            leaf => atoms.push(Atom::Leaf(leaf)),
        }
    }

    let (local_from, local_to) = (from - start, to - start);
    let group_of = |atom: &Atom| match atom {
        Atom::Character(_, group) => Some(*group),
        Atom::Leaf(_) => None,
    };
    let group = atoms[..local_from]
        .iter()
        .rev()
        .find_map(group_of)
        .or_else(|| atoms[local_to..].iter().find_map(group_of))
        .unwrap_or(usize::MAX);

    atoms.splice(
        local_from..local_to,
        text.chars()
            .map(|character| Atom::Character(character, group)),
    );

    let mut current: Option<(usize, String)> = None;
    for atom in atoms {
        match atom {
            Atom::Character(character, group) => match &mut current {
                Some((current_group, buffer)) if *current_group == group => buffer.push(character),
                _ => {
                    if let Some((_, buffer)) = current.take() {
                        children.push(Node::Text { text: buffer });
                    }
                    current = Some((group, character.to_string()));
                }
            },
            Atom::Leaf(leaf) => {
                if let Some((_, buffer)) = current.take() {
                    children.push(Node::Text { text: buffer });
                }
                children.push(leaf);
            }
        }
    }

    if let Some((_, buffer)) = current {
        children.push(Node::Text { text: buffer });
    }
}
