use crate::{
    consts::{BLOCK_SEPARATOR, INLINE_PLACEHOLDER},
    document::{Node, descendants},
    types::span::Span,
};

/// The plain text of a document together with the document position of each
/// of its characters.
///
/// `mapping` has exactly one entry per character of `text` and is
/// non-decreasing, so it can be binary searched in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlatText {
    text: String,
    mapping: Vec<usize>,
}

/// Flatten a document tree into text that can be sent to a checking service.
///
/// Text characters map to their own position. Inline leaves become a single
/// placeholder space mapped to the leaf. Between blocks a newline is
/// inserted, mapped to the position right after the preceding inline
/// content; consecutive block boundaries produce a single newline and no
/// newline precedes the first text.
#[must_use]
pub fn extract(nodes: &[Node]) -> FlatText {
    let mut text = String::new();
    let mut mapping = Vec::new();
    let mut last_inline_end = 0;

    descendants(nodes, 0, &mut |node, position| match node {
        Node::Text { text: content } => {
            for (index, character) in content.chars().enumerate() {
                text.push(character);
                mapping.push(position + index);
            }
            last_inline_end = position + node.size();
        }
        Node::Inline { .. } => {
            text.push(INLINE_PLACEHOLDER);
            mapping.push(position);
            last_inline_end = position + 1;
        }
        Node::Block { .. } => {
            if !text.is_empty() && !text.ends_with(BLOCK_SEPARATOR) {
                text.push(BLOCK_SEPARATOR);
                mapping.push(last_inline_end);
            }
        }
    });

    debug_assert_eq!(text.chars().count(), mapping.len());
    debug_assert!(mapping.is_sorted(), "Mapping must be non-decreasing");

    FlatText { text, mapping }
}

impl FlatText {
    #[must_use]
    pub fn text(&self) -> &str { &self.text }

    #[must_use]
    pub fn mapping(&self) -> &[usize] { &self.mapping }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize { self.mapping.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.mapping.is_empty() }

    /// The characters within `span`.
    #[must_use]
    pub fn slice(&self, span: Span) -> String {
        self.text.chars().skip(span.from).take(span.len()).collect()
    }

    /// Resolve `length` characters starting at `offset` to a document range.
    /// The range ends right after the last character, so a match never
    /// reaches into the block boundary following it.
    ///
    /// Returns `None` if the range isn't fully covered by the mapping.
    #[must_use]
    pub fn resolve(&self, offset: usize, length: usize) -> Option<Span> {
        let from = *self.mapping.get(offset)?;

        if length == 0 {
            return Some(Span::new(from, from));
        }

        let last = *self.mapping.get(offset + length - 1)?;

        Some(Span::new(from, last + 1))
    }

    /// The range of characters whose positions fall within the document
    /// range `positions`.
    #[must_use]
    pub fn offsets_for(&self, positions: Span) -> Span {
        let from = self
            .mapping
            .partition_point(|&position| position < positions.from);
        let to = self
            .mapping
            .partition_point(|&position| position < positions.to);

        Span::new(from, to.max(from))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::document::{Document, DocumentHost};

    fn hello_world() -> Document {
        Document::new(vec![
            Node::paragraph(vec![
                Node::text("Hello "),
                Node::text("world"),
                Node::text("."),
            ]),
            Node::paragraph(vec![]),
            Node::paragraph(vec![Node::text("Foo bar.")]),
        ])
    }

    #[test]
    fn test_extract_text_and_mapping() {
        let flat = extract(hello_world().nodes());

        assert_eq!(flat.text(), "Hello world.\nFoo bar.");
        assert_eq!(
            flat.mapping(),
            &[
                1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, // "Hello world."
                13, // separator
                17, 18, 19, 20, 21, 22, 23, 24, // "Foo bar."
            ]
        );
    }

    #[test]
    fn test_resolve_matches_document_positions() {
        let document = hello_world();
        let flat = extract(document.nodes());

        let range = flat.resolve(6, 5).unwrap();

        assert_eq!(range, Span::new(7, 12));
        assert_eq!(document.text_between(range.from, range.to), "world");
        assert_eq!(flat.resolve(13, 3), Some(Span::new(17, 20)));
        assert_eq!(flat.resolve(19, 5), None);
        assert_eq!(flat.resolve(40, 1), None);
    }

    #[test]
    fn test_inline_leaves_become_placeholders() {
        let flat = extract(&[Node::paragraph(vec![
            Node::text("a"),
            Node::inline("image"),
            Node::text("b"),
        ])]);

        assert_eq!(flat.text(), "a b");
        assert_eq!(flat.mapping(), &[1, 2, 3]);
    }

    #[test]
    fn test_nested_blocks() {
        let flat = extract(&[
            Node::paragraph(vec![Node::text("a")]),
            Node::block(
                "bulletList",
                vec![
                    Node::block("listItem", vec![Node::paragraph(vec![Node::text("b")])]),
                    Node::block("listItem", vec![Node::paragraph(vec![Node::text("c")])]),
                ],
            ),
        ]);

        assert_eq!(flat.text(), "a\nb\nc");
        assert!(flat.mapping().is_sorted());
        assert_eq!(flat.mapping().len(), flat.text().chars().count());
    }

    #[test]
    fn test_mapping_invariant_with_multibyte_text() {
        let flat = extract(&[
            Node::paragraph(vec![Node::text("Grüße 😀")]),
            Node::paragraph(vec![Node::inline("formula"), Node::text("ok")]),
        ]);

        assert_eq!(flat.len(), flat.text().chars().count());
        assert!(flat.mapping().is_sorted());
        assert_eq!(flat.slice(Span::new(0, 5)), "Grüße");
    }

    #[test]
    fn test_offsets_for() {
        let flat = extract(hello_world().nodes());

        assert_eq!(flat.offsets_for(Span::new(7, 12)), Span::new(6, 11));
        assert_eq!(flat.offsets_for(Span::new(15, 18)), Span::new(13, 14));
        assert_eq!(flat.offsets_for(Span::new(30, 30)), Span::new(21, 21));
    }

    #[test]
    fn test_empty_document() {
        let flat = extract(&[]);

        assert!(flat.is_empty());
        assert_eq!(flat.resolve(0, 0), None);
    }
}
