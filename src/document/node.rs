use serde::{Deserialize, Serialize};

/// A node of a rich-text document tree.
///
/// Positions follow the usual rich-text convention: opening and closing a
/// block each take up one position, every character of a text node takes
/// one, and an inline leaf (an image, a formula) takes exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Block { kind: String, children: Vec<Node> },
    Text { text: String },
    Inline { kind: String },
}

impl Node {
    #[must_use]
    pub fn block(kind: &str, children: Vec<Node>) -> Self {
        Self::Block {
            kind: kind.to_owned(),
            children,
        }
    }

    #[must_use]
    pub fn paragraph(children: Vec<Node>) -> Self { Self::block("paragraph", children) }

    #[must_use]
    pub fn text(text: &str) -> Self {
        Self::Text {
            text: text.to_owned(),
        }
    }

    #[must_use]
    pub fn inline(kind: &str) -> Self {
        Self::Inline {
            kind: kind.to_owned(),
        }
    }

    /// The number of positions the node takes up.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Node::Block { children, .. } => 2 + content_size(children),
            Node::Text { text } => text.chars().count(),
            Node::Inline { .. } => 1,
        }
    }

    /// A block holding only inline content.
    #[must_use]
    pub fn is_textblock(&self) -> bool {
        match self {
            Node::Block { children, .. } => children
                .iter()
                .all(|child| !matches!(child, Node::Block { .. })),
            _ => false,
        }
    }
}

#[must_use]
pub fn content_size(nodes: &[Node]) -> usize { nodes.iter().map(Node::size).sum() }

/// Visit every node depth-first in document order together with the position
/// right before it. `start` is the position of the first node in `nodes`.
pub fn descendants<'a>(nodes: &'a [Node], start: usize, visit: &mut impl FnMut(&'a Node, usize)) {
    let mut position = start;

    for node in nodes {
        visit(node, position);

        if let Node::Block { children, .. } = node {
            descendants(children, position + 1, visit);
        }

        position += node.size();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_sizes() {
        let paragraph = Node::paragraph(vec![
            Node::text("Hello "),
            Node::inline("image"),
            Node::text("wörld"),
        ]);

        assert_eq!(paragraph.size(), 2 + 6 + 1 + 5);
        assert!(paragraph.is_textblock());
        assert!(!Node::block("blockquote", vec![paragraph]).is_textblock());
    }

    #[test]
    fn test_descendants_positions() {
        let nodes = vec![
            Node::paragraph(vec![Node::text("ab")]),
            Node::block(
                "blockquote",
                vec![Node::paragraph(vec![Node::text("c")])],
            ),
        ];

        let mut visited = Vec::new();
        descendants(&nodes, 0, &mut |node, position| {
            let label = match node {
                Node::Block { kind, .. } => kind.clone(),
                Node::Text { text } => text.clone(),
                Node::Inline { kind } => kind.clone(),
            };
            visited.push((label, position));
        });

        assert_eq!(
            visited,
            vec![
                ("paragraph".to_owned(), 0),
                ("ab".to_owned(), 1),
                ("blockquote".to_owned(), 4),
                ("paragraph".to_owned(), 5),
                ("c".to_owned(), 6),
            ]
        );
    }
}
