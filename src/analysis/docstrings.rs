//! Documentation string detection.
//!
//! A docstring is a bare string literal used as the first statement of a
//! module, class or function body. This module records the physical lines
//! those literals occupy so the line counter can skip them.

use std::collections::BTreeSet;

use tree_sitter::Node;

use super::parser::{body_statements, end_row, start_row, NodeKind, SyntaxTree};

/// String prefixes that still produce a plain `str` constant.
const PLAIN_PREFIX_CHARS: &[char] = &['r', 'R', 'u', 'U'];

/// 0-indexed physical lines covered by docstrings.
///
/// Every index is below the line count of the source it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocRanges {
    lines: BTreeSet<usize>,
}

impl DocRanges {
    /// No documentation lines (used in degraded mode).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Walk the tree and collect the lines of every docstring.
    pub fn detect(tree: &SyntaxTree<'_>) -> Self {
        let line_count = tree.source().line_count();
        let mut ranges = Self::empty();

        let mut stack = vec![tree.root()];
        while let Some(node) = stack.pop() {
            if NodeKind::of(node).has_body() {
                if let Some(stmt) = docstring_statement(tree, node) {
                    let start = start_row(stmt);
                    let end = end_row(stmt)
                        .unwrap_or_else(|| estimate_end_row(start, tree.node_text(stmt)));
                    ranges.insert_span(start, end, line_count);
                }
            }

            let mut cursor = node.walk();
            stack.extend(node.named_children(&mut cursor));
        }

        ranges
    }

    /// Check whether a 0-indexed line belongs to a docstring.
    pub fn contains(&self, line: usize) -> bool {
        self.lines.contains(&line)
    }

    /// Number of documentation lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Documentation lines in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.iter().copied()
    }

    /// Record rows `start..=end`, clipped to `[0, line_count)`.
    fn insert_span(&mut self, start: usize, end: usize, line_count: usize) {
        let end = end.saturating_add(1).min(line_count);
        self.lines.extend(start..end);
    }
}

/// The docstring statement of a module, class or function node, if any.
fn docstring_statement<'t>(tree: &SyntaxTree<'_>, node: Node<'t>) -> Option<Node<'t>> {
    let first = body_statements(node).into_iter().next()?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    let value = unwrap_parens(first.named_child(0)?)?;
    is_plain_string(tree, value).then_some(first)
}

/// Strip `( ... )` layers around an expression. Returns None when a layer
/// holds anything other than a single expression.
fn unwrap_parens(node: Node) -> Option<Node> {
    let mut node = node;
    while node.kind() == "parenthesized_expression" {
        let mut cursor = node.walk();
        let inner: Vec<_> = node
            .named_children(&mut cursor)
            .filter(|child| !child.is_extra())
            .collect();
        let [only] = inner.as_slice() else {
            return None;
        };
        node = *only;
    }
    Some(node)
}

/// A single string literal without interpolation or a bytes prefix.
///
/// Adjacent literals (`"a" "b"`) parse as `concatenated_string` and are
/// rejected by the kind check.
fn is_plain_string(tree: &SyntaxTree<'_>, node: Node) -> bool {
    if node.kind() != "string" {
        return false;
    }

    let mut cursor = node.walk();
    let has_interpolation = node
        .named_children(&mut cursor)
        .any(|child| child.kind() == "interpolation");
    if has_interpolation {
        return false;
    }

    let text = tree.node_text(node);
    let Some(quote) = text.find(['"', '\'']) else {
        return false;
    };
    text[..quote].chars().all(|c| PLAIN_PREFIX_CHARS.contains(&c))
}

/// Estimate the last row of a literal from its text when the parser gives no
/// end position.
fn estimate_end_row(start: usize, literal: &str) -> usize {
    start + literal.matches('\n').count()
}
