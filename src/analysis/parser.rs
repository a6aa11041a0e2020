//! Tree-sitter adapter for Python source.
//!
//! Wraps `tree-sitter-python` and exposes the handful of tree queries the
//! rest of the analysis needs: node classification, body statements,
//! definition names and line positions.

use once_cell::sync::Lazy;
use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Tree};

use super::SourceText;

/// The Python grammar, loaded once per process.
static PYTHON: Lazy<Language> = Lazy::new(|| tree_sitter_python::LANGUAGE.into());

/// Why a source text produced no usable syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("python grammar could not be loaded: {0}")]
    Grammar(String),
    #[error("parser produced no syntax tree")]
    NoTree,
    #[error("syntax error near line {line}")]
    Syntax { line: usize },
}

/// Node kinds the analysis cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Module,
    Class,
    Function,
    AsyncFunction,
    Other,
}

impl NodeKind {
    /// Classify a tree-sitter node.
    pub fn of(node: Node) -> Self {
        match node.kind() {
            "module" => NodeKind::Module,
            "class_definition" => NodeKind::Class,
            "function_definition" => {
                let is_async = node.child(0).is_some_and(|first| first.kind() == "async");
                if is_async {
                    NodeKind::AsyncFunction
                } else {
                    NodeKind::Function
                }
            }
            _ => NodeKind::Other,
        }
    }

    /// Whether this kind owns a statement body that may start with a docstring.
    pub fn has_body(&self) -> bool {
        !matches!(self, NodeKind::Other)
    }

    /// Check if this is a function definition (sync or async).
    pub fn is_function(&self) -> bool {
        matches!(self, NodeKind::Function | NodeKind::AsyncFunction)
    }
}

/// A successfully parsed source text.
pub struct SyntaxTree<'src> {
    tree: Tree,
    source: &'src SourceText,
}

impl<'src> SyntaxTree<'src> {
    /// The `module` node.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// The source this tree was parsed from.
    pub fn source(&self) -> &'src SourceText {
        self.source
    }

    /// Get the source text covered by a node.
    pub fn node_text(&self, node: Node) -> &'src str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Name of a class or function definition.
    pub fn definition_name(&self, node: Node) -> Option<&'src str> {
        node.child_by_field_name("name")
            .map(|name| self.node_text(name))
            .filter(|name| !name.is_empty())
    }
}

/// Parse Python source.
///
/// tree-sitter recovers from syntax errors by inserting ERROR and MISSING
/// nodes; any such node makes the whole file a [`ParseFailure`], so callers
/// never see a partially recovered tree.
pub fn parse(source: &SourceText) -> Result<SyntaxTree<'_>, ParseFailure> {
    let mut parser = Parser::new();
    parser
        .set_language(&PYTHON)
        .map_err(|e| ParseFailure::Grammar(e.to_string()))?;

    let tree = parser
        .parse(source.as_str(), None)
        .ok_or(ParseFailure::NoTree)?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return Err(ParseFailure::Syntax { line });
    }
    if let Some(line) = first_python2_line(root) {
        return Err(ParseFailure::Syntax { line });
    }

    Ok(SyntaxTree { tree, source })
}

/// Statement kinds the grammar still accepts from Python 2.
const PYTHON2_STATEMENTS: &[&str] = &["print_statement", "exec_statement"];

/// Line of the first ERROR or MISSING node in document order.
fn first_error_line(root: Node) -> Option<usize> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

/// Line of the first Python 2 only statement (`print x`, `exec code`).
fn first_python2_line(root: Node) -> Option<usize> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if PYTHON2_STATEMENTS.contains(&node.kind()) {
            return Some(node.start_position().row + 1);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

/// Statements of a module, class or function body, comments excluded.
///
/// Returns an empty list for any other node.
pub fn body_statements<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let container = match NodeKind::of(node) {
        NodeKind::Module => Some(node),
        NodeKind::Class | NodeKind::Function | NodeKind::AsyncFunction => {
            node.child_by_field_name("body")
        }
        NodeKind::Other => None,
    };

    let Some(container) = container else {
        return Vec::new();
    };

    let mut cursor = container.walk();
    container
        .named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

/// First row (0-indexed) of a node.
pub fn start_row(node: Node) -> usize {
    node.start_position().row
}

/// Last row (0-indexed) a node occupies.
///
/// A node that ends at column 0 of a later row does not occupy that row.
/// Returns None for zero-width MISSING nodes.
pub fn end_row(node: Node) -> Option<usize> {
    if node.is_missing() {
        return None;
    }
    let start = node.start_position();
    let end = node.end_position();
    if end.column == 0 && end.row > start.row {
        Some(end.row - 1)
    } else {
        Some(end.row)
    }
}

/// Last row holding a token of this node, ignoring trailing comments.
///
/// tree-sitter attaches comments that follow the last statement of an
/// indented block to that block; they are not part of the code span.
pub fn content_end_row(node: Node) -> Option<usize> {
    let mut node = node;
    loop {
        let mut cursor = node.walk();
        let last = node.children(&mut cursor).filter(|child| !child.is_extra()).last();
        match last {
            Some(child) => node = child,
            None => return end_row(node),
        }
    }
}
