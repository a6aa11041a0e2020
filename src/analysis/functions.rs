//! Function and method extraction.

use std::fmt;

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use super::parser::{body_statements, content_end_row, end_row, NodeKind, SyntaxTree};
use super::LineCounter;

/// Whether a definition is a plain function or a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Function,
    Method,
}

impl FunctionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionKind::Function => "function",
            FunctionKind::Method => "method",
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How definitions nested inside classes are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodRule {
    /// Any definition with a class somewhere above it is a method, even when
    /// function scopes sit in between.
    #[default]
    EnclosingClass,
    /// Only definitions whose nearest enclosing class-or-function scope is a
    /// class are methods.
    NearestScope,
}

/// One function or method definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub kind: FunctionKind,
    pub enclosing_class: Option<String>,
    /// Line of the `def` keyword (1-indexed).
    pub start_line: usize,
    /// Last line of the body (1-indexed, inclusive).
    pub end_line: usize,
    pub effective_lines: usize,
}

impl FunctionRecord {
    /// Physical length of the span.
    pub fn span_lines(&self) -> usize {
        self.end_line + 1 - self.start_line
    }

    /// `Class.name` for methods with a known class, otherwise `name`.
    pub fn qualified_name(&self) -> String {
        match &self.enclosing_class {
            Some(class) => format!("{}.{}", class, self.name),
            None => self.name.clone(),
        }
    }
}

/// Enclosing scope carried down the walk.
#[derive(Debug, Clone, Copy, Default)]
struct Scope<'s> {
    class: Option<&'s str>,
    nearest_is_class: bool,
}

impl Scope<'_> {
    fn kind(&self, rule: MethodRule) -> FunctionKind {
        let is_method = match rule {
            MethodRule::EnclosingClass => self.class.is_some(),
            MethodRule::NearestScope => self.nearest_is_class,
        };
        if is_method {
            FunctionKind::Method
        } else {
            FunctionKind::Function
        }
    }
}

/// Extract every function and method in tree pre-order.
pub fn extract_functions(
    tree: &SyntaxTree<'_>,
    counter: &LineCounter<'_>,
    rule: MethodRule,
) -> Vec<FunctionRecord> {
    let mut records = Vec::new();
    let mut stack = vec![(tree.root(), Scope::default())];

    while let Some((node, scope)) = stack.pop() {
        let inner = match NodeKind::of(node) {
            NodeKind::Class => Scope {
                class: Some(tree.definition_name(node).unwrap_or("<class>")),
                nearest_is_class: true,
            },
            NodeKind::Function | NodeKind::AsyncFunction => {
                records.push(function_record(tree, counter, node, scope, rule));
                Scope {
                    nearest_is_class: false,
                    ..scope
                }
            }
            NodeKind::Module | NodeKind::Other => scope,
        };

        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev().map(|child| (child, inner)));
    }

    records
}

fn function_record(
    tree: &SyntaxTree<'_>,
    counter: &LineCounter<'_>,
    node: Node,
    scope: Scope<'_>,
    rule: MethodRule,
) -> FunctionRecord {
    let (start_line, end_line) = definition_lines(node);

    FunctionRecord {
        name: tree.definition_name(node).unwrap_or("<lambda>").to_string(),
        kind: scope.kind(rule),
        enclosing_class: scope.class.map(str::to_string),
        start_line,
        end_line,
        effective_lines: counter.count_effective_lines(start_line - 1, end_line),
    }
}

/// 1-indexed inclusive line span of a definition.
///
/// The end is the last code token of the definition. Without position data
/// for it, the end of the last body statement is used, and a definition
/// with no body ends on its own line.
fn definition_lines(node: Node) -> (usize, usize) {
    let start_line = node.start_position().row + 1;
    let end_line = content_end_row(node)
        .or_else(|| body_statements(node).last().and_then(|last| end_row(*last)))
        .map_or(start_line, |row| row + 1)
        .max(start_line);
    (start_line, end_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::parser::parse;
    use crate::analysis::{DocRanges, SourceText};

    fn extract(text: &str, rule: MethodRule) -> Vec<FunctionRecord> {
        let source = SourceText::new(text);
        let tree = parse(&source).unwrap();
        let docs = DocRanges::detect(&tree);
        let counter = LineCounter::new(&source, &docs);
        extract_functions(&tree, &counter, rule)
    }

    #[test]
    fn test_plain_function() {
        let text = r#"def add(a, b):
    """Add two numbers."""
    # sum them
    result = a + b

    return result
"#;
        let records = extract(text, MethodRule::default());
        assert_eq!(records.len(), 1);
        let add = &records[0];
        assert_eq!(add.name, "add");
        assert_eq!(add.kind, FunctionKind::Function);
        assert_eq!(add.enclosing_class, None);
        assert_eq!((add.start_line, add.end_line), (1, 6));
        assert_eq!(add.effective_lines, 3);
    }

    #[test]
    fn test_methods_and_preorder() {
        let text = r#"class Service:
    def start(self):
        def helper():
            return 1
        return helper()

    async def stop(self):
        pass

def main():
    pass
"#;
        let records = extract(text, MethodRule::EnclosingClass);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["start", "helper", "stop", "main"]);

        assert_eq!(records[0].kind, FunctionKind::Method);
        assert_eq!(records[0].enclosing_class.as_deref(), Some("Service"));
        // nested in a method, still labelled a method
        assert_eq!(records[1].kind, FunctionKind::Method);
        assert_eq!(records[1].enclosing_class.as_deref(), Some("Service"));
        assert_eq!(records[2].kind, FunctionKind::Method);
        assert_eq!(records[3].kind, FunctionKind::Function);
        assert_eq!(records[3].enclosing_class, None);
    }

    #[test]
    fn test_nearest_scope_rule() {
        let text = r#"class Service:
    def start(self):
        def helper():
            return 1
        return helper()
"#;
        let records = extract(text, MethodRule::NearestScope);
        assert_eq!(records[0].kind, FunctionKind::Method);
        assert_eq!(records[1].name, "helper");
        assert_eq!(records[1].kind, FunctionKind::Function);
    }

    #[test]
    fn test_class_context_is_restored() {
        let text = r#"class Outer:
    class Inner:
        def inner_method(self):
            pass

    def outer_method(self):
        pass

def free():
    pass
"#;
        let records = extract(text, MethodRule::default());
        assert_eq!(records[0].enclosing_class.as_deref(), Some("Inner"));
        assert_eq!(records[1].enclosing_class.as_deref(), Some("Outer"));
        assert_eq!(records[2].enclosing_class, None);
        assert_eq!(records[2].kind, FunctionKind::Function);
    }

    #[test]
    fn test_decorated_function_starts_at_def() {
        let text = "@decorator\n@other(1)\ndef wrapped():\n    return 1\n";
        let records = extract(text, MethodRule::default());
        assert_eq!((records[0].start_line, records[0].end_line), (3, 4));
        assert_eq!(records[0].effective_lines, 2);
    }

    #[test]
    fn test_trailing_comment_not_in_span() {
        let text = "def f():\n    x = 1\n    # done\n\ny = 2\n";
        let records = extract(text, MethodRule::default());
        assert_eq!(records[0].end_line, 2);
    }

    #[test]
    fn test_multiline_call_end_line() {
        let text = "def f():\n    return call(\n        1,\n    )\n";
        let records = extract(text, MethodRule::default());
        assert_eq!(records[0].end_line, 4);
        assert_eq!(records[0].effective_lines, 4);
    }

    #[test]
    fn test_lambdas_are_not_recorded() {
        let records = extract("square = lambda x: x * x\n", MethodRule::default());
        assert!(records.is_empty());
    }

    #[test]
    fn test_qualified_name() {
        let records = extract("class A:\n    def b(self):\n        pass\n", MethodRule::default());
        assert_eq!(records[0].qualified_name(), "A.b");
        assert_eq!(records[0].span_lines(), 2);
    }
}
