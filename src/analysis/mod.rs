//! Effective-line analysis of Python source.
//!
//! Each file goes through four steps, all pure functions of its text:
//!
//! ```text
//! ┌─────────────┐   ┌──────────┐   ┌────────────┐   ┌─────────────────┐
//! │ SourceText  │──▶│ parse    │──▶│ DocRanges  │──▶│ LineCounter     │
//! │ (lines)     │   │ (tree)   │   │ (docstring │   │ (file + per-    │
//! └─────────────┘   └──────────┘   │  lines)    │   │  function count)│
//!                                  └────────────┘   └─────────────────┘
//! ```
//!
//! When the source does not parse, the file is analyzed in degraded mode:
//! every non-blank, non-comment line counts and no functions are reported.

mod counter;
mod docstrings;
mod functions;
pub mod parser;
mod source;

pub use counter::{LineClass, LineCounter, COMMENT_MARKER};
pub use docstrings::DocRanges;
pub use functions::{extract_functions, FunctionKind, FunctionRecord, MethodRule};
pub use parser::{NodeKind, ParseFailure, SyntaxTree};
pub use source::SourceText;

/// Everything the analysis learns about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAnalysis {
    /// File identifier supplied by the caller.
    pub path: String,
    /// Number of physical lines.
    pub total_lines: usize,
    /// Effective lines in the whole file.
    pub effective_lines: usize,
    /// Functions and methods in declaration order.
    pub functions: Vec<FunctionRecord>,
    /// Why structural analysis was skipped, if it was.
    pub parse_error: Option<ParseFailure>,
}

impl FileAnalysis {
    /// Whether the file was counted in degraded mode.
    pub fn is_degraded(&self) -> bool {
        self.parse_error.is_some()
    }
}

/// Analyze one file's text.
pub fn analyze_source(path: &str, text: &str, rule: MethodRule) -> FileAnalysis {
    let source = SourceText::new(text);
    let total_lines = source.line_count();

    match parser::parse(&source) {
        Ok(tree) => {
            let docs = DocRanges::detect(&tree);
            let counter = LineCounter::new(&source, &docs);
            FileAnalysis {
                path: path.to_string(),
                total_lines,
                effective_lines: counter.count_all(),
                functions: extract_functions(&tree, &counter, rule),
                parse_error: None,
            }
        }
        Err(failure) => {
            tracing::debug!(path, %failure, "counting lines without structure");
            let docs = DocRanges::empty();
            let counter = LineCounter::new(&source, &docs);
            FileAnalysis {
                path: path.to_string(),
                total_lines,
                effective_lines: counter.count_all(),
                functions: Vec::new(),
                parse_error: Some(failure),
            }
        }
    }
}
