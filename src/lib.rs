//! Codehealth - effective line counts for Python codebases.
//!
//! Codehealth measures how much real code a Python file or function holds.
//! Blank lines, `#` comments, and docstrings are not counted; everything
//! else is an *effective line*. Files and functions whose effective line
//! counts exceed configurable thresholds are reported.
//!
//! # Architecture
//!
//! The codebase uses tree-sitter to parse Python:
//!
//! - `analysis`: per-file pipeline (parse, docstring ranges, line counting,
//!   function extraction)
//! - `scan`: directory walking, exclusion rules, and threshold checks
//! - `config`: scan options and config file loading
//! - `report`: output formatting (console, JSON, HTML)
//! - `cli`: command-line front end
//!
//! # Example
//!
//! ```
//! use codehealth::{analyze_source, MethodRule};
//!
//! let text = "def greet():\n    \"\"\"Say hello.\"\"\"\n    print('hi')\n";
//! let analysis = analyze_source("greet.py", text, MethodRule::default());
//! assert_eq!(analysis.effective_lines, 2);
//! assert_eq!(analysis.functions[0].name, "greet");
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod report;
pub mod scan;

pub use analysis::{
    analyze_source, FileAnalysis, FunctionKind, FunctionRecord, MethodRule, ParseFailure,
};
pub use config::{ConfigError, ScanConfig};
pub use scan::{FileIssue, FunctionIssue, ScanResult, Scanner, Summary};
