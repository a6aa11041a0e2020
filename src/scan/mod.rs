//! Tree scanning and threshold checks.
//!
//! The scanner discovers Python files under a root, analyzes each one, and
//! keeps the files where the file or any of its functions is over threshold.

mod files;
mod runner;
mod types;

pub use files::{collect_files, display_path, Discovery, ExclusionFilter, PYTHON_EXTENSION};
pub use runner::{check_thresholds, Scanner};
pub use types::{FileIssue, FunctionIssue, ScanResult, Summary};
