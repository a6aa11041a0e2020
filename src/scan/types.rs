//! Violation records produced by a scan.

use serde::{Deserialize, Serialize};

use crate::analysis::{FunctionKind, FunctionRecord};

/// A function or method over the function threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionIssue {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FunctionKind,
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub enclosing_class: Option<String>,
    pub start_line: usize,
    pub end_line: usize,
    pub effective_lines: usize,
}

impl From<&FunctionRecord> for FunctionIssue {
    fn from(record: &FunctionRecord) -> Self {
        Self {
            name: record.name.clone(),
            kind: record.kind,
            enclosing_class: record.enclosing_class.clone(),
            start_line: record.start_line,
            end_line: record.end_line,
            effective_lines: record.effective_lines,
        }
    }
}

/// A file that is over the file threshold, holds functions over the function
/// threshold, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIssue {
    /// Path relative to the scan root, `/`-separated.
    pub file_path: String,
    pub total_lines: usize,
    pub effective_lines: usize,
    /// Whether the file itself is over the file threshold.
    pub exceeds_threshold: bool,
    #[serde(default)]
    pub functions: Vec<FunctionIssue>,
}

/// Totals across a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_issues: usize,
    pub files_exceeding_threshold: usize,
    pub functions_exceeding_threshold: usize,
    pub file_threshold: usize,
    pub function_threshold: usize,
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub parse_failures: usize,
}

/// Results of scanning a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Files with violations, sorted by path.
    pub issues: Vec<FileIssue>,
    /// Number of files analyzed.
    pub scanned: usize,
    /// Files or directories that could not be read.
    pub skipped: usize,
    /// Paths analyzed in degraded mode because they did not parse.
    pub parse_failures: Vec<String>,
    pub file_threshold: usize,
    pub function_threshold: usize,
}

impl ScanResult {
    /// Whether any file or function is over its threshold.
    pub fn has_violations(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Number of violating functions across all files.
    pub fn function_issue_count(&self) -> usize {
        self.issues.iter().map(|issue| issue.functions.len()).sum()
    }

    /// Number of files over the file threshold.
    pub fn file_issue_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.exceeds_threshold)
            .count()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total_issues: self.issues.len(),
            files_exceeding_threshold: self.file_issue_count(),
            functions_exceeding_threshold: self.function_issue_count(),
            file_threshold: self.file_threshold,
            function_threshold: self.function_threshold,
            files_scanned: self.scanned,
            files_skipped: self.skipped,
            parse_failures: self.parse_failures.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function_issue(name: &str) -> FunctionIssue {
        FunctionIssue {
            name: name.to_string(),
            kind: FunctionKind::Function,
            enclosing_class: None,
            start_line: 1,
            end_line: 80,
            effective_lines: 70,
        }
    }

    #[test]
    fn test_summary_counts() {
        let result = ScanResult {
            issues: vec![
                FileIssue {
                    file_path: "big.py".to_string(),
                    total_lines: 900,
                    effective_lines: 700,
                    exceeds_threshold: true,
                    functions: vec![function_issue("a"), function_issue("b")],
                },
                FileIssue {
                    file_path: "small.py".to_string(),
                    total_lines: 120,
                    effective_lines: 90,
                    exceeds_threshold: false,
                    functions: vec![function_issue("c")],
                },
            ],
            scanned: 5,
            skipped: 1,
            parse_failures: vec!["broken.py".to_string()],
            file_threshold: 500,
            function_threshold: 50,
        };

        let summary = result.summary();
        assert!(result.has_violations());
        assert_eq!(summary.total_issues, 2);
        assert_eq!(summary.files_exceeding_threshold, 1);
        assert_eq!(summary.functions_exceeding_threshold, 3);
        assert_eq!(summary.files_scanned, 5);
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.parse_failures, 1);
    }

    #[test]
    fn test_function_issue_json_keys() {
        let mut issue = function_issue("run");
        issue.kind = FunctionKind::Method;
        issue.enclosing_class = Some("Worker".to_string());

        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["type"], "method");
        assert_eq!(value["class"], "Worker");
        assert_eq!(value["effective_lines"], 70);

        let plain = serde_json::to_value(function_issue("f")).unwrap();
        assert!(plain.get("class").is_none());
    }
}
