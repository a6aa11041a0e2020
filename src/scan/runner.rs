//! Scan runner that walks a tree and applies thresholds.

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{analyze_source, FileAnalysis};
use crate::config::ScanConfig;

use super::files::{collect_files, display_path, ExclusionFilter};
use super::types::{FileIssue, FunctionIssue, ScanResult};

/// Scans every Python file under a root directory.
pub struct Scanner {
    root: PathBuf,
    config: ScanConfig,
    parallel: bool,
}

impl Scanner {
    /// Create a scanner for `root`, which may be a directory or a single file.
    pub fn new<P: AsRef<Path>>(root: P, config: ScanConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
            parallel: true,
        }
    }

    /// Set whether files are analyzed on the rayon thread pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run the scan.
    ///
    /// Fails only when the root itself cannot be accessed. Unreadable files
    /// are skipped with a warning and counted in [`ScanResult::skipped`].
    pub fn scan(&self) -> anyhow::Result<ScanResult> {
        let metadata = fs::metadata(&self.root).map_err(|e| {
            anyhow::anyhow!("cannot access {}: {}", self.root.display(), e)
        })?;

        let (files, walk_errors) = if metadata.is_dir() {
            let filter = ExclusionFilter::new(&self.config);
            let discovery = collect_files(&self.root, &filter);
            (discovery.files, discovery.errors)
        } else {
            (vec![self.root.clone()], 0)
        };

        tracing::debug!(root = %self.root.display(), files = files.len(), "scanning");

        let outcomes: Vec<Option<FileAnalysis>> = if self.parallel {
            files.par_iter().map(|file| self.analyze_file(file)).collect()
        } else {
            files.iter().map(|file| self.analyze_file(file)).collect()
        };

        let unreadable = outcomes.iter().filter(|o| o.is_none()).count();
        let mut analyses: Vec<FileAnalysis> = outcomes.into_iter().flatten().collect();
        analyses.sort_by(|a, b| a.path.cmp(&b.path));

        let parse_failures: Vec<String> = analyses
            .iter()
            .filter(|a| a.is_degraded())
            .map(|a| a.path.clone())
            .collect();

        let issues = analyses
            .iter()
            .filter_map(|analysis| check_thresholds(analysis, &self.config))
            .collect();

        Ok(ScanResult {
            issues,
            scanned: analyses.len(),
            skipped: walk_errors + unreadable,
            parse_failures,
            file_threshold: self.config.file_threshold,
            function_threshold: self.config.function_threshold,
        })
    }

    fn analyze_file(&self, file: &Path) -> Option<FileAnalysis> {
        let path = display_path(file, &self.root);
        let bytes = match fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "skipping unreadable file");
                return None;
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        let analysis = analyze_source(&path, &text, self.config.method_rule);
        if let Some(failure) = &analysis.parse_error {
            tracing::warn!(path = %path, %failure, "syntax error, counting lines without structure");
        }
        Some(analysis)
    }
}

/// Compare one file's analysis against the thresholds.
///
/// Returns `None` when neither the file nor any of its functions exceeds its
/// threshold. Both comparisons are strict.
pub fn check_thresholds(analysis: &FileAnalysis, config: &ScanConfig) -> Option<FileIssue> {
    let exceeds_threshold = analysis.effective_lines > config.file_threshold;
    let functions: Vec<FunctionIssue> = analysis
        .functions
        .iter()
        .filter(|f| f.effective_lines > config.function_threshold)
        .map(FunctionIssue::from)
        .collect();

    if !exceeds_threshold && functions.is_empty() {
        return None;
    }

    Some(FileIssue {
        file_path: analysis.path.clone(),
        total_lines: analysis.total_lines,
        effective_lines: analysis.effective_lines,
        exceeds_threshold,
        functions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FunctionKind;
    use tempfile::TempDir;

    fn long_function(name: &str, body_lines: usize) -> String {
        let mut out = format!("def {}():\n", name);
        for i in 0..body_lines {
            out.push_str(&format!("    x{} = {}\n", i, i));
        }
        out
    }

    fn small_config(file: usize, function: usize) -> ScanConfig {
        ScanConfig {
            file_threshold: file,
            function_threshold: function,
            ..Default::default()
        }
    }

    #[test]
    fn test_scanner_flags_long_function() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("long.py"), long_function("work", 12)).unwrap();
        std::fs::write(temp.path().join("short.py"), long_function("tiny", 2)).unwrap();

        let result = Scanner::new(temp.path(), small_config(500, 10))
            .scan()
            .unwrap();

        assert_eq!(result.scanned, 2);
        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues[0];
        assert_eq!(issue.file_path, "long.py");
        assert!(!issue.exceeds_threshold);
        assert_eq!(issue.functions.len(), 1);
        assert_eq!(issue.functions[0].name, "work");
        assert_eq!(issue.functions[0].kind, FunctionKind::Function);
        assert_eq!(issue.functions[0].effective_lines, 13);
    }

    #[test]
    fn test_threshold_is_strict() {
        let temp = TempDir::new().unwrap();
        // 1 def line + 9 body lines = 10 effective lines
        std::fs::write(temp.path().join("edge.py"), long_function("edge", 9)).unwrap();

        let at_limit = Scanner::new(temp.path(), small_config(10, 10)).scan().unwrap();
        assert!(!at_limit.has_violations());

        let over = Scanner::new(temp.path(), small_config(9, 9)).scan().unwrap();
        assert_eq!(over.file_issue_count(), 1);
        assert_eq!(over.function_issue_count(), 1);
    }

    #[test]
    fn test_results_sorted_and_deterministic() {
        let temp = TempDir::new().unwrap();
        for name in ["zeta.py", "alpha.py", "pkg/mid.py"] {
            let path = temp.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, long_function("f", 5)).unwrap();
        }

        let parallel = Scanner::new(temp.path(), small_config(1, 1)).scan().unwrap();
        let serial = Scanner::new(temp.path(), small_config(1, 1))
            .parallel(false)
            .scan()
            .unwrap();

        let paths: Vec<_> = parallel.issues.iter().map(|i| i.file_path.as_str()).collect();
        assert_eq!(paths, vec!["alpha.py", "pkg/mid.py", "zeta.py"]);
        assert_eq!(parallel, serial);
    }

    #[test]
    fn test_parse_failure_recorded() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("bad.py"), "def broken(:\n    pass\n").unwrap();
        std::fs::write(temp.path().join("good.py"), "x = 1\n").unwrap();

        let result = Scanner::new(temp.path(), ScanConfig::default()).scan().unwrap();
        assert_eq!(result.scanned, 2);
        assert_eq!(result.parse_failures, vec!["bad.py".to_string()]);
        assert!(!result.has_violations());
    }

    #[test]
    fn test_invalid_utf8_is_read_lossily() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("latin.py"), b"name = '\xe9t\xe9'\n").unwrap();

        let result = Scanner::new(temp.path(), ScanConfig::default()).scan().unwrap();
        assert_eq!(result.scanned, 1);
        assert_eq!(result.skipped, 0);
    }

    #[test]
    fn test_single_file_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("only.py");
        std::fs::write(&file, long_function("f", 3)).unwrap();

        let result = Scanner::new(&file, small_config(1, 1)).scan().unwrap();
        assert_eq!(result.scanned, 1);
        assert_eq!(result.issues[0].file_path, "only.py");
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        let result = Scanner::new(temp.path().join("absent"), ScanConfig::default()).scan();
        assert!(result.is_err());
    }
}
