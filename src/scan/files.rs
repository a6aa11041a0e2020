//! Python file discovery and exclusion rules.

use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ScanConfig;

/// Extension of files that are analyzed.
pub const PYTHON_EXTENSION: &str = "py";

/// Decides which paths under the scan root are skipped.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    dirs: BTreeSet<String>,
    patterns: Vec<Regex>,
}

impl ExclusionFilter {
    /// Compile the filter. Patterns that are not valid regexes are dropped
    /// with a warning.
    pub fn new(config: &ScanConfig) -> Self {
        let patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "ignoring invalid exclude pattern");
                    None
                }
            })
            .collect();

        Self {
            dirs: config.exclude_dirs.clone(),
            patterns,
        }
    }

    /// Whether a single path component is excluded by name.
    pub fn excludes_name(&self, name: &str) -> bool {
        self.dirs.contains(name)
    }

    /// Whether a path relative to the scan root is excluded, by any of its
    /// components or by a pattern match anywhere in it.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let by_component = relative
            .components()
            .any(|c| self.excludes_name(&c.as_os_str().to_string_lossy()));
        if by_component {
            return true;
        }

        let path_str = normalize_path(relative);
        self.patterns.iter().any(|re| re.is_match(&path_str))
    }
}

/// Files found under a root.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Python files in walk order (sorted by name within each directory).
    pub files: Vec<PathBuf>,
    /// Entries that could not be read during the walk.
    pub errors: usize,
}

/// Walk `root` and collect Python files that pass the filter.
///
/// Excluded directories are pruned. Unreadable entries are logged and
/// counted; they never stop the walk.
pub fn collect_files(root: &Path, filter: &ExclusionFilter) -> Discovery {
    let mut discovery = Discovery::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !filter.excludes_name(&e.file_name().to_string_lossy()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable path");
                discovery.errors += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_python = path.extension().and_then(|e| e.to_str()) == Some(PYTHON_EXTENSION);
        if !is_python {
            continue;
        }

        if filter.is_excluded(&relative_to(path, root)) {
            tracing::debug!(path = %path.display(), "excluded");
            continue;
        }

        discovery.files.push(path.to_path_buf());
    }

    discovery
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

/// Path of `file` for display and matching: relative to `root` with `/`
/// separators. Scanning a single file yields its file name.
pub fn display_path(file: &Path, root: &Path) -> String {
    if file == root {
        return file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| normalize_path(file));
    }
    normalize_path(&relative_to(file, root))
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
