//! Scan configuration and config file loading.
//!
//! A config file may set any subset of the scan options; missing fields take
//! the built-in defaults.
//!
//! ```yaml
//! file_threshold: 400
//! function_threshold: 40
//! exclude_dirs: [".git", "migrations"]
//! exclude_patterns: ['.*_pb2\.py$']
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analysis::MethodRule;

/// Default maximum effective lines per file.
pub const DEFAULT_FILE_THRESHOLD: usize = 500;

/// Default maximum effective lines per function.
pub const DEFAULT_FUNCTION_THRESHOLD: usize = 50;

/// Directory names skipped unless the user supplies their own list.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "__pycache__",
    ".git",
    ".venv",
    "venv",
    "env",
    "node_modules",
    ".pytest_cache",
    ".tox",
    "dist",
    "build",
    ".mypy_cache",
    ".coverage",
];

/// Path regexes skipped unless the user supplies their own list.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[r".*\.pyc$", r".*__pycache__.*", r".*\.egg-info.*"];

/// Config file names looked up in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["codehealth.yaml", ".codehealth.yaml", "codehealth.json"];

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("{field} must be greater than zero")]
    ZeroThreshold { field: &'static str },
}

/// Options for one scan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Files with more effective lines than this are flagged.
    pub file_threshold: usize,
    /// Functions with more effective lines than this are flagged.
    pub function_threshold: usize,
    /// Path components that exclude a file or directory.
    pub exclude_dirs: BTreeSet<String>,
    /// Regexes searched in the path relative to the scan root.
    pub exclude_patterns: BTreeSet<String>,
    /// How nested definitions are classified.
    pub method_rule: MethodRule,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            file_threshold: DEFAULT_FILE_THRESHOLD,
            function_threshold: DEFAULT_FUNCTION_THRESHOLD,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            method_rule: MethodRule::default(),
        }
    }
}

impl ScanConfig {
    /// Load a config file. `.json` files are read as JSON, anything else as YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Look for a config file in `dir`.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|path| path.is_file())
    }

    /// Reject thresholds that would flag every file and function.
    ///
    /// Exclude patterns are not checked here: a pattern that does not compile
    /// is skipped with a warning when the scan starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_threshold == 0 {
            return Err(ConfigError::ZeroThreshold {
                field: "file_threshold",
            });
        }
        if self.function_threshold == 0 {
            return Err(ConfigError::ZeroThreshold {
                field: "function_threshold",
            });
        }
        Ok(())
    }
}
