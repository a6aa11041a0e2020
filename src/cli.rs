//! Command-line interface for codehealth.

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::analysis::MethodRule;
use crate::config::{ConfigError, ScanConfig};
use crate::report;
use crate::scan::Scanner;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Python code health checker.
///
/// Counts effective lines (code that is not blank, a comment, or a
/// docstring) in every Python file under a directory and reports files and
/// functions that exceed their thresholds.
#[derive(Parser, Debug)]
#[command(name = "codehealth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project root directory (or a single Python file)
    pub root: PathBuf,

    /// Maximum effective lines per file [default: 500]
    #[arg(long)]
    pub file_threshold: Option<usize>,

    /// Maximum effective lines per function [default: 50]
    #[arg(long)]
    pub function_threshold: Option<usize>,

    /// Directory name to skip (repeatable; replaces the default list)
    #[arg(long = "exclude-dir", value_name = "DIR")]
    pub exclude_dirs: Vec<String>,

    /// Path regex to skip (repeatable; replaces the default list)
    #[arg(long = "exclude-pattern", value_name = "REGEX")]
    pub exclude_patterns: Vec<String>,

    /// Do not print the console report
    #[arg(long)]
    pub no_console: bool,

    /// Write a JSON report to FILE
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Write an HTML report to FILE
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Config file (YAML, or JSON with a .json extension; default: auto-discover)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Classify a def as a method only when its nearest enclosing scope is a class
    #[arg(long)]
    pub nearest_scope: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Build the scan configuration: built-in defaults, then the config file,
/// then command-line flags.
///
/// Without `--config`, a config file is looked up in `search_dir`.
pub fn resolve_config(args: &Cli, search_dir: &Path) -> Result<ScanConfig, ConfigError> {
    let config_path = args
        .config
        .clone()
        .or_else(|| ScanConfig::discover(search_dir));

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading config");
            ScanConfig::load(&path)?
        }
        None => ScanConfig::default(),
    };

    if let Some(threshold) = args.file_threshold {
        config.file_threshold = threshold;
    }
    if let Some(threshold) = args.function_threshold {
        config.function_threshold = threshold;
    }
    if !args.exclude_dirs.is_empty() {
        config.exclude_dirs = args.exclude_dirs.iter().cloned().collect();
    }
    if !args.exclude_patterns.is_empty() {
        config.exclude_patterns = args.exclude_patterns.iter().cloned().collect();
    }
    if args.nearest_scope {
        config.method_rule = MethodRule::NearestScope;
    }

    config.validate()?;
    Ok(config)
}

/// Run a scan and emit the requested reports.
pub fn run(args: &Cli) -> anyhow::Result<i32> {
    let cwd = std::env::current_dir()?;
    let config = match resolve_config(args, &cwd) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if let Err(e) = std::fs::metadata(&args.root) {
        eprintln!("Error: cannot access path {:?}: {}", args.root, e);
        return Ok(EXIT_ERROR);
    }

    let result = Scanner::new(&args.root, config).scan()?;

    if result.scanned == 0 {
        tracing::warn!(root = %args.root.display(), "no Python files to scan");
    }

    let root = args.root.to_string_lossy().to_string();

    if !args.no_console {
        report::write_console(&root, &result)?;
    }

    if let Some(path) = &args.json {
        report::write_json(path, &root, &result)?;
        println!("JSON report generated: {}", path.display());
    }

    if let Some(path) = &args.html {
        report::write_html(path, &result)?;
        println!("HTML report generated: {}", path.display());
    }

    if result.has_violations() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
