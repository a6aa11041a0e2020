//! Output formatting for scan results.
//!
//! Supports three output formats:
//! - Console: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - HTML: a standalone page with collapsible per-file sections, rendered
//!   from an embedded tera template

use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;
use tera::{Context, Tera};

use crate::scan::{FileIssue, ScanResult, Summary};

const RULE_WIDTH: usize = 80;
const NO_ISSUES: &str = "No code quality issues found!";
const REPORT_TITLE: &str = "Python Code Health Check Report";

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON document.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub root: String,
    pub summary: Summary,
    pub issues: Vec<FileIssue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_failures: Vec<String>,
}

impl JsonReport {
    pub fn new(root: &str, result: &ScanResult) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            root: root.to_string(),
            summary: result.summary(),
            issues: result.issues.clone(),
            parse_failures: result.parse_failures.clone(),
        }
    }
}

/// Render results as pretty-printed JSON.
pub fn render_json(root: &str, result: &ScanResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport::new(root, result))?)
}

/// Write the JSON report to `output`.
pub fn write_json(output: &Path, root: &str, result: &ScanResult) -> anyhow::Result<()> {
    let json = render_json(root, result)?;
    fs::write(output, json)
        .map_err(|e| anyhow::anyhow!("cannot write {}: {}", output.display(), e))?;
    Ok(())
}

// =============================================================================
// HTML Format
// =============================================================================

const HTML_TEMPLATE_NAME: &str = "report.html";
const TPL_REPORT: &str = include_str!("templates/report.html");

/// Build the template engine with the embedded report page.
///
/// The template name ends in `.html`, so tera escapes every interpolated
/// value (paths, function and class names).
fn html_templates() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template(HTML_TEMPLATE_NAME, TPL_REPORT)?;
    Ok(tera)
}

/// Render results as a standalone HTML page.
pub fn render_html(result: &ScanResult) -> anyhow::Result<String> {
    let tera = html_templates()?;

    let mut context = Context::new();
    context.insert("version", env!("CARGO_PKG_VERSION"));
    context.insert("summary", &result.summary());
    context.insert("issues", &result.issues);

    Ok(tera.render(HTML_TEMPLATE_NAME, &context)?)
}

/// Write the HTML report to `output`.
pub fn write_html(output: &Path, result: &ScanResult) -> anyhow::Result<()> {
    let html = render_html(result)?;
    fs::write(output, html)
        .map_err(|e| anyhow::anyhow!("cannot write {}: {}", output.display(), e))?;
    Ok(())
}

// =============================================================================
// Console Format
// =============================================================================

/// Render results in console (human-readable) format.
pub fn render_console(root: &str, result: &ScanResult) -> Result<String, fmt::Error> {
    let summary = result.summary();
    let rule = "=".repeat(RULE_WIDTH);
    let thin = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Header
    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", format!("{:^width$}", REPORT_TITLE, width = RULE_WIDTH).cyan().bold())?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;
    writeln!(out, "  {}{}", "Scanning: ".dimmed(), root)?;
    writeln!(out, "  {}{}", "Files:    ".dimmed(), summary.files_scanned)?;
    writeln!(out)?;

    write_console_summary(&mut out, &summary, &thin)?;

    if result.issues.is_empty() {
        writeln!(out, "{}", NO_ISSUES.green())?;
        writeln!(out)?;
        return Ok(out);
    }

    writeln!(out, "{}", "Issues Details".bold())?;
    writeln!(out, "{}", thin)?;
    for (idx, issue) in result.issues.iter().enumerate() {
        write_console_issue(&mut out, idx + 1, issue, result.file_threshold)?;
    }

    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    Ok(out)
}

fn write_console_summary(out: &mut String, summary: &Summary, thin: &str) -> fmt::Result {
    writeln!(out, "{}", "Summary".bold())?;
    writeln!(out, "{}", thin)?;
    writeln!(out, "  Total issues: {}", summary.total_issues)?;
    writeln!(out, "  Files exceeding threshold: {}", summary.files_exceeding_threshold)?;
    writeln!(out, "  Functions exceeding threshold: {}", summary.functions_exceeding_threshold)?;
    writeln!(out, "  File threshold: {} lines", summary.file_threshold)?;
    writeln!(out, "  Function threshold: {} lines", summary.function_threshold)?;
    if summary.files_skipped > 0 {
        writeln!(out, "  {}", format!("Skipped (unreadable): {}", summary.files_skipped).yellow())?;
    }
    if summary.parse_failures > 0 {
        writeln!(
            out,
            "  {}",
            format!("Counted without structure (syntax errors): {}", summary.parse_failures).yellow()
        )?;
    }
    writeln!(out)
}

fn write_console_issue(out: &mut String, number: usize, issue: &FileIssue, file_threshold: usize) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}. {}", number, issue.file_path.blue())?;
    writeln!(
        out,
        "   Total lines: {}, Effective lines: {}",
        issue.total_lines, issue.effective_lines
    )?;

    if issue.exceeds_threshold {
        writeln!(
            out,
            "   {} File exceeds threshold: {} > {}",
            "WARNING:".red(),
            issue.effective_lines,
            file_threshold
        )?;
    }

    if issue.functions.is_empty() {
        return Ok(());
    }

    writeln!(out, "   Functions exceeding threshold:")?;
    for func in &issue.functions {
        let owner = func
            .enclosing_class
            .as_deref()
            .map(|c| format!(" in {}", c))
            .unwrap_or_default();
        writeln!(out, "     - {} ({}{})", func.name.bold(), func.kind, owner)?;
        writeln!(
            out,
            "       {}",
            format!(
                "Lines: {}-{}, Effective: {}",
                func.start_line, func.end_line, func.effective_lines
            )
            .dimmed()
        )?;
    }
    Ok(())
}

/// Print the console report to stdout.
pub fn write_console(root: &str, result: &ScanResult) -> anyhow::Result<()> {
    print!("{}", render_console(root, result)?);
    Ok(())
}
