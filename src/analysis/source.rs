//! Immutable source text with its physical line table.

use std::ops::Range;

const BOM: char = '\u{feff}';

/// Full text of one source file plus the byte ranges of its physical lines.
///
/// Lines are split on `\n`; a `\r` directly before the `\n` is not part of
/// the line. A trailing newline does not start a new (empty) line, so
/// `"a\nb\n"` has two lines. Row numbers reported by tree-sitter line up with
/// these indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    text: String,
    lines: Vec<Range<usize>>,
}

impl SourceText {
    /// Build the line table for `text`. A leading byte order mark is dropped.
    pub fn new(text: &str) -> Self {
        let text = text.strip_prefix(BOM).unwrap_or(text).to_string();
        let lines = split_lines(&text);
        Self { text, lines }
    }

    /// The full text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The full text as bytes (for tree-sitter node text extraction).
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Number of physical lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get a physical line by 0-indexed number.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|range| &self.text[range.clone()])
    }

    /// Iterate over all physical lines in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(|range| &self.text[range.clone()])
    }
}

fn split_lines(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;

    for (newline, _) in text.match_indices('\n') {
        let end = if newline > start && bytes[newline - 1] == b'\r' {
            newline - 1
        } else {
            newline
        };
        lines.push(start..end);
        start = newline + 1;
    }

    if start < text.len() {
        lines.push(start..text.len());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_basic() {
        let source = SourceText::new("a = 1\n\nb = 2\n");
        assert_eq!(source.line_count(), 3);
        assert_eq!(source.line(0), Some("a = 1"));
        assert_eq!(source.line(1), Some(""));
        assert_eq!(source.line(2), Some("b = 2"));
        assert_eq!(source.line(3), None);
    }

    #[test]
    fn test_no_trailing_newline() {
        let source = SourceText::new("x\ny");
        assert_eq!(source.lines().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let source = SourceText::new("x = 1\r\n\r\ny = 2\r\n");
        assert_eq!(source.lines().collect::<Vec<_>>(), vec!["x = 1", "", "y = 2"]);
    }

    #[test]
    fn test_empty_text() {
        let source = SourceText::new("");
        assert_eq!(source.line_count(), 0);
        assert!(source.lines().next().is_none());
    }

    #[test]
    fn test_bom_is_dropped() {
        let source = SourceText::new("\u{feff}import os\n");
        assert_eq!(source.line(0), Some("import os"));
        assert!(source.as_str().starts_with("import"));
    }
}
