//! Effective line counting.

use std::fmt;

use super::{DocRanges, SourceText};

/// Single-line comment marker for Python.
pub const COMMENT_MARKER: char = '#';

/// What a physical line holds, as far as line counting is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineClass {
    Code,
    Blank,
    Comment,
    Documentation,
}

impl LineClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineClass::Code => "code",
            LineClass::Blank => "blank",
            LineClass::Comment => "comment",
            LineClass::Documentation => "documentation",
        }
    }
}

impl fmt::Display for LineClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counts effective lines of one source text.
///
/// A line is effective unless it lies in a docstring, is blank after
/// trimming, or starts with `#` after trimming. Code lines with a trailing
/// comment still count.
#[derive(Debug, Clone, Copy)]
pub struct LineCounter<'a> {
    source: &'a SourceText,
    docs: &'a DocRanges,
}

impl<'a> LineCounter<'a> {
    pub fn new(source: &'a SourceText, docs: &'a DocRanges) -> Self {
        Self { source, docs }
    }

    /// Classify a 0-indexed line. Lines past the end read as blank.
    pub fn classify(&self, index: usize) -> LineClass {
        if self.docs.contains(index) {
            return LineClass::Documentation;
        }
        let Some(line) = self.source.line(index) else {
            return LineClass::Blank;
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            LineClass::Blank
        } else if trimmed.starts_with(COMMENT_MARKER) {
            LineClass::Comment
        } else {
            LineClass::Code
        }
    }

    /// Count effective lines in the 0-indexed half-open range `[start, end)`.
    ///
    /// `end` is clamped to the line count; an empty or inverted range counts 0.
    pub fn count_effective_lines(&self, start: usize, end: usize) -> usize {
        let end = end.min(self.source.line_count());
        (start..end)
            .filter(|&index| self.classify(index) == LineClass::Code)
            .count()
    }

    /// Count effective lines in the whole file.
    pub fn count_all(&self) -> usize {
        self.count_effective_lines(0, self.source.line_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_without_docs() {
        let source = SourceText::new("x = 1\n\n   \n# comment\n    # indented\ny = 2  # trailing\n");
        let docs = DocRanges::empty();
        let counter = LineCounter::new(&source, &docs);

        assert_eq!(counter.classify(0), LineClass::Code);
        assert_eq!(counter.classify(1), LineClass::Blank);
        assert_eq!(counter.classify(2), LineClass::Blank);
        assert_eq!(counter.classify(3), LineClass::Comment);
        assert_eq!(counter.classify(4), LineClass::Comment);
        assert_eq!(counter.classify(5), LineClass::Code);
        assert_eq!(counter.count_all(), 2);
    }

    #[test]
    fn test_range_is_clamped() {
        let source = SourceText::new("a\nb\nc\n");
        let docs = DocRanges::empty();
        let counter = LineCounter::new(&source, &docs);

        assert_eq!(counter.count_effective_lines(1, 100), 2);
        assert_eq!(counter.count_effective_lines(2, 1), 0);
        assert_eq!(counter.count_effective_lines(5, 9), 0);
    }

    #[test]
    fn test_documentation_lines_are_skipped() {
        let source = SourceText::new("\"\"\"Doc.\n\nMore.\n\"\"\"\nx = 1\n");
        let tree = crate::analysis::parser::parse(&source).unwrap();
        let docs = DocRanges::detect(&tree);
        let counter = LineCounter::new(&source, &docs);

        assert_eq!(counter.classify(1), LineClass::Documentation);
        assert_eq!(counter.count_all(), 1);
    }
}
