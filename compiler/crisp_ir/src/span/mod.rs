//! Source locations.
//!
//! Two representations coexist:
//! - [`Span`]: compact byte range produced by the lexer.
//! - [`Location`]: line/column range carried by AST nodes, used for
//!   diagnostics and completion targeting.
//!
//! [`LineIndex`] converts between the two.

use std::fmt;
use std::ops::Range;

/// A byte offset that does not fit in a `u32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanError {
    pub offset: usize,
}

impl fmt::Display for SpanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "byte offset {} is past the 4 GiB script limit", self.offset)
    }
}

impl std::error::Error for SpanError {}

/// Half-open byte range `start..end` into the script.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Span of tokens with no source text, such as end of input.
    pub const EMPTY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Span of a lexer match.
    pub fn try_from_range(range: Range<usize>) -> Result<Self, SpanError> {
        let narrow = |offset: usize| u32::try_from(offset).map_err(|_| SpanError { offset });
        Ok(Span {
            start: narrow(range.start)?,
            end: narrow(range.end)?,
        })
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, offset: u32) -> bool {
        (self.start..self.end).contains(&offset)
    }

    /// Smallest span covering both.
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Whether `other` starts right where `self` ends, with no whitespace
    /// between them.
    #[inline]
    pub fn is_adjacent_to(&self, other: Span) -> bool {
        self.end == other.start
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A line/column position. Lines are 1-based, columns 0-based.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        LineCol { line, col }
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Line/column range of a node. `end` is exclusive on the column.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Location {
    pub start: LineCol,
    pub end: LineCol,
}

impl Location {
    #[inline]
    pub const fn new(start: LineCol, end: LineCol) -> Self {
        Location { start, end }
    }

    /// Whether `line` falls between the first and last line of this location.
    #[inline]
    pub fn spans_line(&self, line: u32) -> bool {
        self.start.line <= line && line <= self.end.line
    }

    /// Whether `pos` falls inside this location (end inclusive, so a cursor
    /// sitting right after the last character still counts).
    #[inline]
    pub fn contains(&self, pos: LineCol) -> bool {
        self.start <= pos && pos <= self.end
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Maps byte offsets to line/column positions.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the first character of each line.
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build an index over `source`.
    ///
    /// Offsets past `u32::MAX` are clamped; the lexer rejects such input first.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineIndex { line_starts }
    }

    /// Number of lines in the indexed source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line/column of a byte offset.
    pub fn line_col(&self, offset: u32) -> LineCol {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line.saturating_sub(1)];
        LineCol {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            col: offset - line_start,
        }
    }

    /// Line/column range of a span.
    pub fn location(&self, span: Span) -> Location {
        Location {
            start: self.line_col(span.start),
            end: self.line_col(span.end),
        }
    }

    /// Byte offset of a line/column position, if the line exists.
    pub fn offset(&self, pos: LineCol) -> Option<u32> {
        let idx = usize::try_from(pos.line).ok()?.checked_sub(1)?;
        self.line_starts.get(idx).map(|start| start + pos.col)
    }
}
