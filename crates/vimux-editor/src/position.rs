//! Buffer coordinates, ranges and range classification.
//!
//! All coordinates are **0-indexed**; columns count chars, not bytes. The
//! status line converts to 1-indexed for display, nowhere else does.
//!
//! A [`Range`] is half-open. Operators receive a [`Span`], which pairs a
//! range with its [`RangeKind`] so that `e` (inclusive), `w` (exclusive) and
//! `j` (linewise) can all flow through the same delete/yank/change code.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A (line, column) coordinate, both 0-indexed.
///
/// Positions order lexicographically: line first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Same line, different column.
    #[inline]
    #[must_use]
    pub const fn with_col(self, col: usize) -> Self {
        Self { line: self.line, col }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open range `[start, end)`. Always normalized so `start <= end`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Build a range from two arbitrary positions, swapping if needed.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    #[inline]
    #[must_use]
    pub const fn point(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    #[inline]
    #[must_use]
    pub fn contains(self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Number of lines the range touches (at least 1).
    #[inline]
    #[must_use]
    pub const fn line_span(self) -> usize {
        self.end.line - self.start.line + 1
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Range({:?} .. {:?})", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Span: a range plus how an operator should treat it
// ---------------------------------------------------------------------------

/// How a motion's range is consumed by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// End position excluded (`w`, `b`, `h`, `0`).
    Exclusive,
    /// End position included (`e`, `$`, `f`, `%`).
    Inclusive,
    /// Whole lines regardless of column (`j`, `G`, `dd`).
    Linewise,
}

/// The text an operator acts on.
///
/// For `Exclusive` and `Linewise` spans `range` is already normalized by
/// the motion engine: inclusive motions have had their end bumped by one so
/// every charwise span is half-open by the time an operator sees it.
/// Linewise spans only use the line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub range: Range,
    pub linewise: bool,
}

impl Span {
    #[must_use]
    pub const fn chars(range: Range) -> Self {
        Self { range, linewise: false }
    }

    #[must_use]
    pub fn lines(first: usize, last: usize) -> Self {
        let (first, last) = if first <= last { (first, last) } else { (last, first) };
        Self {
            range: Range {
                start: Position::new(first, 0),
                end: Position::new(last, 0),
            },
            linewise: true,
        }
    }

    #[inline]
    #[must_use]
    pub const fn first_line(&self) -> usize {
        self.range.start.line
    }

    #[inline]
    #[must_use]
    pub const fn last_line(&self) -> usize {
        self.range.end.line
    }
}

// ---------------------------------------------------------------------------
// Block rectangle (Visual-block selections and block registers)
// ---------------------------------------------------------------------------

/// A rectangle of buffer text: lines `top..=bottom`, columns `left..=right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRect {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl BlockRect {
    /// The rectangle spanned by two corners, in any order.
    #[must_use]
    pub fn from_corners(a: Position, b: Position) -> Self {
        Self {
            top: a.line.min(b.line),
            bottom: a.line.max(b.line),
            left: a.col.min(b.col),
            right: a.col.max(b.col),
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.right - self.left + 1
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, pos: Position) -> bool {
        pos.line >= self.top
            && pos.line <= self.bottom
            && pos.col >= self.left
            && pos.col <= self.right
    }
}
