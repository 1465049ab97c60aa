//! Cursor: position, sticky column and Visual anchor.
//!
//! Movement methods take a `past_end: bool` instead of a mode:
//!
//! - **Normal / Visual**: `past_end = false`, the cursor sits ON a char
//!   (column `len - 1`, or 0 on an empty line).
//! - **Insert / Replace / operator targets**: `past_end = true`, the cursor
//!   may sit after the last char.
//!
//! # Sticky column
//!
//! Vertical movement aims for the remembered column, so passing through a
//! short line and back lands where it started. `$` sets the sticky column
//! to [`Cursor::END`], which keeps `j`/`k` glued to line ends.

use crate::buffer::Buffer;
use crate::position::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pos: Position,
    sticky_col: usize,
    anchor: Option<Position>,
}

impl Cursor {
    /// Sticky column meaning "end of whatever line we land on".
    pub const END: usize = usize::MAX;

    #[must_use]
    pub const fn new() -> Self {
        Self::at(Position::ZERO)
    }

    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self {
            pos,
            sticky_col: pos.col,
            anchor: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    #[inline]
    #[must_use]
    pub const fn sticky_col(&self) -> usize {
        self.sticky_col
    }

    /// Visual-mode anchor (the end that stays put).
    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    pub const fn set_anchor(&mut self) {
        self.anchor = Some(self.pos);
    }

    pub const fn clear_anchor(&mut self) {
        self.anchor = None;
    }

    /// `o` in Visual mode: jump to the other end of the selection.
    pub const fn swap_anchor(&mut self) {
        if let Some(anchor) = self.anchor {
            self.anchor = Some(self.pos);
            self.pos = anchor;
            self.sticky_col = anchor.col;
        }
    }

    // -- Direct positioning -------------------------------------------------

    /// Jump to `pos` (clamped); resets the sticky column.
    pub fn set_position(&mut self, pos: Position, buf: &Buffer, past_end: bool) {
        self.pos = clamp(pos, buf, past_end);
        self.sticky_col = self.pos.col;
    }

    /// Jump to `line` (clamped) and its first non-blank.
    pub fn goto_line(&mut self, line: usize, buf: &Buffer, past_end: bool) {
        self.pos.line = line.min(buf.line_count() - 1);
        self.move_to_first_non_blank(buf, past_end);
    }

    /// Overwrite the sticky column without moving.
    pub const fn set_sticky_col(&mut self, col: usize) {
        self.sticky_col = col;
    }

    // -- Horizontal movement ------------------------------------------------

    pub fn move_left(&mut self, count: usize, buf: &Buffer, past_end: bool) {
        let col = self.pos.col.min(max_col_for_line(buf, self.pos.line, past_end));
        self.pos.col = col.saturating_sub(count);
        self.sticky_col = self.pos.col;
    }

    pub fn move_right(&mut self, count: usize, buf: &Buffer, past_end: bool) {
        let max_col = max_col_for_line(buf, self.pos.line, past_end);
        self.pos.col = self.pos.col.saturating_add(count).min(max_col);
        self.sticky_col = self.pos.col;
    }

    pub const fn move_to_line_start(&mut self) {
        self.pos.col = 0;
        self.sticky_col = 0;
    }

    pub fn move_to_first_non_blank(&mut self, buf: &Buffer, past_end: bool) {
        let col = first_non_blank(buf, self.pos.line);
        self.pos.col = col.min(max_col_for_line(buf, self.pos.line, past_end));
        self.sticky_col = self.pos.col;
    }

    /// `$`: last char, and stay at line ends on later `j`/`k`.
    pub fn move_to_line_end(&mut self, buf: &Buffer, past_end: bool) {
        self.pos.col = max_col_for_line(buf, self.pos.line, past_end);
        self.sticky_col = Self::END;
    }

    /// `{N}|`: column `N` (1-based), clamped to the line.
    pub fn move_to_column(&mut self, col: usize, buf: &Buffer, past_end: bool) {
        let max_col = max_col_for_line(buf, self.pos.line, past_end);
        self.pos.col = col.saturating_sub(1).min(max_col);
        self.sticky_col = self.pos.col;
    }

    // -- Vertical movement --------------------------------------------------

    pub fn move_up(&mut self, count: usize, buf: &Buffer, past_end: bool) {
        self.pos.line = self.pos.line.saturating_sub(count);
        self.pos.col = self.sticky_col.min(max_col_for_line(buf, self.pos.line, past_end));
    }

    pub fn move_down(&mut self, count: usize, buf: &Buffer, past_end: bool) {
        let last_line = buf.line_count() - 1;
        self.pos.line = self.pos.line.saturating_add(count).min(last_line);
        self.pos.col = self.sticky_col.min(max_col_for_line(buf, self.pos.line, past_end));
    }

    // -- Applying motions ---------------------------------------------------

    /// Step `count` times through `step` (a function from [`crate::word`]
    /// or similar), then clamp.
    pub fn repeat(
        &mut self,
        count: usize,
        buf: &Buffer,
        past_end: bool,
        step: fn(&Buffer, Position) -> Position,
    ) {
        for _ in 0..count.max(1) {
            self.pos = step(buf, self.pos);
        }
        self.pos = clamp(self.pos, buf, past_end);
        self.sticky_col = self.pos.col;
    }

    /// Re-clamp after the buffer changed underneath the cursor.
    pub fn clamp(&mut self, buf: &Buffer, past_end: bool) {
        self.pos = clamp(self.pos, buf, past_end);
        if let Some(anchor) = &mut self.anchor {
            *anchor = clamp(*anchor, buf, true);
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Largest column the cursor may use on `line`.
#[must_use]
pub fn max_col_for_line(buf: &Buffer, line: usize, past_end: bool) -> usize {
    let len = buf.line_len(line);
    if past_end { len } else { len.saturating_sub(1) }
}

/// Column of the first non-blank char (the line length if all blank).
#[must_use]
pub fn first_non_blank(buf: &Buffer, line: usize) -> usize {
    buf.line(line)
        .map_or(0, |l| l.chars().take_while(|c| *c == ' ' || *c == '\t').count())
}

/// Column of the `count`th `ch` after `from_col` on `line`.
#[must_use]
pub fn find_on_line_forward(
    buf: &Buffer,
    line: usize,
    from_col: usize,
    ch: char,
    count: usize,
) -> Option<usize> {
    buf.line(line)?
        .chars()
        .enumerate()
        .skip(from_col + 1)
        .filter(|&(_, c)| c == ch)
        .nth(count.max(1) - 1)
        .map(|(i, _)| i)
}

/// Column of the `count`th `ch` before `from_col` on `line`.
#[must_use]
pub fn find_on_line_backward(
    buf: &Buffer,
    line: usize,
    from_col: usize,
    ch: char,
    count: usize,
) -> Option<usize> {
    let chars: Vec<char> = buf.line(line)?.chars().collect();
    (0..from_col.min(chars.len()))
        .rev()
        .filter(|&i| chars[i] == ch)
        .nth(count.max(1) - 1)
}

fn clamp(pos: Position, buf: &Buffer, past_end: bool) -> Position {
    let line = pos.line.min(buf.line_count() - 1);
    Position::new(line, pos.col.min(max_col_for_line(buf, line, past_end)))
}
