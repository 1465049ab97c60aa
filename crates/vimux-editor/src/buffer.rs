//! Text buffer: line storage and dirty state for one pane.
//!
//! A `Buffer` wraps a [`ropey::Rope`]. Columns are char offsets; byte
//! offsets never leak into the public API. Text is stored with `\n`
//! separators and **no** trailing newline, so `"a\nb"` is two lines and the
//! empty string is one empty line. A buffer always has at least one line.
//!
//! There is no file I/O: "saving" only clears the dirty flag. Undo lives in
//! [`crate::history`]; edits here are raw and never record anything.

use std::fmt;

use ropey::{Rope, RopeSlice};

use crate::position::{Position, Range};

/// A text buffer backed by a rope.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    name: Option<String>,
    modified: bool,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// An empty, unnamed, unmodified buffer (one empty line).
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            name: None,
            modified: false,
        }
    }

    /// Load initial text. CRLF becomes LF and a single trailing newline is
    /// dropped, matching how an editor shows a file on disk.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n");
        let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
        Self {
            rope: Rope::from_str(body),
            name: None,
            modified: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    // -- Text access --------------------------------------------------------

    /// Number of lines; never zero.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Size in bytes as written to disk, including the final newline.
    #[must_use]
    pub fn written_bytes(&self) -> usize {
        self.rope.len_bytes() + 1
    }

    /// Line `line` without its trailing `\n`.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        if line >= self.line_count() {
            return None;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            Some(slice.slice(..len - 1))
        } else {
            Some(slice)
        }
    }

    /// Line content as an owned string (empty for out-of-range lines).
    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        self.line(line).map(|l| l.to_string()).unwrap_or_default()
    }

    /// Chars on a line, excluding the newline. Zero for missing lines.
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        self.line(line).map_or(0, |l| l.len_chars())
    }

    #[must_use]
    pub fn char_at(&self, pos: Position) -> Option<char> {
        let line = self.line(pos.line)?;
        (pos.col < line.len_chars()).then(|| line.char(pos.col))
    }

    /// Char at an absolute char index (newlines included).
    #[must_use]
    pub fn char_at_index(&self, idx: usize) -> Option<char> {
        self.rope.get_char(idx)
    }

    /// Text in `range`, with both ends clamped into the buffer.
    #[must_use]
    pub fn slice(&self, range: Range) -> String {
        let start = self.char_idx(range.start);
        let end = self.char_idx(range.end);
        self.rope.slice(start..end.max(start)).to_string()
    }

    /// Whole contents, lines joined with `\n`.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// Every line as an owned string.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count()).map(|l| self.line_text(l)).collect()
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Absolute char index of `pos`. Out-of-range lines map to the end of
    /// the buffer and columns past the line's end map to the newline.
    #[must_use]
    pub fn char_idx(&self, pos: Position) -> usize {
        if pos.line >= self.line_count() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(pos.line) + pos.col.min(self.line_len(pos.line))
    }

    /// Position of an absolute char index (clamped to the end of buffer).
    #[must_use]
    pub fn position_of(&self, idx: usize) -> Position {
        let idx = idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        Position::new(line, idx - self.rope.line_to_char(line))
    }

    /// Nearest position a Normal-mode cursor may occupy.
    #[must_use]
    pub fn clamp_position(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count() - 1);
        let max_col = self.line_len(line).saturating_sub(1);
        Position::new(line, pos.col.min(max_col))
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `text` at `pos` (clamped).
    pub fn insert(&mut self, pos: Position, text: &str) {
        if text.is_empty() {
            return;
        }
        let idx = self.char_idx(pos);
        self.rope.insert(idx, text);
        self.modified = true;
    }

    /// Remove the text in `range` and return it.
    pub fn delete(&mut self, range: Range) -> String {
        let start = self.char_idx(range.start);
        let end = self.char_idx(range.end);
        if end <= start {
            return String::new();
        }
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.modified = true;
        removed
    }

    // -- Metadata -----------------------------------------------------------

    /// Name shown in the status line.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    #[inline]
    pub const fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("name", &self.name)
            .field("modified", &self.modified)
            .finish()
    }
}
