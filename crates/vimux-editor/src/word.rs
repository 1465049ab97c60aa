//! Word motions: Vim-style word and WORD navigation.
//!
//! | Function | Key | Lands on |
//! |----------|-----|----------|
//! | [`word_forward`] | `w` | start of next word |
//! | [`word_backward`] | `b` | start of previous word |
//! | [`word_end_forward`] | `e` | end of current/next word |
//! | [`word_end_backward`] | `ge` | end of previous word |
//!
//! plus the WORD (`W B E gE`) versions.
//!
//! A **word** is a run of word characters (letters, digits, `_`) or a run of
//! other non-blank characters; `name="vim"` holds three words. A **WORD** is
//! any run of non-blanks. An empty line counts as a word for `w`, `b` and
//! `ge` but not for `e`.
//!
//! All algorithms walk absolute char indices, so newlines are ordinary
//! characters of class [`CharClass::Newline`]. When no further word exists,
//! `w`/`e` return the end of the buffer and `b`/`ge` return the origin; the
//! caller clamps for Normal mode.

use crate::buffer::Buffer;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Word,
    Punctuation,
    Blank,
    Newline,
}

impl CharClass {
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Word | Self::Punctuation)
    }
}

/// Class for `w b e ge`.
#[must_use]
pub fn classify(ch: char) -> CharClass {
    if ch == '\n' {
        CharClass::Newline
    } else if ch.is_whitespace() {
        CharClass::Blank
    } else if is_word_char(ch) {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

/// Class for `W B E gE`: only blank vs non-blank matters.
#[must_use]
pub fn classify_big(ch: char) -> CharClass {
    match classify(ch) {
        CharClass::Punctuation => CharClass::Word,
        other => other,
    }
}

#[inline]
#[must_use]
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[must_use]
pub fn word_forward(buf: &Buffer, pos: Position) -> Position {
    forward_start(buf, pos, classify)
}

#[must_use]
pub fn word_backward(buf: &Buffer, pos: Position) -> Position {
    backward_start(buf, pos, classify)
}

#[must_use]
pub fn word_end_forward(buf: &Buffer, pos: Position) -> Position {
    forward_end(buf, pos, classify)
}

#[must_use]
pub fn word_end_backward(buf: &Buffer, pos: Position) -> Position {
    backward_end(buf, pos, classify)
}

#[must_use]
pub fn big_word_forward(buf: &Buffer, pos: Position) -> Position {
    forward_start(buf, pos, classify_big)
}

#[must_use]
pub fn big_word_backward(buf: &Buffer, pos: Position) -> Position {
    backward_start(buf, pos, classify_big)
}

#[must_use]
pub fn big_word_end_forward(buf: &Buffer, pos: Position) -> Position {
    forward_end(buf, pos, classify_big)
}

#[must_use]
pub fn big_word_end_backward(buf: &Buffer, pos: Position) -> Position {
    backward_end(buf, pos, classify_big)
}

/// The word `*` and `#` search for: the keyword under or after the cursor
/// on its line, else the non-blank run under or after it.
///
/// Returns the text and whether it is a keyword (keywords are matched as
/// whole words).
#[must_use]
pub fn word_under_cursor(buf: &Buffer, pos: Position) -> Option<(String, bool)> {
    let chars: Vec<char> = buf.line_text(pos.line).chars().collect();
    let from = pos.col.min(chars.len());

    let run = |pred: &dyn Fn(char) -> bool| -> Option<String> {
        let start = if from < chars.len() && pred(chars[from]) {
            let mut s = from;
            while s > 0 && pred(chars[s - 1]) {
                s -= 1;
            }
            s
        } else {
            from + chars[from..].iter().position(|&c| pred(c))?
        };
        let len = chars[start..].iter().take_while(|&&c| pred(c)).count();
        Some(chars[start..start + len].iter().collect())
    };

    run(&is_word_char)
        .map(|w| (w, true))
        .or_else(|| run(&|c: char| !c.is_whitespace()).map(|w| (w, false)))
}

// ---------------------------------------------------------------------------
// Core algorithms
// ---------------------------------------------------------------------------

/// Class of the char at `idx`; past the end reads as a newline.
fn class_at(buf: &Buffer, idx: usize, classify_fn: fn(char) -> CharClass) -> CharClass {
    buf.char_at_index(idx).map_or(CharClass::Newline, classify_fn)
}

/// True when `idx` sits on an empty line.
fn on_empty_line(buf: &Buffer, idx: usize) -> bool {
    let pos = buf.position_of(idx);
    buf.line_len(pos.line) == 0
}

/// `w`: skip the current run, then blanks and newlines, stopping at an
/// empty line.
fn forward_start(buf: &Buffer, pos: Position, classify_fn: fn(char) -> CharClass) -> Position {
    let total = buf.len_chars();
    let mut idx = buf.char_idx(pos);
    if idx >= total {
        return buf.position_of(total);
    }

    let start = class_at(buf, idx, classify_fn);
    if start.is_text() {
        while idx < total && class_at(buf, idx, classify_fn) == start {
            idx += 1;
        }
    }

    while idx < total {
        match class_at(buf, idx, classify_fn) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Blank => idx += 1,
            CharClass::Newline => {
                idx += 1;
                if idx < total && on_empty_line(buf, idx) {
                    break;
                }
            }
        }
    }
    buf.position_of(idx)
}

/// `b`: skip blanks and newlines backwards (an empty line stops), then to
/// the start of the run.
fn backward_start(buf: &Buffer, pos: Position, classify_fn: fn(char) -> CharClass) -> Position {
    let mut idx = buf.char_idx(pos);
    if idx == 0 {
        return Position::ZERO;
    }
    idx -= 1;

    loop {
        match class_at(buf, idx, classify_fn) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Newline if on_empty_line(buf, idx) => return buf.position_of(idx),
            _ if idx == 0 => return Position::ZERO,
            _ => idx -= 1,
        }
    }

    let class = class_at(buf, idx, classify_fn);
    while idx > 0 && class_at(buf, idx - 1, classify_fn) == class {
        idx -= 1;
    }
    buf.position_of(idx)
}

/// `e`: step once, skip blanks and newlines, then to the end of the run.
fn forward_end(buf: &Buffer, pos: Position, classify_fn: fn(char) -> CharClass) -> Position {
    let total = buf.len_chars();
    let mut idx = buf.char_idx(pos) + 1;

    while idx < total && !class_at(buf, idx, classify_fn).is_text() {
        idx += 1;
    }
    if idx >= total {
        return buf.position_of(total);
    }

    let class = class_at(buf, idx, classify_fn);
    while idx + 1 < total && class_at(buf, idx + 1, classify_fn) == class {
        idx += 1;
    }
    buf.position_of(idx)
}

/// `ge`: leave the current run, then walk back over blanks and newlines to
/// the last char of the previous run. An empty line stops the walk.
fn backward_end(buf: &Buffer, pos: Position, classify_fn: fn(char) -> CharClass) -> Position {
    let mut idx = buf.char_idx(pos);
    let class = class_at(buf, idx, classify_fn);
    if class.is_text() {
        while idx > 0 && class_at(buf, idx - 1, classify_fn) == class {
            idx -= 1;
        }
    }
    if idx == 0 {
        return Position::ZERO;
    }
    idx -= 1;

    loop {
        match class_at(buf, idx, classify_fn) {
            CharClass::Word | CharClass::Punctuation => return buf.position_of(idx),
            CharClass::Newline if on_empty_line(buf, idx) => return buf.position_of(idx),
            _ if idx == 0 => return Position::ZERO,
            _ => idx -= 1,
        }
    }
}
