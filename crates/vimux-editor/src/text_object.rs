//! Text objects: selection by structure rather than by motion.
//!
//! ```text
//! operator + object = action
//! d        + iw     = delete inner word
//! c        + i"     = change inside quotes
//! y        + a(     = yank around parentheses
//! ```
//!
//! | Inner | Around | Object |
//! |-------|--------|--------|
//! | `iw` | `aw` | word |
//! | `iW` | `aW` | WORD |
//! | `i"` `i'` `` i` `` | `a"` `a'` `` a` `` | quoted string on the cursor line |
//! | `i(` `ib` | `a(` `ab` | parentheses |
//! | `i[` | `a[` | square brackets |
//! | `i{` `iB` | `a{` `aB` | braces |
//! | `i<` | `a<` | angle brackets |
//!
//! [`TextObject::span`] yields a charwise span, except for an inner
//! bracket object whose brackets sit on their own lines: that one covers
//! the enclosed lines linewise, as in Vim.

use crate::buffer::Buffer;
use crate::position::{Position, Range, Span};
use crate::word::{classify, classify_big, CharClass};

/// Which structure an object selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Word,
    BigWord,
    Quote(char),
    Bracket { open: char, close: char },
}

impl ObjectKind {
    /// The object named by the key after `i`/`a`.
    #[must_use]
    pub const fn from_key(ch: char) -> Option<Self> {
        Some(match ch {
            'w' => Self::Word,
            'W' => Self::BigWord,
            '"' | '\'' | '`' => Self::Quote(ch),
            '(' | ')' | 'b' => Self::Bracket { open: '(', close: ')' },
            '[' | ']' => Self::Bracket { open: '[', close: ']' },
            '{' | '}' | 'B' => Self::Bracket { open: '{', close: '}' },
            '<' | '>' => Self::Bracket { open: '<', close: '>' },
            _ => return None,
        })
    }
}

/// A text object: its kind and whether the surroundings are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextObject {
    pub kind: ObjectKind,
    pub around: bool,
}

impl TextObject {
    #[must_use]
    pub const fn new(kind: ObjectKind, around: bool) -> Self {
        Self { kind, around }
    }

    /// Resolve the object at `pos`, or `None` when there is nothing to
    /// select (no enclosing pair, empty line for a word, ...).
    #[must_use]
    pub fn span(self, buf: &Buffer, pos: Position) -> Option<Span> {
        match (self.kind, self.around) {
            (ObjectKind::Word, false) => inner_word(buf, pos, classify).map(Span::chars),
            (ObjectKind::Word, true) => a_word(buf, pos, classify).map(Span::chars),
            (ObjectKind::BigWord, false) => inner_word(buf, pos, classify_big).map(Span::chars),
            (ObjectKind::BigWord, true) => a_word(buf, pos, classify_big).map(Span::chars),
            (ObjectKind::Quote(q), around) => quote(buf, pos, q, around).map(Span::chars),
            (ObjectKind::Bracket { open, close }, false) => inner_bracket(buf, pos, open, close),
            (ObjectKind::Bracket { open, close }, true) => {
                let (o, c) = find_bracket_pair(buf, pos, open, close)?;
                Some(Span::chars(index_range(buf, o, c + 1)))
            }
        }
    }
}

fn index_range(buf: &Buffer, start: usize, end: usize) -> Range {
    Range::ordered(buf.position_of(start), buf.position_of(end))
}

fn class_at(buf: &Buffer, idx: usize, classify_fn: fn(char) -> CharClass) -> CharClass {
    buf.char_at_index(idx).map_or(CharClass::Newline, classify_fn)
}

// ---------------------------------------------------------------------------
// Word objects
// ---------------------------------------------------------------------------

/// Same-class run around the cursor. On a blank, the blank run; never
/// crosses a newline.
fn inner_word(buf: &Buffer, pos: Position, classify_fn: fn(char) -> CharClass) -> Option<Range> {
    buf.char_at(pos)?;
    let idx = buf.char_idx(pos);
    let class = class_at(buf, idx, classify_fn);

    let mut start = idx;
    while start > 0 && class_at(buf, start - 1, classify_fn) == class {
        start -= 1;
    }
    let mut end = idx + 1;
    while end < buf.len_chars() && class_at(buf, end, classify_fn) == class {
        end += 1;
    }
    Some(index_range(buf, start, end))
}

/// The word plus trailing blanks (leading if there are none). From a blank,
/// the blanks plus the following word.
fn a_word(buf: &Buffer, pos: Position, classify_fn: fn(char) -> CharClass) -> Option<Range> {
    let inner = inner_word(buf, pos, classify_fn)?;
    let total = buf.len_chars();
    let start = buf.char_idx(inner.start);
    let end = buf.char_idx(inner.end);

    if class_at(buf, start, classify_fn) == CharClass::Blank {
        let next = class_at(buf, end, classify_fn);
        let mut new_end = end;
        if matches!(next, CharClass::Word | CharClass::Punctuation) {
            while new_end < total && class_at(buf, new_end, classify_fn) == next {
                new_end += 1;
            }
        }
        return Some(index_range(buf, start, new_end));
    }

    let mut new_end = end;
    while new_end < total && class_at(buf, new_end, classify_fn) == CharClass::Blank {
        new_end += 1;
    }
    if new_end > end {
        return Some(index_range(buf, start, new_end));
    }

    let mut new_start = start;
    while new_start > 0 && class_at(buf, new_start - 1, classify_fn) == CharClass::Blank {
        new_start -= 1;
    }
    Some(index_range(buf, new_start, end))
}

// ---------------------------------------------------------------------------
// Quote objects
// ---------------------------------------------------------------------------

fn quote(buf: &Buffer, pos: Position, q: char, around: bool) -> Option<Range> {
    let (open, close) = find_quote_pair(buf, pos, q)?;
    let line = pos.line;
    if !around {
        return Some(Range::ordered(
            Position::new(line, open + 1),
            Position::new(line, close),
        ));
    }
    let chars: Vec<char> = buf.line_text(line).chars().collect();
    let mut end = close + 1;
    while end < chars.len() && chars[end].is_whitespace() {
        end += 1;
    }
    let mut start = open;
    if end == close + 1 {
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
    }
    Some(Range::ordered(Position::new(line, start), Position::new(line, end)))
}

/// Quotes pair up left to right on the cursor line. Returns the pair that
/// contains the cursor, else the first pair after it.
fn find_quote_pair(buf: &Buffer, pos: Position, q: char) -> Option<(usize, usize)> {
    let quotes: Vec<usize> = buf
        .line_text(pos.line)
        .chars()
        .enumerate()
        .filter_map(|(i, ch)| (ch == q).then_some(i))
        .collect();

    let pairs = || quotes.chunks_exact(2).map(|p| (p[0], p[1]));
    pairs()
        .find(|&(open, close)| pos.col >= open && pos.col <= close)
        .or_else(|| pairs().find(|&(open, _)| open > pos.col))
}

// ---------------------------------------------------------------------------
// Bracket objects
// ---------------------------------------------------------------------------

fn inner_bracket(buf: &Buffer, pos: Position, open: char, close: char) -> Option<Span> {
    let (o, c) = find_bracket_pair(buf, pos, open, close)?;
    let open_pos = buf.position_of(o);
    let close_pos = buf.position_of(c);

    let open_at_eol = open_pos.col + 1 == buf.line_len(open_pos.line);
    let close_alone = buf
        .line_text(close_pos.line)
        .chars()
        .take(close_pos.col)
        .all(char::is_whitespace);
    if open_at_eol && close_alone && close_pos.line > open_pos.line + 1 {
        return Some(Span::lines(open_pos.line + 1, close_pos.line - 1));
    }
    Some(Span::chars(index_range(buf, o + 1, c)))
}

/// Char indices of the innermost `open`/`close` pair around the cursor.
/// Nesting is tracked and pairs may span lines.
fn find_bracket_pair(buf: &Buffer, pos: Position, open: char, close: char) -> Option<(usize, usize)> {
    let idx = buf.char_idx(pos);
    let at = buf.char_at(pos)?;
    if at == open {
        return Some((idx, find_closing(buf, idx, open, close)?));
    }
    if at == close {
        return Some((find_opening(buf, idx, open, close)?, idx));
    }
    let o = find_opening(buf, idx, open, close)?;
    let c = find_closing(buf, o, open, close)?;
    (idx > o && idx < c).then_some((o, c))
}

fn find_opening(buf: &Buffer, from: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..from).rev() {
        match buf.char_at_index(i) {
            Some(ch) if ch == close => depth += 1,
            Some(ch) if ch == open => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

fn find_closing(buf: &Buffer, from: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for i in from + 1..buf.len_chars() {
        match buf.char_at_index(i) {
            Some(ch) if ch == open => depth += 1,
            Some(ch) if ch == close => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

/// The bracket matching the one at or after the cursor on its line (`%`).
#[must_use]
pub fn matching_bracket(buf: &Buffer, pos: Position) -> Option<Position> {
    const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];
    let line = buf.line_text(pos.line);
    let (col, ch) = line
        .chars()
        .enumerate()
        .skip(pos.col)
        .find(|(_, ch)| PAIRS.iter().any(|&(o, c)| *ch == o || *ch == c))?;

    let idx = buf.char_idx(pos.with_col(col));
    let target = PAIRS.iter().find_map(|&(o, c)| {
        if ch == o {
            find_closing(buf, idx, o, c)
        } else if ch == c {
            find_opening(buf, idx, o, c)
        } else {
            None
        }
    })?;
    Some(buf.position_of(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn selected(text: &str, at: Position, key: char, around: bool) -> Option<String> {
        let buf = Buffer::from_text(text);
        let span = TextObject::new(ObjectKind::from_key(key)?, around).span(&buf, at)?;
        if span.linewise {
            return Some(format!("lines {}..={}", span.first_line(), span.last_line()));
        }
        Some(buf.slice(span.range))
    }

    // -- Words ----------------------------------------------------------------

    #[test]
    fn inner_word_selects_run() {
        assert_eq!(selected("foo bar", p(0, 5), 'w', false).as_deref(), Some("bar"));
        assert_eq!(selected("a.b", p(0, 1), 'w', false).as_deref(), Some("."));
        assert_eq!(selected("a  b", p(0, 1), 'w', false).as_deref(), Some("  "));
    }

    #[test]
    fn a_word_takes_trailing_then_leading_blanks() {
        assert_eq!(selected("foo bar baz", p(0, 5), 'w', true).as_deref(), Some("bar "));
        assert_eq!(selected("foo bar", p(0, 5), 'w', true).as_deref(), Some(" bar"));
        assert_eq!(selected("a  b", p(0, 1), 'w', true).as_deref(), Some("  b"));
    }

    #[test]
    fn big_word_spans_punctuation() {
        assert_eq!(selected("x foo.bar y", p(0, 3), 'W', false).as_deref(), Some("foo.bar"));
    }

    #[test]
    fn word_on_empty_line_is_none() {
        assert_eq!(selected("a\n\nb", p(1, 0), 'w', false), None);
    }

    // -- Quotes ---------------------------------------------------------------

    #[test]
    fn quotes_inside_and_after_cursor() {
        let text = r#"name = "vim master" end"#;
        assert_eq!(selected(text, p(0, 10), '"', false).as_deref(), Some("vim master"));
        assert_eq!(selected(text, p(0, 0), '"', false).as_deref(), Some("vim master"));
        assert_eq!(selected(text, p(0, 10), '"', true).as_deref(), Some(r#""vim master" "#));
    }

    #[test]
    fn empty_quotes_select_nothing() {
        assert_eq!(selected("x = ''", p(0, 4), '\'', false).as_deref(), Some(""));
        assert_eq!(selected("no quotes", p(0, 0), '"', false), None);
    }

    // -- Brackets -------------------------------------------------------------

    #[test]
    fn brackets_nest() {
        let text = "f(a, (b), c)";
        assert_eq!(selected(text, p(0, 3), '(', false).as_deref(), Some("a, (b), c"));
        assert_eq!(selected(text, p(0, 6), 'b', true).as_deref(), Some("(b)"));
        assert_eq!(selected(text, p(0, 1), ')', true).as_deref(), Some("(a, (b), c)"));
    }

    #[test]
    fn inner_block_on_own_lines_is_linewise() {
        let text = "fn x() {\n    a;\n    b;\n}";
        assert_eq!(selected(text, p(1, 4), '{', false).as_deref(), Some("lines 1..=2"));
        assert_eq!(selected(text, p(1, 4), 'B', true).as_deref(), Some("{\n    a;\n    b;\n}"));
    }

    #[test]
    fn no_enclosing_bracket_is_none() {
        assert_eq!(selected("abc", p(0, 1), '(', false), None);
        assert_eq!(ObjectKind::from_key('z'), None);
    }

    // -- % --------------------------------------------------------------------

    #[test]
    fn matching_bracket_searches_forward_on_line() {
        let buf = Buffer::from_text("if (a[1]) {\n}");
        assert_eq!(matching_bracket(&buf, p(0, 0)), Some(p(0, 8)));
        assert_eq!(matching_bracket(&buf, p(0, 8)), Some(p(0, 3)));
        assert_eq!(matching_bracket(&buf, p(0, 9)), Some(p(1, 0)));
        assert_eq!(matching_bracket(&buf, p(1, 0)), Some(p(0, 10)));
        assert_eq!(matching_bracket(&Buffer::from_text("abc"), p(0, 0)), None);
    }
}
