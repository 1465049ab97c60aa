//! Search: patterns, match finding and the per-pane search state.
//!
//! Patterns are written in Vim's default ("magic") syntax and translated
//! into [`regex`] syntax once, when the search is committed. Matching is per
//! line, so a pattern never spans a newline.
//!
//! # Search flow
//!
//! 1. `/` or `?` opens a prompt (see [`crate::prompt`]).
//! 2. Enter compiles the text into a [`Pattern`] and stores it in
//!    [`SearchState`] together with the direction.
//! 3. `n`/`N` re-run [`find`] with the stored pattern, which also turns
//!    highlighting back on after `:noh`.
//!
//! A forward search starts just after the cursor and wraps from the last
//! line to the first exactly once; [`Found::wrapped`] tells the caller to
//! show the "search hit BOTTOM" message.

use regex::Regex;

use crate::buffer::Buffer;
use crate::error::Error;
use crate::position::Position;
use crate::word::word_under_cursor;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// The prompt character (`/` or `?`).
    #[must_use]
    pub const fn prompt(self) -> char {
        match self {
            Self::Forward => '/',
            Self::Backward => '?',
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A compiled search pattern plus the text the user sees for it.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern written in Vim syntax.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPattern`] when the translated expression does not
    /// compile.
    pub fn new(source: &str) -> Result<Self, Error> {
        let translated = translate(source);
        let regex = Regex::new(&translated).map_err(|e| Error::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern `*`/`#` search for: `\<word\>` for keywords, the escaped
    /// text otherwise. `None` when the cursor line has no word.
    #[must_use]
    pub fn word_at(buf: &Buffer, pos: Position) -> Option<Self> {
        let (word, keyword) = word_under_cursor(buf, pos)?;
        let escaped = escape_magic(&word);
        let source = if keyword { format!("\\<{escaped}\\>") } else { escaped };
        Self::new(&source).ok()
    }

    /// The pattern as typed (or as built for `*`).
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Matches on one line, as `(start_col, len)` in chars.
    fn matches_on(&self, text: &str) -> Vec<(usize, usize)> {
        self.regex
            .find_iter(text)
            .map(|m| {
                let start = text[..m.start()].chars().count();
                (start, m.as_str().chars().count())
            })
            .collect()
    }
}

/// Escape chars that are special in a magic pattern.
#[must_use]
pub fn escape_magic(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '/' | '.' | '*' | '$' | '^' | '~' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Translate Vim magic syntax into `regex` syntax.
///
/// `\< \>` become word boundaries, `\( \) \| \+ \? \=` their bare forms
/// (groups capture, for `\1` in substitutions), `\c` ignores case,
/// `\{n,m}` a counted repeat and `\{-}` a lazy star. `( ) | + ? { }` are
/// literal, as in Vim. `^` and `$` anchor only at the ends.
fn translate(src: &str) -> String {
    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len() + 8);
    let mut ignore_case = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '\\' if i + 1 < chars.len() => {
                i += 1;
                let next = chars[i];
                match next {
                    '<' | '>' => out.push_str(r"\b"),
                    '(' => out.push('('),
                    'c' => ignore_case = true,
                    'C' => {}
                    ')' => out.push(')'),
                    '|' => out.push('|'),
                    '+' => out.push('+'),
                    '?' | '=' => out.push('?'),
                    '{' => {
                        let close = chars[i..].iter().position(|&c| c == '}').map(|p| i + p);
                        if let Some(close) = close {
                            let inner: String = chars[i + 1..close]
                                .iter()
                                .filter(|&&c| c != '\\')
                                .collect();
                            if inner == "-" {
                                out.push_str("*?");
                            } else {
                                out.push('{');
                                out.push_str(&inner);
                                out.push('}');
                            }
                            i = close;
                        } else {
                            out.push_str(r"\{");
                        }
                    }
                    'd' | 'D' | 's' | 'S' | 'w' | 'W' => {
                        out.push('\\');
                        out.push(next);
                    }
                    'a' => out.push_str("[A-Za-z]"),
                    'l' => out.push_str("[a-z]"),
                    'u' => out.push_str("[A-Z]"),
                    'x' => out.push_str("[0-9A-Fa-f]"),
                    't' => out.push_str(r"\t"),
                    other => out.push_str(&regex::escape(&other.to_string())),
                }
            }
            '.' => out.push('.'),
            '*' if i > 0 => out.push('*'),
            '^' if i == 0 => out.push('^'),
            '$' if i + 1 == chars.len() => out.push('$'),
            '[' => {
                let close = chars[i + 1..]
                    .iter()
                    .enumerate()
                    .skip(1)
                    .find(|&(_, &c)| c == ']')
                    .map(|(p, _)| i + 1 + p);
                if let Some(close) = close {
                    out.push('[');
                    for &c in &chars[i + 1..close] {
                        if c == '[' {
                            out.push('\\');
                        }
                        out.push(c);
                    }
                    out.push(']');
                    i = close;
                } else {
                    out.push_str(r"\[");
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
        i += 1;
    }
    if ignore_case {
        out.insert_str(0, "(?i)");
    }
    out
}

// ---------------------------------------------------------------------------
// Finding matches
// ---------------------------------------------------------------------------

/// A match: start position and length in chars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub start: Position,
    pub len: usize,
}

/// Result of [`find`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Found {
    pub at: Position,
    /// True when the scan passed the end (or start) of the buffer.
    pub wrapped: bool,
}

/// Next match strictly after (forward) or before (backward) `from`,
/// wrapping around once. A match at `from` itself is found only after
/// wrapping.
#[must_use]
pub fn find(buf: &Buffer, pattern: &Pattern, from: Position, dir: SearchDirection) -> Option<Found> {
    let lines = buf.line_count();
    let cols = |line: usize| -> Vec<usize> {
        pattern
            .matches_on(&buf.line_text(line))
            .into_iter()
            .map(|(col, _)| col)
            .collect()
    };

    match dir {
        SearchDirection::Forward => {
            if let Some(&col) = cols(from.line).iter().find(|&&c| c > from.col) {
                return Some(Found { at: from.with_col(col), wrapped: false });
            }
            for step in 1..=lines {
                let line = (from.line + step) % lines;
                let wrapped = from.line + step >= lines;
                let found = cols(line).into_iter().find(|&c| line != from.line || c <= from.col);
                if let Some(col) = found {
                    return Some(Found { at: Position::new(line, col), wrapped });
                }
            }
            None
        }
        SearchDirection::Backward => {
            if let Some(&col) = cols(from.line).iter().rev().find(|&&c| c < from.col) {
                return Some(Found { at: from.with_col(col), wrapped: false });
            }
            for step in 1..=lines {
                let line = (from.line + lines - step) % lines;
                let wrapped = step > from.line;
                let found = cols(line)
                    .into_iter()
                    .rev()
                    .find(|&c| line != from.line || c >= from.col);
                if let Some(col) = found {
                    return Some(Found { at: Position::new(line, col), wrapped });
                }
            }
            None
        }
    }
}

/// All matches in lines `[start_line, end_line)`, in document order.
#[must_use]
pub fn find_all(buf: &Buffer, pattern: &Pattern, start_line: usize, end_line: usize) -> Vec<Match> {
    (start_line..end_line.min(buf.line_count()))
        .flat_map(|line| {
            pattern
                .matches_on(&buf.line_text(line))
                .into_iter()
                .filter(|&(_, len)| len > 0)
                .map(move |(col, len)| Match { start: Position::new(line, col), len })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SearchState
// ---------------------------------------------------------------------------

/// Last pattern, its direction and whether matches are highlighted.
///
/// `:noh` only clears `highlight`; the pattern stays for `n`/`N`.
#[derive(Clone, Debug)]
pub struct SearchState {
    last: Option<Pattern>,
    direction: SearchDirection,
    highlight: bool,
}

impl SearchState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: None,
            direction: SearchDirection::Forward,
            highlight: false,
        }
    }

    /// Commit a new search; highlighting turns on.
    pub fn set(&mut self, pattern: Pattern, direction: SearchDirection) {
        self.last = Some(pattern);
        self.direction = direction;
        self.highlight = true;
    }

    #[must_use]
    pub const fn pattern(&self) -> Option<&Pattern> {
        self.last.as_ref()
    }

    #[must_use]
    pub const fn direction(&self) -> SearchDirection {
        self.direction
    }

    /// `:nohlsearch`.
    pub const fn clear_highlight(&mut self) {
        self.highlight = false;
    }

    /// `n`/`N` turn highlighting back on.
    pub const fn resume_highlight(&mut self) {
        self.highlight = true;
    }

    /// The highlight-enabled flag itself.
    #[must_use]
    pub const fn highlight_enabled(&self) -> bool {
        self.highlight
    }

    /// The pattern to paint, if highlighting is on.
    #[must_use]
    pub const fn highlighted(&self) -> Option<&Pattern> {
        if self.highlight { self.last.as_ref() } else { None }
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn pat(src: &str) -> Pattern {
        Pattern::new(src).unwrap_or_else(|e| panic!("{src}: {e}"))
    }

    // -- Translation ----------------------------------------------------------

    #[test]
    fn translate_magic_syntax() {
        assert_eq!(translate(r"\<foo\>"), r"\bfoo\b");
        assert_eq!(translate("a.c*"), "a.c*");
        assert_eq!(translate("f(x)+1"), r"f\(x\)\+1");
        assert_eq!(translate(r"\(a\|b\)\+"), "(a|b)+");
        assert_eq!(translate(r"\cfoo"), "(?i)foo");
        assert_eq!(translate(r"x\{2,3}"), "x{2,3}");
        assert_eq!(translate("^a$"), "^a$");
        assert_eq!(translate("a^$b"), r"a\^\$b");
        assert_eq!(translate("[abc]x"), "[abc]x");
        assert_eq!(translate("[x"), r"\[x");
    }

    #[test]
    fn escape_magic_round_trips_through_translate() {
        let text = "a.b*c[d]";
        let compiled = pat(&escape_magic(text));
        assert!(compiled.regex().is_match(text));
        assert!(!compiled.regex().is_match("aXbbc"));
    }

    // -- find -----------------------------------------------------------------

    #[test]
    fn forward_skips_cursor_position() {
        let buf = Buffer::from_text("foo foo\nbar foo");
        let foo = pat("foo");
        let hit = find(&buf, &foo, p(0, 0), SearchDirection::Forward);
        assert_eq!(hit, Some(Found { at: p(0, 4), wrapped: false }));
        let hit = find(&buf, &foo, p(0, 4), SearchDirection::Forward);
        assert_eq!(hit, Some(Found { at: p(1, 4), wrapped: false }));
    }

    #[test]
    fn forward_wraps_to_top() {
        let buf = Buffer::from_text("hello\nworld\nend");
        let hit = find(&buf, &pat("hello"), p(2, 0), SearchDirection::Forward);
        assert_eq!(hit, Some(Found { at: p(0, 0), wrapped: true }));
    }

    #[test]
    fn only_match_at_cursor_is_found_after_wrap() {
        let buf = Buffer::from_text("one\ntwo");
        let hit = find(&buf, &pat("two"), p(1, 0), SearchDirection::Forward);
        assert_eq!(hit, Some(Found { at: p(1, 0), wrapped: true }));
    }

    #[test]
    fn backward_search_and_wrap() {
        let buf = Buffer::from_text("x1 x2\nx3");
        let x = pat("x");
        assert_eq!(find(&buf, &x, p(0, 3), SearchDirection::Backward).map(|f| f.at), Some(p(0, 0)));
        let hit = find(&buf, &x, p(0, 0), SearchDirection::Backward);
        assert_eq!(hit, Some(Found { at: p(1, 0), wrapped: true }));
    }

    #[test]
    fn missing_pattern_is_none() {
        let buf = Buffer::from_text("abc");
        assert_eq!(find(&buf, &pat("zzz"), p(0, 0), SearchDirection::Forward), None);
        assert_eq!(find(&buf, &pat("zzz"), p(0, 0), SearchDirection::Backward), None);
    }

    #[test]
    fn find_all_reports_char_columns() {
        let buf = Buffer::from_text("été été\nnope");
        let all = find_all(&buf, &pat("été"), 0, 10);
        assert_eq!(
            all,
            vec![Match { start: p(0, 0), len: 3 }, Match { start: p(0, 4), len: 3 }]
        );
    }

    #[test]
    fn word_pattern_matches_whole_words() {
        let buf = Buffer::from_text("foo food foo");
        let word = Pattern::word_at(&buf, p(0, 0)).unwrap_or_else(|| panic!("no word"));
        assert_eq!(word.source(), r"\<foo\>");
        let cols: Vec<usize> = find_all(&buf, &word, 0, 1).iter().map(|m| m.start.col).collect();
        assert_eq!(cols, vec![0, 9]);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(matches!(Pattern::new(r"\(a"), Err(Error::InvalidPattern { .. })));
    }

    // -- SearchState ----------------------------------------------------------

    #[test]
    fn noh_keeps_pattern() {
        let mut state = SearchState::new();
        assert!(state.highlighted().is_none());
        state.set(pat("hello"), SearchDirection::Forward);
        assert!(state.highlighted().is_some());

        state.clear_highlight();
        state.clear_highlight();
        assert!(!state.highlight_enabled());
        assert_eq!(state.pattern().map(Pattern::source), Some("hello"));

        state.resume_highlight();
        assert!(state.highlighted().is_some());
    }
}
