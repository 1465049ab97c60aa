//! Buffer edits shared by every mode.
//!
//! All changes go through [`Pane::insert_text`] and [`Pane::delete_range`].
//! They open an undo transaction on first use (remembering the cursor
//! from before the change), record the edit and flag the change for `.`.
//! The transaction is committed when the pane settles back in Normal
//! mode, so one command, or one Insert session, is one undo step.
//!
//! Messages follow Vim's `report` threshold: line counts are only echoed
//! when more than two lines are involved.

use tracing::trace;
use vimux_term::input::{KeyCode, KeyEvent};

use crate::cursor::first_non_blank;
use crate::insert::InsertKind;
use crate::keymap::{Operator, Scroll};
use crate::pane::Pane;
use crate::position::{Position, Range, Span};
use crate::register::{Register, RegisterKind};

/// Lines an operation must touch before it is reported.
const REPORT: usize = 2;

/// Longest text a count may repeat into, in bytes.
pub(crate) const MAX_REPEAT_BYTES: usize = 1 << 20;

pub(crate) const TEXT_TOO_LONG: &str = "E1240: Resulting text too long";

/// Bytes of `unit` repeated `count` times, or `None` past [`MAX_REPEAT_BYTES`].
pub(crate) fn repeated_len(unit: usize, count: usize) -> Option<usize> {
    unit.checked_mul(count).filter(|&len| len <= MAX_REPEAT_BYTES)
}

/// Flip the case of every char.
pub(crate) fn swap_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_uppercase() {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
    }
    out
}

impl Pane {
    // -- Primitives ---------------------------------------------------------

    fn begin_change(&mut self) {
        if !self.history.is_open() {
            self.history.begin(self.cursor.position());
        }
        self.dot.mark_change();
    }

    /// Insert `text` at `pos` (clamped into the buffer).
    pub(crate) fn insert_text(&mut self, pos: Position, text: &str) {
        if text.is_empty() {
            return;
        }
        let pos = self.buffer.position_of(self.buffer.char_idx(pos));
        self.begin_change();
        self.buffer.insert(pos, text);
        self.history.record_insert(pos, text);
    }

    /// Delete `range` and return what was removed.
    pub(crate) fn delete_range(&mut self, range: Range) -> String {
        let start = self.buffer.position_of(self.buffer.char_idx(range.start));
        let end = self.buffer.position_of(self.buffer.char_idx(range.end));
        if start == end {
            return String::new();
        }
        self.begin_change();
        let text = self.buffer.delete(Range { start, end });
        self.history.record_delete(start, &text);
        text
    }

    /// Swap the text in `range` for `text`, if it differs.
    pub(crate) fn replace_text(&mut self, range: Range, text: &str) {
        if self.buffer.slice(range) == text {
            return;
        }
        self.delete_range(range);
        self.insert_text(range.start, text);
    }

    // -- Operators ----------------------------------------------------------

    /// Run `op` over `span`, honouring a `"x` register prefix.
    pub(crate) fn apply_operator(&mut self, op: Operator, span: Span) {
        trace!(target: "pane.edit", ?op, ?span, "operator");
        let register = self.register.take();
        if span.linewise {
            self.linewise_operator(op, span.first_line(), span.last_line(), register);
        } else {
            self.charwise_operator(op, span.range, register);
        }
    }

    fn charwise_operator(&mut self, op: Operator, range: Range, register: Option<char>) {
        let text = self.buffer.slice(range);
        let lines = range.line_span();
        if !text.is_empty() {
            self.registers.store(register, Register::new(text.as_str(), RegisterKind::Char));
        }
        match op {
            Operator::Yank => {
                self.cursor.set_position(range.start, &self.buffer, false);
                if lines > REPORT {
                    self.set_message(format!("{lines} lines yanked"));
                }
            }
            Operator::Delete => {
                if text.is_empty() {
                    return;
                }
                let before = self.buffer.line_count();
                self.delete_range(range);
                self.cursor.set_position(range.start, &self.buffer, false);
                self.report_fewer(before);
            }
            Operator::Change => {
                self.delete_range(range);
                self.cursor.set_position(range.start, &self.buffer, true);
                self.start_insert(InsertKind::Plain, 1);
            }
        }
    }

    fn linewise_operator(&mut self, op: Operator, first: usize, last: usize, register: Option<char>) {
        let last_line = self.buffer.line_count() - 1;
        let last = last.min(last_line);
        let n = last - first + 1;
        let text: String = (first..=last).map(|l| self.buffer.line_text(l) + "\n").collect();
        self.registers.store(register, Register::new(text, RegisterKind::Line));

        match op {
            Operator::Yank => {
                if first < self.cursor.line() {
                    let col = self.cursor.col();
                    self.cursor.set_position(Position::new(first, col), &self.buffer, false);
                }
                if n > REPORT {
                    self.set_message(format!("{n} lines yanked"));
                }
            }
            Operator::Delete => {
                let range = if last < last_line {
                    Range::ordered(Position::new(first, 0), Position::new(last + 1, 0))
                } else if first > 0 {
                    let prev = first - 1;
                    Range::ordered(
                        Position::new(prev, self.buffer.line_len(prev)),
                        Position::new(last, self.buffer.line_len(last)),
                    )
                } else {
                    Range::ordered(Position::ZERO, Position::new(last, self.buffer.line_len(last)))
                };
                let before = self.buffer.line_count();
                self.delete_range(range);
                let line = first.min(self.buffer.line_count() - 1);
                self.cursor.goto_line(line, &self.buffer, false);
                if self.buffer.len_chars() == 0 {
                    self.set_message("--No lines in buffer--");
                } else {
                    self.report_fewer(before);
                }
            }
            Operator::Change => {
                let range = Range::ordered(
                    Position::new(first, 0),
                    Position::new(last, self.buffer.line_len(last)),
                );
                self.delete_range(range);
                self.cursor.set_position(Position::new(first, 0), &self.buffer, true);
                self.start_insert(InsertKind::Plain, 1);
            }
        }
    }

    fn report_fewer(&mut self, before: usize) {
        let removed = before.saturating_sub(self.buffer.line_count());
        if removed > REPORT {
            self.set_message(format!("{removed} fewer lines"));
        }
    }

    // -- Put ----------------------------------------------------------------

    /// `p` / `P` from the selected register.
    pub(crate) fn put(&mut self, after: bool, count: usize) {
        let name = self.register.take();
        let reg = self.registers.get(name).clone();
        if reg.is_empty() {
            self.set_error(format!("E353: Nothing in register {}", name.unwrap_or('"')));
            return;
        }
        let count = count.max(1);
        let unit = match reg.kind() {
            RegisterKind::Block => {
                let rows = reg.rows();
                let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
                rows.iter().map(|r| r.len() + width).sum()
            }
            RegisterKind::Char | RegisterKind::Line => reg.content().len(),
        };
        if repeated_len(unit, count).is_none() {
            self.set_error(TEXT_TOO_LONG);
            return;
        }
        match reg.kind() {
            RegisterKind::Char => self.put_chars(&reg, after, count),
            RegisterKind::Line => self.put_lines(&reg, after, count),
            RegisterKind::Block => self.put_block(&reg, after, count),
        }
    }

    fn put_chars(&mut self, reg: &Register, after: bool, count: usize) {
        let pos = self.cursor.position();
        let at = if after && self.buffer.line_len(pos.line) > 0 {
            pos.with_col(pos.col + 1)
        } else {
            pos
        };
        let text = reg.content().repeat(count);
        self.insert_text(at, &text);
        let added = text.matches('\n').count();
        if added == 0 {
            let end = at.col + text.chars().count() - 1;
            self.cursor.set_position(at.with_col(end), &self.buffer, false);
        } else {
            self.cursor.set_position(at, &self.buffer, false);
        }
        if added > REPORT {
            self.set_message(format!("{added} more lines"));
        }
    }

    fn put_lines(&mut self, reg: &Register, after: bool, count: usize) {
        let line = self.cursor.line();
        let body = reg.content().repeat(count);
        let added = reg.rows().len().saturating_mul(count);
        let first = if !after {
            self.insert_text(Position::new(line, 0), &body);
            line
        } else if line + 1 < self.buffer.line_count() {
            self.insert_text(Position::new(line + 1, 0), &body);
            line + 1
        } else {
            let len = self.buffer.line_len(line);
            let text = format!("\n{}", body.strip_suffix('\n').unwrap_or(&body));
            self.insert_text(Position::new(line, len), &text);
            line + 1
        };
        self.cursor.goto_line(first, &self.buffer, false);
        if added > REPORT {
            self.set_message(format!("{added} more lines"));
        }
    }

    /// A block goes in column by column, padding short lines with spaces
    /// and adding lines at the end of the buffer as needed.
    fn put_block(&mut self, reg: &Register, after: bool, count: usize) {
        let pos = self.cursor.position();
        let col = if after && self.buffer.line_len(pos.line) > 0 {
            pos.col + 1
        } else {
            pos.col
        };
        let rows = reg.rows();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);

        for (i, row) in rows.iter().enumerate() {
            let line = pos.line + i;
            if line >= self.buffer.line_count() {
                let last = self.buffer.line_count() - 1;
                let len = self.buffer.line_len(last);
                self.insert_text(Position::new(last, len), "\n");
            }
            let len = self.buffer.line_len(line);
            if len < col {
                self.insert_text(Position::new(line, len), &" ".repeat(col - len));
            }
            let mut text = format!("{row:<width$}").repeat(count);
            if len <= col {
                text.truncate(text.trim_end_matches(' ').len());
            }
            self.insert_text(Position::new(line, col), &text);
        }
        self.cursor.set_position(Position::new(pos.line, col), &self.buffer, false);
    }

    // -- Line edits ---------------------------------------------------------

    /// `o` / `O`: open an empty line and put the cursor on it.
    pub(crate) fn open_line(&mut self, below: bool) {
        let line = self.cursor.line();
        if below {
            let len = self.buffer.line_len(line);
            self.insert_text(Position::new(line, len), "\n");
            self.cursor.set_position(Position::new(line + 1, 0), &self.buffer, true);
        } else {
            self.insert_text(Position::new(line, 0), "\n");
            self.cursor.set_position(Position::new(line, 0), &self.buffer, true);
        }
    }

    /// `J`: join `count` lines (at least two) starting at `first`.
    ///
    /// Leading white space of each joined line is removed and one space
    /// put in its place; two after a sentence end. No space is added
    /// when either side is empty, the line already ends in white space
    /// or the next line starts with `)`.
    pub(crate) fn join_lines(&mut self, first: usize, count: usize) {
        let last_line = self.buffer.line_count() - 1;
        if first >= last_line {
            return;
        }
        let joins = (count.max(2) - 1).min(last_line - first);
        let mut col = 0;
        for _ in 0..joins {
            let current = self.buffer.line_text(first);
            let cur_len = current.chars().count();
            let next = self.buffer.line_text(first + 1);
            let rest = next.trim_start_matches([' ', '\t']);
            let leading = next.chars().count() - rest.chars().count();

            self.delete_range(Range::ordered(
                Position::new(first, cur_len),
                Position::new(first + 1, leading),
            ));
            let sep = if cur_len == 0
                || rest.is_empty()
                || current.ends_with([' ', '\t'])
                || rest.starts_with(')')
            {
                ""
            } else if current.ends_with(['.', '!', '?']) {
                "  "
            } else {
                " "
            };
            self.insert_text(Position::new(first, cur_len), sep);
            col = cur_len;
        }
        self.cursor.set_position(Position::new(first, col), &self.buffer, false);
    }

    /// `~`: flip case of `n` chars and move past them.
    pub(crate) fn toggle_case(&mut self, n: usize) {
        let pos = self.cursor.position();
        let len = self.buffer.line_len(pos.line);
        if len == 0 {
            return;
        }
        let end = (pos.col + n).min(len);
        let range = Range::ordered(pos, pos.with_col(end));
        let flipped = swap_case(&self.buffer.slice(range));
        self.replace_text(range, &flipped);
        self.dot.mark_change();
        self.cursor.set_position(pos.with_col(end), &self.buffer, false);
    }

    /// `r{char}`: replace `count` chars. Fails if the line is too short.
    /// `r<CR>` replaces them with a single line break.
    pub(crate) fn replace_chars(&mut self, key: KeyEvent, count: usize) {
        let ch = match key.code {
            KeyCode::Enter => '\n',
            KeyCode::Tab => '\t',
            _ => match key.typed_char() {
                Some(ch) => ch,
                None => return self.cancel_command(),
            },
        };
        let pos = self.cursor.position();
        if pos.col + count > self.buffer.line_len(pos.line) {
            self.register = None;
            return;
        }
        self.delete_range(Range::ordered(pos, pos.with_col(pos.col + count)));
        if ch == '\n' {
            self.insert_text(pos, "\n");
            let line = pos.line + 1;
            let col = first_non_blank(&self.buffer, line);
            self.cursor.set_position(Position::new(line, col), &self.buffer, false);
        } else {
            self.insert_text(pos, &ch.to_string().repeat(count));
            self.cursor
                .set_position(pos.with_col(pos.col + count - 1), &self.buffer, false);
        }
    }

    // -- Undo ---------------------------------------------------------------

    /// `u`: extra steps past the oldest change do nothing.
    pub(crate) fn undo(&mut self, count: usize) {
        let mut restored = None;
        for _ in 0..count.max(1) {
            match self.history.undo(&mut self.buffer) {
                Some(pos) => restored = Some(pos),
                None => break,
            }
        }
        if let Some(pos) = restored {
            self.cursor.set_position(pos, &self.buffer, false);
            self.sync_modified();
        }
    }

    /// `Ctrl-R`
    pub(crate) fn redo(&mut self, count: usize) {
        let mut restored = None;
        for _ in 0..count.max(1) {
            match self.history.redo(&mut self.buffer) {
                Some(pos) => restored = Some(pos),
                None => break,
            }
        }
        if let Some(pos) = restored {
            self.cursor.set_position(pos, &self.buffer, false);
            self.sync_modified();
        }
    }

    // -- Scrolling ----------------------------------------------------------

    /// `Ctrl-D` `Ctrl-U` move view and cursor together; `Ctrl-E` `Ctrl-Y`
    /// move the view and drag the cursor along only when it leaves.
    pub(crate) fn scroll(&mut self, scroll: Scroll, count: Option<usize>) {
        let area = self.text_area();
        let last = self.buffer.line_count() - 1;
        let line = self.cursor.line();
        let top = self.view.top_line();
        let past_end = self.mode.cursor_past_end();
        let so = self.options.scrolloff;

        match scroll {
            Scroll::HalfDown => {
                if line == last {
                    return;
                }
                let amount = count.unwrap_or_else(|| (area.rows / 2).max(1));
                let max_top = self.view.max_top(&self.buffer, &area).max(top);
                self.view.set_top_line((top + amount).min(max_top));
                self.cursor.goto_line((line + amount).min(last), &self.buffer, past_end);
            }
            Scroll::HalfUp => {
                if line == 0 {
                    return;
                }
                let amount = count.unwrap_or_else(|| (area.rows / 2).max(1));
                self.view.set_top_line(top.saturating_sub(amount));
                self.cursor.goto_line(line.saturating_sub(amount), &self.buffer, past_end);
            }
            Scroll::LineDown => {
                let new_top = (top + count.unwrap_or(1)).min(last);
                self.view.set_top_line(new_top);
                let min_line = (new_top + so).min(last);
                if line < min_line {
                    self.cursor.move_down(min_line - line, &self.buffer, past_end);
                }
            }
            Scroll::LineUp => {
                self.view.set_top_line(top.saturating_sub(count.unwrap_or(1)));
                let bottom = self.view.bottom_line(&self.buffer, &area);
                let max_line = if bottom == last { bottom } else { bottom.saturating_sub(so) };
                if line > max_line {
                    self.cursor.move_up(line - max_line, &self.buffer, past_end);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::tests::{at, feed, run};
    use pretty_assertions::assert_eq;

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    // -- Operators ------------------------------------------------------------

    #[test]
    fn linewise_delete_at_end_eats_previous_newline() {
        let p = run("a\nb\nc", "Gdd");
        assert_eq!(p.buffer.lines(), vec!["a", "b"]);
        assert_eq!(at(&p), (1, 0));
    }

    #[test]
    fn big_deletes_are_reported() {
        let p = run(&numbered(5), "3dd");
        assert_eq!(p.message().map(|m| m.text.as_str()), Some("3 fewer lines"));
        let p = run(&numbered(5), "2dd");
        assert_eq!(p.message(), None);
    }

    #[test]
    fn deleting_everything() {
        let p = run("a\nb", "dG");
        assert_eq!(p.buffer.contents(), "");
        assert_eq!(p.message().map(|m| m.text.as_str()), Some("--No lines in buffer--"));
        assert_eq!(p.registers.get(None).content(), "a\nb\n");
    }

    #[test]
    fn yank_moves_to_start_and_reports() {
        let p = run(&numbered(5), "G3yk");
        assert_eq!(p.message().map(|m| m.text.as_str()), Some("4 lines yanked"));
        assert_eq!(at(&p), (1, 0));
        assert_eq!(p.buffer.line_count(), 5);
        let p = run("one two", "wyb");
        assert_eq!(p.registers.get(None).content(), "one ");
        assert_eq!(at(&p), (0, 0));
    }

    #[test]
    fn named_registers() {
        let mut p = run("one\ntwo", "\"ayyj\"Ayy");
        assert_eq!(p.registers.get(Some('a')).content(), "one\ntwo\n");
        feed(&mut p, "\"ap");
        assert_eq!(p.buffer.lines(), vec!["one", "two", "one", "two"]);
    }

    // -- Put ------------------------------------------------------------------

    #[test]
    fn put_lines_with_count() {
        let p = run("a\nb", "yy3p");
        assert_eq!(p.buffer.lines(), vec!["a", "a", "a", "a", "b"]);
        assert_eq!(p.message().map(|m| m.text.as_str()), Some("3 more lines"));
        assert_eq!(at(&p), (1, 0));
    }

    #[test]
    fn put_before_and_chars() {
        let p = run("a\nb", "jyykP");
        assert_eq!(p.buffer.lines(), vec!["b", "a", "b"]);
        let p = run("abc", "yl3p");
        assert_eq!(p.buffer.contents(), "aaaabc");
        assert_eq!(at(&p), (0, 3));
    }

    #[test]
    fn put_from_empty_register() {
        let p = run("abc", "p");
        assert_eq!(
            p.message().map(|m| m.text.as_str()),
            Some("E353: Nothing in register \"")
        );
    }

    // -- Join -----------------------------------------------------------------

    #[test]
    fn join_spacing_rules() {
        assert_eq!(run("foo\n   bar", "J").buffer.contents(), "foo bar");
        assert_eq!(run("end.\nnext", "J").buffer.contents(), "end.  next");
        assert_eq!(run("f(a\n)", "J").buffer.contents(), "f(a)");
        assert_eq!(run("a \nb", "J").buffer.contents(), "a b");
        assert_eq!(run("a\n\nb", "J").buffer.lines(), vec!["a", "b"]);
    }

    #[test]
    fn join_count_and_cursor() {
        let p = run("a\nb\nc\nd", "3J");
        assert_eq!(p.buffer.lines(), vec!["a b c", "d"]);
        assert_eq!(at(&p), (0, 3));
        let p = run("a\nb", "jJ");
        assert_eq!(p.buffer.lines(), vec!["a", "b"]);
    }

    // -- Replace and case -----------------------------------------------------

    #[test]
    fn replace_needs_enough_chars() {
        let p = run("abc", "2rx");
        assert_eq!(p.buffer.contents(), "xxc");
        assert_eq!(at(&p), (0, 1));
        let p = run("abc", "5rx");
        assert_eq!(p.buffer.contents(), "abc");
    }

    #[test]
    fn replace_with_line_break() {
        let p = run("ab cd", "llr<CR>");
        assert_eq!(p.buffer.lines(), vec!["ab", "cd"]);
        assert_eq!(at(&p), (1, 0));
    }

    #[test]
    fn toggle_case_advances() {
        let p = run("hello", "3~");
        assert_eq!(p.buffer.contents(), "HELlo");
        assert_eq!(at(&p), (0, 3));
        let p = run("aB", "~~");
        assert_eq!(p.buffer.contents(), "Ab");
        assert_eq!(at(&p), (0, 1));
    }

    // -- Undo -----------------------------------------------------------------

    #[test]
    fn undo_redo_restore_cursor() {
        let mut p = run("abc", "lxx");
        assert_eq!(p.buffer.contents(), "a");
        feed(&mut p, "u");
        assert_eq!(p.buffer.contents(), "ac");
        assert_eq!(at(&p), (0, 1));
        feed(&mut p, "u<C-r>");
        assert_eq!(p.buffer.contents(), "ac");
        feed(&mut p, "uuuu");
        assert_eq!(p.buffer.contents(), "abc");
        assert_eq!(p.message(), None);
    }

    // -- Scrolling ------------------------------------------------------------

    #[test]
    fn half_page_scroll() {
        let mut p = run(&numbered(100), "<C-d>");
        assert_eq!(p.view.top_line(), 5);
        assert_eq!(at(&p), (5, 0));
        feed(&mut p, "<C-u>");
        assert_eq!(p.view.top_line(), 0);
        assert_eq!(at(&p), (0, 0));
    }

    #[test]
    fn half_page_stops_at_end() {
        let mut p = run(&numbered(8), "<C-d>");
        assert_eq!(p.view.top_line(), 0);
        assert_eq!(at(&p), (5, 0));
        feed(&mut p, "<C-d>");
        assert_eq!(at(&p), (7, 0));
    }

    #[test]
    fn line_scroll_drags_cursor() {
        let mut p = run(&numbered(100), "3<C-e>");
        assert_eq!(p.view.top_line(), 3);
        assert_eq!(at(&p), (3, 0));
        feed(&mut p, "<C-y>");
        assert_eq!(p.view.top_line(), 2);
        assert_eq!(at(&p), (3, 0));
    }

    // -- Oversized counts -----------------------------------------------------

    #[test]
    fn put_with_huge_count_is_refused() {
        for keys in ["yl99999999999999999999999p", "yy99999999999999999999999P", "yl999999999p", "<C-v>y99999999p"] {
            let p = run("abc\ndef", keys);
            assert_eq!(p.buffer.lines(), vec!["abc", "def"], "{keys}");
            assert_eq!(p.message().map(|m| m.text.as_str()), Some(TEXT_TOO_LONG), "{keys}");
            assert!(!p.is_dirty());
        }
    }

    #[test]
    fn put_with_large_count_still_works() {
        let p = run("ab", "yl1000p");
        assert_eq!(p.buffer.line_len(0), 1002);
        assert_eq!(at(&p), (0, 1000));
    }

    #[test]
    fn repeated_len_limits() {
        assert_eq!(repeated_len(3, 4), Some(12));
        assert_eq!(repeated_len(1, MAX_REPEAT_BYTES), Some(MAX_REPEAT_BYTES));
        assert_eq!(repeated_len(2, MAX_REPEAT_BYTES), None);
        assert_eq!(repeated_len(2, usize::MAX), None);
    }

    #[test]
    fn swap_case_handles_non_letters() {
        assert_eq!(swap_case("aB1-ç"), "Ab1-Ç");
    }
}
