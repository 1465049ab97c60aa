//! Insert and Replace mode.
//!
//! An [`InsertSession`] lives from the key that entered Insert mode to
//! the Escape that leaves it. It remembers what was typed so a count
//! (`3ix<Esc>`) or a Visual block (`I`/`A`) can repeat it on Escape.
//! Replace mode keeps the chars it overwrote so Backspace can put them
//! back.

use vimux_term::input::{KeyCode, KeyEvent};

use crate::edit::{TEXT_TOO_LONG, repeated_len};
use crate::mode::Mode;
use crate::pane::Pane;
use crate::position::{Position, Range};
use crate::word::classify;

/// What to do with the typed text on Escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertKind {
    /// Repeat in place (`i a I A c s`).
    Plain,
    /// Repeat on new lines (`o O`).
    OpenLine,
    /// Copy to every line of a Visual block. `append` pads short lines
    /// instead of skipping them; `eol` appends at each line's end (`$A`).
    Block {
        top: usize,
        bottom: usize,
        col: usize,
        append: bool,
        eol: bool,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct InsertSession {
    kind: InsertKind,
    count: usize,
    /// Where typing started; `Ctrl-U` deletes back to here first.
    start: Position,
    typed: String,
    /// Replace mode: the char each typed char replaced (`None` = appended).
    replaced: Vec<Option<char>>,
}

impl Pane {
    /// Enter Insert mode at the cursor.
    pub(crate) fn start_insert(&mut self, kind: InsertKind, count: usize) {
        self.begin_session(kind, count, Mode::Insert);
    }

    /// `R`
    pub(crate) fn start_replace(&mut self, count: usize) {
        self.begin_session(InsertKind::Plain, count, Mode::Replace);
    }

    fn begin_session(&mut self, kind: InsertKind, count: usize, mode: Mode) {
        self.mode = mode;
        self.clear_message();
        self.dot.mark_change();
        self.insert = Some(InsertSession {
            kind,
            count: count.max(1),
            start: self.cursor.position(),
            typed: String::new(),
            replaced: Vec::new(),
        });
    }

    pub(crate) fn handle_insert(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Escape || key.is_ctrl('c') || key.is_ctrl('[') {
            self.finish_insert();
            return;
        }
        if key.is_ctrl('h') {
            self.insert_backspace();
            return;
        }
        if key.is_ctrl('w') {
            self.insert_delete_word();
            return;
        }
        if key.is_ctrl('u') {
            self.insert_delete_line();
            return;
        }
        match key.code {
            KeyCode::Enter => self.type_char('\n'),
            KeyCode::Tab => self.type_char('\t'),
            KeyCode::Backspace => self.insert_backspace(),
            KeyCode::Delete => self.insert_delete(),
            KeyCode::Left
            | KeyCode::Right
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Home
            | KeyCode::End => self.insert_move(key.code),
            _ => {
                if let Some(ch) = key.typed_char() {
                    self.type_char(ch);
                }
            }
        }
    }

    fn type_char(&mut self, ch: char) {
        let pos = self.cursor.position();
        let overwrite = self.mode == Mode::Replace && ch != '\n' && pos.col < self.buffer.line_len(pos.line);
        let old = if overwrite {
            let old = self.buffer.char_at(pos);
            self.delete_range(Range::ordered(pos, pos.with_col(pos.col + 1)));
            old
        } else {
            None
        };
        self.insert_text(pos, &ch.to_string());
        let next = if ch == '\n' {
            Position::new(pos.line + 1, 0)
        } else {
            pos.with_col(pos.col + 1)
        };
        self.cursor.set_position(next, &self.buffer, true);
        if let Some(session) = &mut self.insert {
            session.typed.push(ch);
            if self.mode == Mode::Replace {
                session.replaced.push(old);
            }
        }
    }

    /// Join with the previous line from column 0.
    fn join_with_previous(&mut self) {
        let pos = self.cursor.position();
        if pos.line == 0 {
            return;
        }
        let prev = pos.line - 1;
        let prev_len = self.buffer.line_len(prev);
        self.delete_range(Range::ordered(Position::new(prev, prev_len), Position::new(pos.line, 0)));
        self.cursor.set_position(Position::new(prev, prev_len), &self.buffer, true);
    }

    fn insert_backspace(&mut self) {
        let pos = self.cursor.position();
        if let Some(session) = &mut self.insert {
            session.typed.pop();
        }
        if self.mode == Mode::Replace {
            let entry = self.insert.as_mut().and_then(|s| s.replaced.pop());
            match entry {
                None => self.cursor.set_position(pos.with_col(pos.col.saturating_sub(1)), &self.buffer, true),
                Some(_) if pos.col == 0 => self.join_with_previous(),
                Some(old) => {
                    let at = pos.with_col(pos.col - 1);
                    self.delete_range(Range::ordered(at, pos));
                    if let Some(ch) = old {
                        self.insert_text(at, &ch.to_string());
                    }
                    self.cursor.set_position(at, &self.buffer, true);
                }
            }
            return;
        }
        if pos.col == 0 {
            self.join_with_previous();
            return;
        }
        let at = pos.with_col(pos.col - 1);
        self.delete_range(Range::ordered(at, pos));
        self.cursor.set_position(at, &self.buffer, true);
    }

    /// `Ctrl-W`: blanks, then one run of same-class chars.
    fn insert_delete_word(&mut self) {
        let pos = self.cursor.position();
        if pos.col == 0 {
            self.insert_backspace();
            return;
        }
        let chars: Vec<char> = self.buffer.line_text(pos.line).chars().take(pos.col).collect();
        let mut start = chars.len();
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        if start > 0 {
            let class = classify(chars[start - 1]);
            while start > 0 && !chars[start - 1].is_whitespace() && classify(chars[start - 1]) == class {
                start -= 1;
            }
        }
        self.delete_to_col(start);
    }

    /// `Ctrl-U`: back to where typing started, then to column 0.
    fn insert_delete_line(&mut self) {
        let pos = self.cursor.position();
        if pos.col == 0 {
            self.insert_backspace();
            return;
        }
        let start = self.insert.as_ref().map_or(pos, |s| s.start);
        let col = if start.line == pos.line && start.col < pos.col { start.col } else { 0 };
        self.delete_to_col(col);
    }

    fn delete_to_col(&mut self, col: usize) {
        let pos = self.cursor.position();
        let removed = pos.col - col;
        let at = pos.with_col(col);
        self.delete_range(Range::ordered(at, pos));
        self.cursor.set_position(at, &self.buffer, true);
        if let Some(session) = &mut self.insert {
            for _ in 0..removed {
                session.typed.pop();
            }
            session.start = session.start.min(at);
        }
    }

    fn insert_delete(&mut self) {
        let pos = self.cursor.position();
        let len = self.buffer.line_len(pos.line);
        if pos.col < len {
            self.delete_range(Range::ordered(pos, pos.with_col(pos.col + 1)));
        } else if pos.line + 1 < self.buffer.line_count() {
            self.delete_range(Range::ordered(pos, Position::new(pos.line + 1, 0)));
        }
    }

    /// Arrow keys: the typed text so far no longer repeats.
    fn insert_move(&mut self, code: KeyCode) {
        let buf = &self.buffer;
        match code {
            KeyCode::Left => self.cursor.move_left(1, buf, true),
            KeyCode::Right => self.cursor.move_right(1, buf, true),
            KeyCode::Up => self.cursor.move_up(1, buf, true),
            KeyCode::Down => self.cursor.move_down(1, buf, true),
            KeyCode::Home => self.cursor.move_to_line_start(),
            _ => self.cursor.move_to_line_end(buf, true),
        }
        let pos = self.cursor.position();
        if let Some(session) = &mut self.insert {
            session.typed.clear();
            session.replaced.clear();
            session.count = 1;
            session.kind = InsertKind::Plain;
            session.start = pos;
        }
    }

    /// Escape: repeat for the count or the block, then step back one
    /// column into Normal mode.
    fn finish_insert(&mut self) {
        let session = self.insert.take();
        let replacing = self.mode == Mode::Replace;
        self.mode = Mode::Normal;
        let Some(session) = session else {
            self.cursor.clamp(&self.buffer, false);
            return;
        };

        if !replacing && !session.typed.is_empty() && session.count > 1 {
            let times = session.count - 1;
            let unit = session.typed.len() + usize::from(session.kind == InsertKind::OpenLine);
            if repeated_len(unit, times).is_some() {
                self.repeat_typed(&session, times);
            } else {
                self.set_error(TEXT_TOO_LONG);
            }
        }
        if let InsertKind::Block { top, bottom, col, append, eol } = session.kind {
            if !session.typed.is_empty() && !session.typed.contains('\n') {
                self.replicate_block(&session.typed, top + 1, bottom, col, append, eol);
            }
            self.cursor.set_position(session.start, &self.buffer, false);
            return;
        }
        let pos = self.cursor.position();
        self.cursor
            .set_position(pos.with_col(pos.col.saturating_sub(1)), &self.buffer, false);
    }

    fn repeat_typed(&mut self, session: &InsertSession, times: usize) {
        let pos = self.cursor.position();
        let (at, text) = if session.kind == InsertKind::OpenLine {
            let len = self.buffer.line_len(pos.line);
            (Position::new(pos.line, len), format!("\n{}", session.typed).repeat(times))
        } else {
            (pos, session.typed.repeat(times))
        };
        self.insert_text(at, &text);
        let end = self.buffer.char_idx(at) + text.chars().count();
        let end = self.buffer.position_of(end);
        self.cursor.set_position(end, &self.buffer, true);
    }

    fn replicate_block(&mut self, typed: &str, from: usize, to: usize, col: usize, append: bool, eol: bool) {
        for line in from..=to.min(self.buffer.line_count() - 1) {
            let len = self.buffer.line_len(line);
            let at = if eol { len } else { col };
            if len < at {
                if !append {
                    continue;
                }
                self.insert_text(Position::new(line, len), &" ".repeat(at - len));
            }
            self.insert_text(Position::new(line, at), typed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::tests::{at, feed, run};
    use pretty_assertions::assert_eq;

    // -- Typing ---------------------------------------------------------------

    #[test]
    fn insert_and_escape_steps_back() {
        let p = run("world", "ihello <Esc>");
        assert_eq!(p.buffer.contents(), "hello world");
        assert_eq!(at(&p), (0, 5));
        assert_eq!(p.mode, Mode::Normal);
    }

    #[test]
    fn append_variants() {
        assert_eq!(run("ab", "aX<Esc>").buffer.contents(), "aXb");
        assert_eq!(run("ab", "AX<Esc>").buffer.contents(), "abX");
        assert_eq!(run("  ab", "$IX<Esc>").buffer.contents(), "  Xab");
        assert_eq!(run("", "aX<Esc>").buffer.contents(), "X");
    }

    #[test]
    fn enter_splits_line() {
        let p = run("ab", "a<CR>x<Esc>");
        assert_eq!(p.buffer.lines(), vec!["a", "xb"]);
        assert_eq!(at(&p), (1, 0));
    }

    #[test]
    fn open_lines() {
        let p = run("a\nb", "onew<Esc>");
        assert_eq!(p.buffer.lines(), vec!["a", "new", "b"]);
        let p = run("a\nb", "jOnew<Esc>");
        assert_eq!(p.buffer.lines(), vec!["a", "new", "b"]);
        assert_eq!(at(&p), (1, 2));
    }

    #[test]
    fn counts_repeat_text() {
        assert_eq!(run("", "3ia<Esc>").buffer.contents(), "aaa");
        let p = run("x", "2ox<Esc>");
        assert_eq!(p.buffer.lines(), vec!["x", "x", "x"]);
        assert_eq!(at(&p), (2, 0));
    }

    #[test]
    fn huge_count_inserts_once() {
        let p = run("abc", "99999999999999999999ix<Esc>");
        assert_eq!(p.buffer.contents(), "xabc");
        assert_eq!(at(&p), (0, 0));
        assert_eq!(p.message().map(|m| m.text.as_str()), Some(TEXT_TOO_LONG));
        let p = run("a", "99999999999999999999ob<Esc>");
        assert_eq!(p.buffer.lines(), vec!["a", "b"]);
    }

    #[test]
    fn insert_is_one_undo_step() {
        let p = run("", "ione<CR>two<Esc>u");
        assert_eq!(p.buffer.contents(), "");
    }

    // -- Deleting -------------------------------------------------------------

    #[test]
    fn backspace_joins_lines() {
        let p = run("ab\ncd", "jI<BS><Esc>");
        assert_eq!(p.buffer.contents(), "abcd");
        assert_eq!(at(&p), (0, 1));
    }

    #[test]
    fn ctrl_w_deletes_word() {
        let p = run("", "ifoo.bar  <C-w>X<Esc>");
        assert_eq!(p.buffer.contents(), "foo.X");
        let p = run("", "ifoo.<C-w><C-w>X<Esc>");
        assert_eq!(p.buffer.contents(), "X");
    }

    #[test]
    fn ctrl_u_deletes_typed_then_line() {
        let p = run("keep ", "Atyped<C-u>X<Esc>");
        assert_eq!(p.buffer.contents(), "keep X");
        let p = run("keep ", "Atyped<C-u><C-u>X<Esc>");
        assert_eq!(p.buffer.contents(), "X");
    }

    #[test]
    fn delete_key_joins_next() {
        let p = run("a\nb", "A<Del><Esc>");
        assert_eq!(p.buffer.contents(), "ab");
    }

    #[test]
    fn arrows_stop_count_repeat() {
        let p = run("", "3ia<Left>b<Esc>");
        assert_eq!(p.buffer.contents(), "ba");
    }

    // -- Replace mode ---------------------------------------------------------

    #[test]
    fn replace_overwrites_and_restores() {
        let p = run("abc", "Rxyzw<Esc>");
        assert_eq!(p.buffer.contents(), "xyzw");
        assert_eq!(at(&p), (0, 3));
        let p = run("abc", "Rxyzw<BS><BS><Esc>");
        assert_eq!(p.buffer.contents(), "xyc");
        assert_eq!(p.mode, Mode::Normal);
    }

    #[test]
    fn replace_enter_breaks_line() {
        let p = run("abc", "Rx<CR>y<Esc>");
        assert_eq!(p.buffer.lines(), vec!["x", "yc"]);
    }

    #[test]
    fn entering_insert_clears_message() {
        let mut p = run("abc", "n");
        assert!(p.message().is_some());
        feed(&mut p, "i");
        assert_eq!(p.message(), None);
    }
}
