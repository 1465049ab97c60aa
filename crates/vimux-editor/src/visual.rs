//! Visual mode: charwise, linewise and block selections.
//!
//! The selection runs from the cursor's anchor (set on entry) to the
//! cursor, both ends included. Motions move only the cursor; operators
//! act on the whole selection and leave Visual mode.

use vimux_term::input::KeyEvent;

use crate::cursor::Cursor;
use crate::insert::InsertKind;
use crate::keymap::{self, Command, Operator, VISUAL};
use crate::mode::{Mode, VisualKind};
use crate::normal::Pending;
use crate::pane::{Pane, VisualMarks};
use crate::position::{BlockRect, Position, Range, Span};
use crate::prompt::PromptKind;
use crate::register::{Register, RegisterKind};
use crate::text_object::TextObject;

/// The selected text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Half-open; includes the line break when the end sits past the
    /// last char of its line.
    Chars(Range),
    /// First and last line.
    Lines(usize, usize),
    /// A rectangle; `to_eol` after `$` extends every line to its end.
    Block { rect: BlockRect, to_eol: bool },
}

impl Pane {
    /// The current selection, if the pane is in Visual mode.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        let kind = self.mode.visual_kind()?;
        let anchor = self.cursor.anchor()?;
        let cursor = self.cursor.position();
        Some(match kind {
            VisualKind::Char => {
                let range = Range::ordered(anchor, cursor);
                Selection::Chars(Range {
                    start: range.start,
                    end: self.after(range.end),
                })
            }
            VisualKind::Line => Selection::Lines(anchor.line.min(cursor.line), anchor.line.max(cursor.line)),
            VisualKind::Block => {
                let mut rect = BlockRect::from_corners(anchor, cursor);
                let to_eol = self.cursor.sticky_col() == Cursor::END;
                if to_eol {
                    let widest = (rect.top..=rect.bottom)
                        .map(|l| self.buffer.line_len(l))
                        .max()
                        .unwrap_or(0);
                    rect.right = rect.right.max(widest.saturating_sub(1));
                }
                Selection::Block { rect, to_eol }
            }
        })
    }

    /// The position just after `pos`, stepping over the line break when
    /// `pos` is at or past the end of its line.
    fn after(&self, pos: Position) -> Position {
        let len = self.buffer.line_len(pos.line);
        if pos.col < len {
            pos.with_col(pos.col + 1)
        } else if pos.line + 1 < self.buffer.line_count() {
            Position::new(pos.line + 1, 0)
        } else {
            pos.with_col(len)
        }
    }

    // -- Entering and leaving -----------------------------------------------

    pub(crate) fn enter_visual(&mut self, kind: VisualKind) {
        self.cursor.set_anchor();
        self.mode = Mode::Visual(kind);
        self.clear_message();
    }

    /// Back to Normal mode, remembering the selection for `'<,'>`.
    pub(crate) fn exit_visual(&mut self) {
        if let (Mode::Visual(kind), Some(anchor)) = (self.mode, self.cursor.anchor()) {
            let range = Range::ordered(anchor, self.cursor.position());
            self.last_visual = Some(VisualMarks {
                kind,
                start: range.start,
                end: range.end,
            });
        }
        self.cursor.clear_anchor();
        self.mode = Mode::Normal;
        self.cursor.clamp(&self.buffer, false);
    }

    // -- Keys ---------------------------------------------------------------

    pub(crate) fn handle_visual(&mut self, key: KeyEvent, kind: VisualKind) {
        if let Some(pending) = self.pending.take() {
            self.handle_pending(pending, key);
            return;
        }
        if self.accept_count_digit(key) {
            return;
        }
        if let Some(ch @ ('i' | 'a')) = key.typed_char() {
            self.count = None;
            self.pending = Some(Pending::Object { op: None, around: ch == 'a' });
            return;
        }
        let Some(command) = keymap::lookup_with_motions(VISUAL, key) else {
            self.cancel_command();
            return;
        };
        match command {
            Command::Motion(motion) => {
                let count = self.take_count();
                self.normal_motion(motion, count);
            }
            Command::AwaitFind(find) => {
                let count = self.take_count();
                self.pending = Some(Pending::Find { find, op: None, count });
            }
            Command::GPrefix => {
                let count = self.take_count();
                self.pending = Some(Pending::G { op: None, count });
            }
            Command::AwaitRegister => self.pending = Some(Pending::Register),
            Command::Operator(op) => {
                self.count = None;
                self.visual_operator(op);
            }
            Command::ToggleCase => {
                self.count = None;
                self.visual_toggle_case();
            }
            Command::JoinLines => {
                self.count = None;
                let anchor = self.cursor.anchor().map_or(self.cursor.line(), |a| a.line);
                let (first, last) = (anchor.min(self.cursor.line()), anchor.max(self.cursor.line()));
                self.exit_visual();
                self.join_lines(first, last - first + 1);
            }
            Command::SwapSelectionEnds => self.cursor.swap_anchor(),
            Command::BlockInsert => self.visual_insert(kind, false),
            Command::BlockAppend => self.visual_insert(kind, true),
            Command::Visual(new_kind) => {
                self.count = None;
                if new_kind == kind {
                    self.exit_visual();
                } else {
                    self.mode = Mode::Visual(new_kind);
                }
            }
            Command::CommandLine => {
                self.count = None;
                self.exit_visual();
                self.dot.cancel();
                self.open_prompt(PromptKind::Command, "'<,'>", None, None);
            }
            Command::Scroll(scroll) => {
                let count = self.count.take();
                self.scroll(scroll, count);
            }
            Command::Escape => {
                self.cancel_command();
                self.exit_visual();
            }
            _ => self.cancel_command(),
        }
    }

    /// `iw`, `a(` and friends in Visual mode: select the object.
    pub(crate) fn select_object(&mut self, object: TextObject) {
        let Some(span) = object.span(&self.buffer, self.cursor.position()) else {
            return;
        };
        if span.linewise {
            self.mode = Mode::Visual(VisualKind::Line);
            self.cursor.set_position(Position::new(span.first_line(), 0), &self.buffer, false);
            self.cursor.set_anchor();
            self.cursor.set_position(Position::new(span.last_line(), 0), &self.buffer, false);
            return;
        }
        if span.range.is_empty() {
            return;
        }
        let end = self.buffer.position_of(self.buffer.char_idx(span.range.end).saturating_sub(1));
        self.cursor.set_position(span.range.start, &self.buffer, false);
        self.cursor.set_anchor();
        self.cursor.set_position(end, &self.buffer, true);
    }

    // -- Operators ----------------------------------------------------------

    fn visual_operator(&mut self, op: Operator) {
        let Some(selection) = self.selection() else {
            return;
        };
        let start = self
            .cursor
            .anchor()
            .map_or(self.cursor.position(), |a| a.min(self.cursor.position()));
        self.exit_visual();
        match selection {
            Selection::Chars(range) => self.apply_operator(op, Span::chars(range)),
            Selection::Lines(first, last) => self.apply_operator(op, Span::lines(first, last)),
            Selection::Block { rect, to_eol } => {
                self.block_operator(op, rect, to_eol);
                return;
            }
        }
        if op == Operator::Yank {
            self.cursor.set_position(start, &self.buffer, false);
        }
    }

    /// Column range of `line` inside a block.
    fn block_cols(&self, line: usize, rect: BlockRect, to_eol: bool) -> (usize, usize) {
        let len = self.buffer.line_len(line);
        let left = rect.left.min(len);
        let right = if to_eol { len } else { (rect.right + 1).min(len) };
        (left, right.max(left))
    }

    fn block_operator(&mut self, op: Operator, rect: BlockRect, to_eol: bool) {
        let register = self.register.take();
        let rows: Vec<String> = (rect.top..=rect.bottom)
            .map(|line| {
                let (left, right) = self.block_cols(line, rect, to_eol);
                self.buffer
                    .slice(Range::ordered(Position::new(line, left), Position::new(line, right)))
            })
            .collect();
        self.registers
            .store(register, Register::new(rows.join("\n"), RegisterKind::Block));
        let corner = Position::new(rect.top, rect.left);

        match op {
            Operator::Yank => {
                let n = rows.len();
                if n > 2 {
                    self.set_message(format!("block of {n} lines yanked"));
                }
                self.cursor.set_position(corner, &self.buffer, false);
            }
            Operator::Delete | Operator::Change => {
                for line in rect.top..=rect.bottom {
                    let (left, right) = self.block_cols(line, rect, to_eol);
                    self.delete_range(Range::ordered(Position::new(line, left), Position::new(line, right)));
                }
                if op == Operator::Delete {
                    self.cursor.set_position(corner, &self.buffer, false);
                } else {
                    self.cursor.set_position(corner, &self.buffer, true);
                    let kind = InsertKind::Block {
                        top: rect.top,
                        bottom: rect.bottom,
                        col: rect.left,
                        append: false,
                        eol: false,
                    };
                    self.start_insert(kind, 1);
                }
            }
        }
    }

    fn visual_toggle_case(&mut self) {
        let Some(selection) = self.selection() else {
            return;
        };
        let start = self
            .cursor
            .anchor()
            .map_or(self.cursor.position(), |a| a.min(self.cursor.position()));
        self.exit_visual();
        let ranges: Vec<Range> = match selection {
            Selection::Chars(range) => vec![range],
            Selection::Lines(first, last) => vec![Range::ordered(
                Position::new(first, 0),
                Position::new(last, self.buffer.line_len(last)),
            )],
            Selection::Block { rect, to_eol } => (rect.top..=rect.bottom)
                .map(|line| {
                    let (left, right) = self.block_cols(line, rect, to_eol);
                    Range::ordered(Position::new(line, left), Position::new(line, right))
                })
                .collect(),
        };
        for range in ranges {
            let flipped = crate::edit::swap_case(&self.buffer.slice(range));
            self.replace_text(range, &flipped);
        }
        self.dot.mark_change();
        let start = match selection {
            Selection::Lines(first, _) => Position::new(first, 0),
            Selection::Block { rect, .. } => Position::new(rect.top, rect.left),
            Selection::Chars(_) => start,
        };
        self.cursor.set_position(start, &self.buffer, false);
    }

    /// `I` / `A`. In block mode the text typed on the first line is
    /// copied to the others on Escape.
    fn visual_insert(&mut self, kind: VisualKind, append: bool) {
        let Some(selection) = self.selection() else {
            return;
        };
        let start = self
            .cursor
            .anchor()
            .map_or(self.cursor.position(), |a| a.min(self.cursor.position()));
        self.count = None;
        self.exit_visual();
        match (kind, selection) {
            (VisualKind::Block, Selection::Block { rect, to_eol }) => {
                let col = if append { rect.right + 1 } else { rect.left };
                let eol = append && to_eol;
                let len = self.buffer.line_len(rect.top);
                let at = if eol { len } else { col };
                if append && len < at {
                    self.insert_text(Position::new(rect.top, len), &" ".repeat(at - len));
                }
                self.cursor.set_position(Position::new(rect.top, at), &self.buffer, true);
                let block = InsertKind::Block {
                    top: rect.top,
                    bottom: rect.bottom,
                    col,
                    append,
                    eol,
                };
                self.start_insert(block, 1);
            }
            (_, Selection::Lines(first, last)) => {
                let pos = if append {
                    Position::new(last, self.buffer.line_len(last))
                } else {
                    Position::new(first, 0)
                };
                self.cursor.set_position(pos, &self.buffer, true);
                self.start_insert(InsertKind::Plain, 1);
            }
            (_, Selection::Chars(range)) => {
                let pos = if append { range.end } else { start };
                self.cursor.set_position(pos, &self.buffer, true);
                self.start_insert(InsertKind::Plain, 1);
            }
            (_, Selection::Block { .. }) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::tests::{at, feed, run};
    use crate::prompt::Prompt;
    use pretty_assertions::assert_eq;

    // -- Selections -----------------------------------------------------------

    #[test]
    fn charwise_selection_includes_both_ends() {
        let p = run("hello world", "lvll");
        assert_eq!(
            p.selection(),
            Some(Selection::Chars(Range::ordered(Position::new(0, 1), Position::new(0, 4))))
        );
        assert_eq!(p.mode, Mode::Visual(VisualKind::Char));
    }

    #[test]
    fn switch_and_leave() {
        let mut p = run("abc", "vV");
        assert_eq!(p.mode, Mode::Visual(VisualKind::Line));
        feed(&mut p, "V");
        assert_eq!(p.mode, Mode::Normal);
        feed(&mut p, "v<Esc>");
        assert_eq!(p.mode, Mode::Normal);
        assert_eq!(p.cursor.anchor(), None);
    }

    // -- Operators ------------------------------------------------------------

    #[test]
    fn delete_charwise_across_lines() {
        let p = run("abc\ndef", "lvjd");
        assert_eq!(p.buffer.contents(), "af");
        assert_eq!(at(&p), (0, 1));
    }

    #[test]
    fn yank_returns_to_start() {
        let p = run("one two", "wvby");
        assert_eq!(p.registers.get(None).content(), "one t");
        assert_eq!(at(&p), (0, 0));
        assert_eq!(p.mode, Mode::Normal);
    }

    #[test]
    fn linewise_delete_and_change() {
        let p = run("a\nb\nc", "Vjd");
        assert_eq!(p.buffer.lines(), vec!["c"]);
        let p = run("a\nb\nc", "jVcX<Esc>");
        assert_eq!(p.buffer.lines(), vec!["a", "X", "c"]);
    }

    #[test]
    fn swap_ends_then_extend() {
        let p = run("abcdef", "llvlohd");
        assert_eq!(p.buffer.contents(), "aef");
    }

    #[test]
    fn toggle_case_and_join() {
        let p = run("abc def", "wve~");
        assert_eq!(p.buffer.contents(), "abc DEF");
        assert_eq!(at(&p), (0, 4));
        let p = run("a\nb\nc\nd", "VjjJ");
        assert_eq!(p.buffer.lines(), vec!["a b c", "d"]);
    }

    #[test]
    fn text_object_selection() {
        let p = run("f(a, b)", "favi(d");
        assert_eq!(p.buffer.contents(), "f()");
    }

    // -- Blocks ---------------------------------------------------------------

    #[test]
    fn block_delete_and_put() {
        let mut p = run("abcd\nefgh\nijkl", "l<C-v>jld");
        assert_eq!(p.buffer.lines(), vec!["ad", "eh", "ijkl"]);
        assert_eq!(p.registers.get(None).kind(), RegisterKind::Block);
        feed(&mut p, "jp");
        assert_eq!(p.buffer.lines(), vec!["ad", "ehbc", "ijfgkl"]);
    }

    #[test]
    fn block_yank_reports() {
        let p = run("ab\ncd\nef", "<C-v>jjly");
        assert_eq!(p.message().map(|m| m.text.as_str()), Some("block of 3 lines yanked"));
        assert_eq!(p.registers.get(None).content(), "ab\ncd\nef");
    }

    #[test]
    fn block_put_pads_short_lines() {
        let p = run("abc\nabc\nx", "l<C-v>jy2jp");
        assert_eq!(p.buffer.lines(), vec!["abc", "abc", "xb", " b"]);
    }

    #[test]
    fn block_insert_skips_short_lines() {
        let p = run("abcd\nx\nabcd", "ll<C-v>jjI-<Esc>");
        assert_eq!(p.buffer.lines(), vec!["ab-cd", "x", "ab-cd"]);
        assert_eq!(at(&p), (0, 2));
    }

    #[test]
    fn block_append_pads() {
        let p = run("ab\nx\nab", "l<C-v>jjA!<Esc>");
        assert_eq!(p.buffer.lines(), vec!["ab!", "x !", "ab!"]);
    }

    #[test]
    fn block_append_at_line_ends() {
        let p = run("abc\nx\nab", "<C-v>jj$A;<Esc>");
        assert_eq!(p.buffer.lines(), vec!["abc;", "x;", "ab;"]);
    }

    #[test]
    fn block_change() {
        let p = run("abcd\nefgh", "l<C-v>jlcX<Esc>");
        assert_eq!(p.buffer.lines(), vec!["aXd", "eXh"]);
    }

    // -- Command line ---------------------------------------------------------

    #[test]
    fn colon_prefills_visual_range() {
        let mut p = run("a\na\na", "jVj:");
        assert_eq!(p.prompt().map(Prompt::display), Some(":'<,'>".to_string()));
        feed(&mut p, "s/a/b/\r");
        assert_eq!(p.buffer.lines(), vec!["a", "b", "b"]);
        assert_eq!(p.mode, Mode::Normal);
    }
}
