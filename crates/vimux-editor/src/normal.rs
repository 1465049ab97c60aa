//! Normal mode: counts, pending keys, motions and operators.
//!
//! Vim's grammar is `["x] [count] operator [count] motion`. Digits build
//! [`Pane::count`]; keys that need a follow-up (`f`, `r`, `g`, `"`, an
//! operator) park a [`Pending`] state and the next key completes it.
//!
//! An operator resolves its motion to a [`Span`] through [`motion_span`],
//! which also applies Vim's exclusive-motion adjustment: an exclusive
//! motion ending in column 0 of a later line stops at the end of the line
//! before, and becomes linewise when it started inside the indent.
//!
//! Visual mode shares the pending states and motion helpers.

use tracing::debug;
use vimux_term::input::{KeyCode, KeyEvent};

use crate::buffer::Buffer;
use crate::command::Command as ExCommand;
use crate::cursor::{Cursor, first_non_blank};
use crate::insert::InsertKind;
use crate::keymap::{self, Command, G_PREFIX, MOTIONS, NORMAL, Operator, Z_PREFIX};
use crate::motion::{self, Find, Motion, MotionContext, Sticky, Target};
use crate::pane::Pane;
use crate::position::{Position, Range, RangeKind, Span};
use crate::prompt::PromptKind;
use crate::search::{self, Pattern, SearchDirection};
use crate::text_object::{ObjectKind, TextObject};

/// An operator and the count typed before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingOp {
    pub(crate) op: Operator,
    pub(crate) count: Option<usize>,
}

/// A key waiting for the key that completes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pending {
    /// `"`: the register name.
    Register,
    /// `g`, alone or after an operator.
    G {
        op: Option<PendingOp>,
        count: Option<usize>,
    },
    /// `Z`
    Z,
    /// `f t F T`: the target char.
    Find {
        find: Find,
        op: Option<PendingOp>,
        count: Option<usize>,
    },
    /// `r`: the replacement char.
    Replace { count: Option<usize> },
    /// An operator waiting for its motion.
    Operator(PendingOp),
    /// `i`/`a` after an operator or in Visual mode: the object key.
    Object { op: Option<PendingOp>, around: bool },
}

/// The digit a key adds to a count. `0` only extends a count.
fn count_digit(key: KeyEvent, counting: bool) -> Option<usize> {
    match key.typed_char()? {
        d @ '1'..='9' => d.to_digit(10).map(|d| d as usize),
        '0' if counting => Some(0),
        _ => None,
    }
}

/// Combine the counts typed before and after an operator (`2d3w` = 6).
pub(crate) const fn merge_counts(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.saturating_mul(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// The span an operator covers when the cursor at `start` moves to
/// `target`. `None` when the motion covers nothing.
#[must_use]
pub(crate) fn motion_span(buf: &Buffer, start: Position, target: Target) -> Option<Span> {
    let range = Range::ordered(start, target.pos);
    match target.kind {
        RangeKind::Linewise => Some(Span::lines(range.start.line, range.end.line)),
        RangeKind::Inclusive => Some(Span::chars(Range {
            start: range.start,
            end: range.end.with_col(range.end.col + 1),
        })),
        RangeKind::Exclusive => {
            if range.is_empty() {
                return None;
            }
            if range.end.col == 0 && range.end.line > range.start.line {
                let line = range.end.line - 1;
                if range.start.col <= first_non_blank(buf, range.start.line) {
                    return Some(Span::lines(range.start.line, line));
                }
                return Some(Span::chars(Range {
                    start: range.start,
                    end: Position::new(line, buf.line_len(line)),
                }));
            }
            Some(Span::chars(range))
        }
    }
}

impl Pane {
    // -- Counts -------------------------------------------------------------

    fn push_count_digit(&mut self, digit: usize) {
        let current = self.count.unwrap_or(0);
        self.count = Some(current.saturating_mul(10).saturating_add(digit));
        self.dot.pop_digit();
    }

    /// Take the count for the command being run.
    pub(crate) fn take_count(&mut self) -> Option<usize> {
        let count = self.count.take();
        self.dot.note_count(count);
        count
    }

    /// Drop a half-typed command.
    pub(crate) fn cancel_command(&mut self) {
        self.count = None;
        self.register = None;
        self.pending = None;
    }

    /// Consume `key` as a count digit. Returns `true` if it was one.
    pub(crate) fn accept_count_digit(&mut self, key: KeyEvent) -> bool {
        match count_digit(key, self.count.is_some()) {
            Some(digit) => {
                self.push_count_digit(digit);
                true
            }
            None => false,
        }
    }

    // -- Dispatch -----------------------------------------------------------

    pub(crate) fn handle_normal(&mut self, key: KeyEvent) {
        if let Some(pending) = self.pending.take() {
            self.handle_pending(pending, key);
            return;
        }
        if self.accept_count_digit(key) {
            return;
        }
        match keymap::lookup_with_motions(NORMAL, key) {
            Some(command) => self.run_normal(command),
            None => self.cancel_command(),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn run_normal(&mut self, command: Command) {
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
            Command::ZPrefix => {
                self.count = None;
                self.pending = Some(Pending::Z);
            }
            Command::AwaitRegister => self.pending = Some(Pending::Register),
            Command::AwaitReplace => {
                let count = self.take_count();
                self.pending = Some(Pending::Replace { count });
            }
            Command::Operator(op) => {
                let count = self.take_count();
                self.pending = Some(Pending::Operator(PendingOp { op, count }));
            }
            Command::Insert => {
                let n = self.take_count().unwrap_or(1);
                self.start_insert(InsertKind::Plain, n);
            }
            Command::Append => {
                let n = self.take_count().unwrap_or(1);
                let pos = self.cursor.position();
                if self.buffer.line_len(pos.line) > 0 {
                    self.cursor.set_position(pos.with_col(pos.col + 1), &self.buffer, true);
                }
                self.start_insert(InsertKind::Plain, n);
            }
            Command::InsertAtLineStart => {
                let n = self.take_count().unwrap_or(1);
                self.cursor.move_to_first_non_blank(&self.buffer, true);
                self.start_insert(InsertKind::Plain, n);
            }
            Command::AppendAtLineEnd => {
                let n = self.take_count().unwrap_or(1);
                self.cursor.move_to_line_end(&self.buffer, true);
                self.start_insert(InsertKind::Plain, n);
            }
            Command::OpenBelow | Command::OpenAbove => {
                let n = self.take_count().unwrap_or(1);
                let below = command == Command::OpenBelow;
                self.open_line(below);
                self.start_insert(InsertKind::OpenLine, n);
            }
            Command::DeleteChar | Command::SubstituteChar => {
                let n = self.take_count().unwrap_or(1);
                let pos = self.cursor.position();
                let end = (pos.col + n).min(self.buffer.line_len(pos.line));
                let span = Span::chars(Range::ordered(pos, pos.with_col(end)));
                let op = if command == Command::DeleteChar { Operator::Delete } else { Operator::Change };
                self.apply_operator(op, span);
            }
            Command::DeleteCharBefore => {
                let n = self.take_count().unwrap_or(1);
                let pos = self.cursor.position();
                if pos.col > 0 {
                    let span = Span::chars(Range::ordered(pos.with_col(pos.col.saturating_sub(n)), pos));
                    self.apply_operator(Operator::Delete, span);
                }
            }
            Command::SubstituteLine => {
                let n = self.take_count().unwrap_or(1);
                self.operator_lines(Operator::Change, n);
            }
            Command::YankLine => {
                let n = self.take_count().unwrap_or(1);
                self.operator_lines(Operator::Yank, n);
            }
            Command::DeleteToEnd | Command::ChangeToEnd => {
                let count = self.take_count();
                let op = if command == Command::DeleteToEnd { Operator::Delete } else { Operator::Change };
                self.operator_motion(PendingOp { op, count }, Motion::LineEnd, None);
            }
            Command::PutAfter | Command::PutBefore => {
                let n = self.take_count().unwrap_or(1);
                self.put(command == Command::PutAfter, n);
            }
            Command::JoinLines => {
                let n = self.take_count().unwrap_or(2);
                let line = self.cursor.line();
                self.join_lines(line, n);
            }
            Command::ToggleCase => {
                let n = self.take_count().unwrap_or(1);
                self.toggle_case(n);
            }
            Command::ReplaceMode => {
                let n = self.take_count().unwrap_or(1);
                self.start_replace(n);
            }
            Command::Undo => {
                let n = self.count.take().unwrap_or(1);
                self.undo(n);
            }
            Command::Redo => {
                let n = self.count.take().unwrap_or(1);
                self.redo(n);
            }
            Command::RepeatChange => {
                let count = self.count.take();
                self.repeat_change(count);
            }
            Command::Visual(kind) => {
                self.count = None;
                self.enter_visual(kind);
            }
            Command::CommandLine => {
                self.cancel_command();
                self.dot.cancel();
                self.open_prompt(PromptKind::Command, "", None, None);
            }
            Command::Search(direction) => {
                let count = self.count.take();
                self.dot.cancel();
                self.open_prompt(PromptKind::Search(direction), "", None, count);
            }
            Command::Scroll(scroll) => {
                let count = self.count.take();
                self.scroll(scroll, count);
            }
            Command::ExitSave => self.execute(ExCommand::ExitSave),
            Command::ForceQuit => self.execute(ExCommand::ForceQuit),
            Command::Escape
            | Command::SwapSelectionEnds
            | Command::BlockInsert
            | Command::BlockAppend => self.cancel_command(),
        }
    }

    /// Complete a pending key. Shared with Visual mode.
    pub(crate) fn handle_pending(&mut self, pending: Pending, key: KeyEvent) {
        if key.code == KeyCode::Escape || key.is_ctrl('c') {
            self.cancel_command();
            return;
        }
        match pending {
            Pending::Register => match key.typed_char() {
                Some(name) => self.register = Some(name),
                None => self.cancel_command(),
            },
            Pending::G { op, count } => match keymap::lookup(G_PREFIX, key) {
                Some(Command::Motion(motion)) => match op {
                    Some(pending_op) => self.operator_motion(pending_op, motion, count),
                    None => self.normal_motion(motion, count),
                },
                _ => self.cancel_command(),
            },
            Pending::Z => match keymap::lookup(Z_PREFIX, key) {
                Some(Command::ExitSave) => self.execute(ExCommand::ExitSave),
                Some(Command::ForceQuit) => self.execute(ExCommand::ForceQuit),
                _ => self.cancel_command(),
            },
            Pending::Find { find, op, count } => {
                let Some(ch) = key.typed_char() else {
                    self.cancel_command();
                    return;
                };
                self.last_find = Some((find, ch));
                let motion = Motion::FindChar(find, ch);
                match op {
                    Some(pending_op) => self.operator_motion(pending_op, motion, count),
                    None => self.normal_motion(motion, count),
                }
            }
            Pending::Replace { count } => self.replace_chars(key, count.unwrap_or(1)),
            Pending::Operator(pending_op) => self.handle_operator_key(pending_op, key),
            Pending::Object { op, around } => {
                let Some(kind) = key.typed_char().and_then(ObjectKind::from_key) else {
                    self.cancel_command();
                    return;
                };
                let object = TextObject::new(kind, around);
                match op {
                    Some(pending_op) => {
                        match object.span(&self.buffer, self.cursor.position()) {
                            Some(span) => self.apply_operator(pending_op.op, span),
                            None => self.cancel_command(),
                        }
                    }
                    None => self.select_object(object),
                }
            }
        }
    }

    /// The key after `d`, `c` or `y`.
    fn handle_operator_key(&mut self, pending_op: PendingOp, key: KeyEvent) {
        if self.accept_count_digit(key) {
            self.pending = Some(Pending::Operator(pending_op));
            return;
        }
        match key.typed_char() {
            Some(ch) if ch == pending_op.op.key() => {
                let count = merge_counts(pending_op.count, self.take_count());
                self.operator_lines(pending_op.op, count.unwrap_or(1));
                return;
            }
            Some(ch @ ('i' | 'a')) => {
                self.pending = Some(Pending::Object { op: Some(pending_op), around: ch == 'a' });
                return;
            }
            Some(ch @ ('/' | '?')) => {
                let count = merge_counts(pending_op.count, self.take_count());
                let direction = if ch == '/' { SearchDirection::Forward } else { SearchDirection::Backward };
                let op = PendingOp { op: pending_op.op, count: None };
                self.open_prompt(PromptKind::Search(direction), "", Some(op), count);
                return;
            }
            _ => {}
        }
        match keymap::lookup(MOTIONS, key) {
            Some(Command::Motion(motion)) => {
                let count = self.take_count();
                self.operator_motion(pending_op, motion, count);
            }
            Some(Command::AwaitFind(find)) => {
                let count = merge_counts(pending_op.count, self.take_count());
                let op = PendingOp { op: pending_op.op, count: None };
                self.pending = Some(Pending::Find { find, op: Some(op), count });
            }
            Some(Command::GPrefix) => {
                let count = merge_counts(pending_op.count, self.take_count());
                let op = PendingOp { op: pending_op.op, count: None };
                self.pending = Some(Pending::G { op: Some(op), count });
            }
            _ => self.cancel_command(),
        }
    }

    // -- Motions ------------------------------------------------------------

    /// Resolve a motion from the cursor, search motions included.
    pub(crate) fn resolve_motion(
        &mut self,
        motion: Motion,
        count: Option<usize>,
        operator: bool,
        change_word: bool,
    ) -> Option<Target> {
        if motion.is_search() {
            return self.search_motion(motion, count);
        }
        let area = self.text_area();
        let viewport = (self.view.top_line(), self.view.visible_lines(&self.buffer, &area));
        let ctx = MotionContext {
            buf: &self.buffer,
            cursor: &self.cursor,
            count,
            last_find: self.last_find,
            viewport,
            operator,
            change_word,
        };
        motion::resolve(motion, &ctx)
    }

    /// Move the cursor by a motion (Normal and Visual mode).
    pub(crate) fn normal_motion(&mut self, motion: Motion, count: Option<usize>) {
        if let Some(target) = self.resolve_motion(motion, count, false, false) {
            self.jump_to(target);
        }
    }

    pub(crate) fn jump_to(&mut self, target: Target) {
        let sticky = self.cursor.sticky_col();
        let past_end = self.mode.cursor_past_end();
        self.cursor.set_position(target.pos, &self.buffer, past_end);
        match target.sticky {
            Sticky::Keep => self.cursor.set_sticky_col(sticky),
            Sticky::End => self.cursor.set_sticky_col(Cursor::END),
            Sticky::Reset => {}
        }
    }

    /// Apply an operator over a motion. `cw` on a word acts like `ce`.
    pub(crate) fn operator_motion(&mut self, pending_op: PendingOp, motion: Motion, count: Option<usize>) {
        let count = merge_counts(pending_op.count, count);
        let start = self.cursor.position();
        let on_text = self.buffer.char_at(start).is_some_and(|c| !c.is_whitespace());
        let (motion, change_word) = match motion {
            Motion::WordForward if pending_op.op == Operator::Change && on_text => (Motion::WordEnd, true),
            Motion::BigWordForward if pending_op.op == Operator::Change && on_text => {
                (Motion::BigWordEnd, true)
            }
            other => (other, false),
        };
        let Some(target) = self.resolve_motion(motion, count, true, change_word) else {
            self.cancel_command();
            return;
        };
        match motion_span(&self.buffer, start, target) {
            Some(span) => self.apply_operator(pending_op.op, span),
            None => {
                self.register = None;
                if pending_op.op == Operator::Change {
                    self.start_insert(InsertKind::Plain, 1);
                }
            }
        }
    }

    /// `dd`, `cc`, `yy` and friends: `n` lines from the cursor.
    pub(crate) fn operator_lines(&mut self, op: Operator, n: usize) {
        let first = self.cursor.line();
        let last = (first + n.max(1) - 1).min(self.buffer.line_count() - 1);
        self.apply_operator(op, Span::lines(first, last));
    }

    // -- Search motions -----------------------------------------------------

    fn search_motion(&mut self, motion: Motion, count: Option<usize>) -> Option<Target> {
        let cursor = self.cursor.position();
        let (direction, from) = match motion {
            Motion::WordSearchForward | Motion::WordSearchBackward => {
                let Some(pattern) = Pattern::word_at(&self.buffer, cursor) else {
                    self.set_error("E348: No string under cursor");
                    return None;
                };
                let direction = if motion == Motion::WordSearchForward {
                    SearchDirection::Forward
                } else {
                    SearchDirection::Backward
                };
                let from = self.word_match_start(&pattern);
                self.search.set(pattern, direction);
                (direction, from)
            }
            Motion::SearchPrev => (self.search.direction().opposite(), cursor),
            _ => (self.search.direction(), cursor),
        };
        let Some(pattern) = self.search.pattern().cloned() else {
            self.set_error("E35: No previous regular expression");
            return None;
        };
        self.search.resume_highlight();
        self.search_from(&pattern, from, direction, count.unwrap_or(1))
    }

    /// Start of the match under or after the cursor on its line.
    fn word_match_start(&self, pattern: &Pattern) -> Position {
        let pos = self.cursor.position();
        search::find_all(&self.buffer, pattern, pos.line, pos.line + 1)
            .into_iter()
            .find(|m| m.start.col + m.len > pos.col)
            .map_or(pos, |m| m.start)
    }

    /// Search `n` times from `from`, echoing the pattern or the wrap notice.
    pub(crate) fn search_from(
        &mut self,
        pattern: &Pattern,
        from: Position,
        direction: SearchDirection,
        n: usize,
    ) -> Option<Target> {
        let mut at = from;
        let mut wrapped = false;
        for _ in 0..n.max(1) {
            let Some(found) = search::find(&self.buffer, pattern, at, direction) else {
                self.set_error(format!("E486: Pattern not found: {}", pattern.source()));
                return None;
            };
            wrapped |= found.wrapped;
            at = found.at;
        }
        debug!(target: "search", pattern = pattern.source(), line = at.line, col = at.col, wrapped, "match");
        if wrapped {
            self.set_message(match direction {
                SearchDirection::Forward => "search hit BOTTOM, continuing at TOP",
                SearchDirection::Backward => "search hit TOP, continuing at BOTTOM",
            });
        } else {
            self.set_message(format!("{}{}", direction.prompt(), pattern.source()));
        }
        Some(Target::new(at, RangeKind::Exclusive))
    }
}
