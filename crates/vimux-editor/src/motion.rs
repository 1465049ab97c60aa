//! Motions: where a key sends the cursor, and how an operator reads it.
//!
//! [`resolve`] maps a [`Motion`] plus a count to a [`Target`]: the new
//! position, the [`RangeKind`] an operator applies and what happens to
//! the sticky column. Motions never touch the buffer. Search motions
//! (`n N * #`) need the pane's search state and are resolved there.
//!
//! A motion that cannot move at all (`k` on line 0, `f` with no match)
//! resolves to `None`; a pending operator is then cancelled.

use crate::buffer::Buffer;
use crate::cursor::{Cursor, find_on_line_backward, find_on_line_forward, first_non_blank, max_col_for_line};
use crate::position::{Position, RangeKind};
use crate::text_object::matching_bracket;
use crate::word;

/// Direction and landing rule of `f t F T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Find {
    pub forward: bool,
    /// `t`/`T`: stop one char short.
    pub till: bool,
}

impl Find {
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self { forward: !self.forward, till: self.till }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    /// `0`
    LineStart,
    /// `^`
    FirstNonBlank,
    /// `$`
    LineEnd,
    /// `+` and Enter
    NextLineStart,
    /// `-`
    PrevLineStart,
    WordForward,
    WordBackward,
    WordEnd,
    /// `ge`
    WordEndBackward,
    BigWordForward,
    BigWordBackward,
    BigWordEnd,
    /// `gE`
    BigWordEndBackward,
    /// `gg`, or line N with a count.
    FirstLine,
    /// `G`, or line N with a count.
    LastLine,
    /// `{N}|`
    Column,
    FindChar(Find, char),
    /// `;`
    RepeatFind,
    /// `,`
    RepeatFindReverse,
    /// `}`
    ParagraphForward,
    /// `{`
    ParagraphBackward,
    /// `%`, or N percent into the file with a count.
    MatchBracket,
    /// `H`
    ScreenTop,
    /// `M`
    ScreenMiddle,
    /// `L`
    ScreenBottom,
    /// `n`
    SearchNext,
    /// `N`
    SearchPrev,
    /// `*`
    WordSearchForward,
    /// `#`
    WordSearchBackward,
}

impl Motion {
    /// How an operator treats the motion's range.
    #[must_use]
    pub const fn kind(self) -> RangeKind {
        match self {
            Self::Up
            | Self::Down
            | Self::NextLineStart
            | Self::PrevLineStart
            | Self::FirstLine
            | Self::LastLine
            | Self::ScreenTop
            | Self::ScreenMiddle
            | Self::ScreenBottom => RangeKind::Linewise,
            Self::LineEnd
            | Self::WordEnd
            | Self::WordEndBackward
            | Self::BigWordEnd
            | Self::BigWordEndBackward
            | Self::MatchBracket => RangeKind::Inclusive,
            Self::FindChar(find, _) if find.forward => RangeKind::Inclusive,
            _ => RangeKind::Exclusive,
        }
    }

    /// Whether the motion goes through search state.
    #[must_use]
    pub const fn is_search(self) -> bool {
        matches!(
            self,
            Self::SearchNext | Self::SearchPrev | Self::WordSearchForward | Self::WordSearchBackward
        )
    }
}

/// What happens to the remembered column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sticky {
    /// Vertical motions aim for the old sticky column.
    Keep,
    /// Everything else resets it to the new column.
    Reset,
    /// `$` remembers "end of line".
    End,
}

/// A resolved motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub pos: Position,
    pub kind: RangeKind,
    pub sticky: Sticky,
}

impl Target {
    #[must_use]
    pub const fn new(pos: Position, kind: RangeKind) -> Self {
        Self { pos, kind, sticky: Sticky::Reset }
    }
}

/// Everything a motion may look at.
#[derive(Debug, Clone, Copy)]
pub struct MotionContext<'a> {
    pub buf: &'a Buffer,
    pub cursor: &'a Cursor,
    pub count: Option<usize>,
    pub last_find: Option<(Find, char)>,
    /// First visible line and number of text rows, for `H M L`.
    pub viewport: (usize, usize),
    /// An operator is pending (changes where `w` stops).
    pub operator: bool,
    /// `cw`: stay on the end of the current word.
    pub change_word: bool,
}

/// Resolve a non-search motion.
#[must_use]
pub fn resolve(motion: Motion, ctx: &MotionContext<'_>) -> Option<Target> {
    let buf = ctx.buf;
    let pos = ctx.cursor.position();
    let n = ctx.count.unwrap_or(1).max(1);
    let last_line = buf.line_count() - 1;
    let kind = motion.kind();
    let at = |p: Position| Some(Target::new(p, kind));
    let line_target = |line: usize| {
        let line = line.min(last_line);
        at(Position::new(line, first_non_blank(buf, line)))
    };

    match motion {
        Motion::Left => {
            if pos.col == 0 {
                return None;
            }
            let col = pos.col.min(buf.line_len(pos.line));
            at(pos.with_col(col.saturating_sub(n)))
        }
        Motion::Right => at(pos.with_col((pos.col + n).min(buf.line_len(pos.line)))),
        Motion::Up | Motion::Down => {
            let line = if motion == Motion::Up {
                if pos.line == 0 {
                    return None;
                }
                pos.line.saturating_sub(n)
            } else {
                if pos.line == last_line {
                    return None;
                }
                (pos.line + n).min(last_line)
            };
            let col = ctx.cursor.sticky_col().min(max_col_for_line(buf, line, false));
            Some(Target {
                pos: Position::new(line, col),
                kind,
                sticky: Sticky::Keep,
            })
        }
        Motion::LineStart => at(pos.with_col(0)),
        Motion::FirstNonBlank => at(pos.with_col(first_non_blank(buf, pos.line))),
        Motion::LineEnd => {
            let line = (pos.line + n - 1).min(last_line);
            Some(Target {
                pos: Position::new(line, max_col_for_line(buf, line, false)),
                kind,
                sticky: Sticky::End,
            })
        }
        Motion::NextLineStart => {
            if pos.line == last_line {
                return None;
            }
            line_target(pos.line + n)
        }
        Motion::PrevLineStart => {
            if pos.line == 0 {
                return None;
            }
            line_target(pos.line.saturating_sub(n))
        }
        Motion::WordForward => at(word_forward(ctx, n, word::word_forward)),
        Motion::BigWordForward => at(word_forward(ctx, n, word::big_word_forward)),
        Motion::WordBackward => at(repeat(buf, pos, n, word::word_backward)),
        Motion::BigWordBackward => at(repeat(buf, pos, n, word::big_word_backward)),
        Motion::WordEnd => at(word_end(ctx, n, word::word_end_forward, word::classify)),
        Motion::BigWordEnd => at(word_end(ctx, n, word::big_word_end_forward, word::classify_big)),
        Motion::WordEndBackward => at(repeat(buf, pos, n, word::word_end_backward)),
        Motion::BigWordEndBackward => at(repeat(buf, pos, n, word::big_word_end_backward)),
        Motion::FirstLine => line_target(ctx.count.map_or(0, |c| c.saturating_sub(1))),
        Motion::LastLine => line_target(ctx.count.map_or(last_line, |c| c.saturating_sub(1))),
        Motion::Column => at(pos.with_col((n - 1).min(max_col_for_line(buf, pos.line, false)))),
        Motion::FindChar(find, ch) => find_char(buf, pos, find, ch, n, false),
        Motion::RepeatFind => {
            let (find, ch) = ctx.last_find?;
            find_char(buf, pos, find, ch, n, true)
        }
        Motion::RepeatFindReverse => {
            let (find, ch) = ctx.last_find?;
            find_char(buf, pos, find.reversed(), ch, n, true)
        }
        Motion::ParagraphForward => at(paragraph_forward(buf, pos, n)),
        Motion::ParagraphBackward => at(paragraph_backward(buf, pos, n)),
        Motion::MatchBracket => match ctx.count {
            Some(percent) if percent <= 100 => {
                let line = (percent * buf.line_count()).div_ceil(100).saturating_sub(1);
                Some(Target::new(
                    Position::new(line, first_non_blank(buf, line)),
                    RangeKind::Linewise,
                ))
            }
            Some(_) => None,
            None => at(matching_bracket(buf, pos)?),
        },
        Motion::ScreenTop => {
            let (top, rows) = ctx.viewport;
            let bottom = (top + rows.max(1) - 1).min(last_line);
            line_target((top + n - 1).min(bottom))
        }
        Motion::ScreenMiddle => {
            let (top, rows) = ctx.viewport;
            let visible = rows.min(buf.line_count() - top.min(last_line)).max(1);
            line_target(top + (visible - 1) / 2)
        }
        Motion::ScreenBottom => {
            let (top, rows) = ctx.viewport;
            let bottom = (top + rows.max(1) - 1).min(last_line);
            line_target(bottom.saturating_sub(n - 1).max(top))
        }
        Motion::SearchNext | Motion::SearchPrev | Motion::WordSearchForward | Motion::WordSearchBackward => None,
    }
}

fn repeat(buf: &Buffer, mut pos: Position, n: usize, step: fn(&Buffer, Position) -> Position) -> Position {
    for _ in 0..n {
        pos = step(buf, pos);
    }
    pos
}

/// `w`/`W`. Under an operator the last step does not leave a non-empty
/// line: `dw` on the last word stops at the end of that line.
fn word_forward(ctx: &MotionContext<'_>, n: usize, step: fn(&Buffer, Position) -> Position) -> Position {
    let buf = ctx.buf;
    let mut pos = ctx.cursor.position();
    for i in 0..n {
        let next = step(buf, pos);
        if ctx.operator && i + 1 == n && next.line > pos.line && buf.line_len(pos.line) > 0 {
            return Position::new(pos.line, buf.line_len(pos.line));
        }
        pos = next;
    }
    pos
}

/// `e`/`E`. For `cw` the first step may stay put when the cursor already
/// sits on the last char of a word.
fn word_end(
    ctx: &MotionContext<'_>,
    n: usize,
    step: fn(&Buffer, Position) -> Position,
    class: fn(char) -> word::CharClass,
) -> Position {
    let buf = ctx.buf;
    let mut pos = ctx.cursor.position();
    let mut remaining = n;
    if ctx.change_word {
        let here = buf.char_at(pos).map(class);
        let next = buf.char_at(pos.with_col(pos.col + 1)).map(class);
        if here.is_some_and(|c| c.is_text()) && here != next {
            remaining -= 1;
        }
    }
    for _ in 0..remaining {
        pos = step(buf, pos);
    }
    pos
}

/// `f t F T ; ,`. A repeated `t` skips an adjacent match so it can advance.
fn find_char(buf: &Buffer, pos: Position, find: Find, ch: char, n: usize, repeat: bool) -> Option<Target> {
    let skip = usize::from(repeat && find.till);
    let kind = if find.forward { RangeKind::Inclusive } else { RangeKind::Exclusive };
    let col = if find.forward {
        let col = find_on_line_forward(buf, pos.line, pos.col + skip, ch, n)?;
        if find.till { col - 1 } else { col }
    } else {
        let col = find_on_line_backward(buf, pos.line, pos.col.saturating_sub(skip), ch, n)?;
        if find.till { col + 1 } else { col }
    };
    Some(Target::new(pos.with_col(col), kind))
}

fn is_blank_line(buf: &Buffer, line: usize) -> bool {
    buf.line_len(line) == 0
}

/// `}`: the next empty line after a run of text, or the end of the buffer.
fn paragraph_forward(buf: &Buffer, pos: Position, n: usize) -> Position {
    let last = buf.line_count() - 1;
    let mut line = pos.line;
    for _ in 0..n {
        while line < last && is_blank_line(buf, line) {
            line += 1;
        }
        while line < last && !is_blank_line(buf, line) {
            line += 1;
        }
    }
    if line == last && !is_blank_line(buf, line) {
        Position::new(line, buf.line_len(line))
    } else {
        Position::new(line, 0)
    }
}

/// `{`: the previous empty line before a run of text, or the start.
fn paragraph_backward(buf: &Buffer, pos: Position, n: usize) -> Position {
    let mut line = pos.line;
    for _ in 0..n {
        while line > 0 && is_blank_line(buf, line) {
            line -= 1;
        }
        while line > 0 && !is_blank_line(buf, line) {
            line -= 1;
        }
    }
    Position::new(line, 0)
}
