//! Key tables: which key means which command in which mode.
//!
//! Each table is a plain `&[(KeyEvent, Command)]`. Lookups are linear;
//! the tables are small and a linear scan keeps them readable. Keys that
//! need a following char (`f`, `r`, `"`, text objects) map to a command
//! that puts the pane into a pending state.

use vimux_term::input::{KeyCode, KeyEvent, Modifiers};

use crate::mode::VisualKind;
use crate::motion::{Find, Motion};
use crate::search::SearchDirection;

/// An operator waiting for a motion or text object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Delete,
    Change,
    Yank,
}

impl Operator {
    /// The key that doubles it into a linewise command (`dd`).
    #[must_use]
    pub const fn key(self) -> char {
        match self {
            Self::Delete => 'd',
            Self::Change => 'c',
            Self::Yank => 'y',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    HalfDown,
    HalfUp,
    LineDown,
    LineUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Motion(Motion),
    /// `f t F T`: wait for the char.
    AwaitFind(Find),
    Operator(Operator),
    Insert,
    Append,
    InsertAtLineStart,
    AppendAtLineEnd,
    OpenBelow,
    OpenAbove,
    DeleteChar,
    DeleteCharBefore,
    SubstituteChar,
    SubstituteLine,
    DeleteToEnd,
    ChangeToEnd,
    YankLine,
    PutAfter,
    PutBefore,
    JoinLines,
    ToggleCase,
    /// `r`: wait for the char.
    AwaitReplace,
    ReplaceMode,
    Undo,
    Redo,
    RepeatChange,
    Visual(VisualKind),
    CommandLine,
    Search(SearchDirection),
    Scroll(Scroll),
    /// `"`: wait for the register name.
    AwaitRegister,
    GPrefix,
    ZPrefix,
    /// `ZZ`
    ExitSave,
    /// `ZQ`
    ForceQuit,
    Escape,
    /// `o` in Visual mode.
    SwapSelectionEnds,
    /// `I` in Visual block mode.
    BlockInsert,
    /// `A` in Visual block mode.
    BlockAppend,
}

const fn ch(c: char) -> KeyEvent {
    KeyEvent::char(c)
}

const fn ctrl(c: char) -> KeyEvent {
    KeyEvent::ctrl(c)
}

const fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::plain(code)
}

const F: Find = Find { forward: true, till: false };
const T: Find = Find { forward: true, till: true };

/// Motions, shared by Normal, Visual and operator-pending.
pub const MOTIONS: &[(KeyEvent, Command)] = &[
    (ch('h'), Command::Motion(Motion::Left)),
    (key(KeyCode::Left), Command::Motion(Motion::Left)),
    (key(KeyCode::Backspace), Command::Motion(Motion::Left)),
    (ctrl('h'), Command::Motion(Motion::Left)),
    (ch('l'), Command::Motion(Motion::Right)),
    (key(KeyCode::Right), Command::Motion(Motion::Right)),
    (ch(' '), Command::Motion(Motion::Right)),
    (ch('k'), Command::Motion(Motion::Up)),
    (key(KeyCode::Up), Command::Motion(Motion::Up)),
    (ctrl('p'), Command::Motion(Motion::Up)),
    (ch('j'), Command::Motion(Motion::Down)),
    (key(KeyCode::Down), Command::Motion(Motion::Down)),
    (ctrl('n'), Command::Motion(Motion::Down)),
    (ch('0'), Command::Motion(Motion::LineStart)),
    (key(KeyCode::Home), Command::Motion(Motion::LineStart)),
    (ch('^'), Command::Motion(Motion::FirstNonBlank)),
    (ch('$'), Command::Motion(Motion::LineEnd)),
    (key(KeyCode::End), Command::Motion(Motion::LineEnd)),
    (ch('+'), Command::Motion(Motion::NextLineStart)),
    (key(KeyCode::Enter), Command::Motion(Motion::NextLineStart)),
    (ch('-'), Command::Motion(Motion::PrevLineStart)),
    (ch('w'), Command::Motion(Motion::WordForward)),
    (ch('b'), Command::Motion(Motion::WordBackward)),
    (ch('e'), Command::Motion(Motion::WordEnd)),
    (ch('W'), Command::Motion(Motion::BigWordForward)),
    (ch('B'), Command::Motion(Motion::BigWordBackward)),
    (ch('E'), Command::Motion(Motion::BigWordEnd)),
    (ch('G'), Command::Motion(Motion::LastLine)),
    (ch('|'), Command::Motion(Motion::Column)),
    (ch('f'), Command::AwaitFind(F)),
    (ch('t'), Command::AwaitFind(T)),
    (ch('F'), Command::AwaitFind(F.reversed())),
    (ch('T'), Command::AwaitFind(T.reversed())),
    (ch(';'), Command::Motion(Motion::RepeatFind)),
    (ch(','), Command::Motion(Motion::RepeatFindReverse)),
    (ch('}'), Command::Motion(Motion::ParagraphForward)),
    (ch('{'), Command::Motion(Motion::ParagraphBackward)),
    (ch('%'), Command::Motion(Motion::MatchBracket)),
    (ch('H'), Command::Motion(Motion::ScreenTop)),
    (ch('M'), Command::Motion(Motion::ScreenMiddle)),
    (ch('L'), Command::Motion(Motion::ScreenBottom)),
    (ch('n'), Command::Motion(Motion::SearchNext)),
    (ch('N'), Command::Motion(Motion::SearchPrev)),
    (ch('*'), Command::Motion(Motion::WordSearchForward)),
    (ch('#'), Command::Motion(Motion::WordSearchBackward)),
    (ch('g'), Command::GPrefix),
];

/// Second key after `g`.
pub const G_PREFIX: &[(KeyEvent, Command)] = &[
    (ch('g'), Command::Motion(Motion::FirstLine)),
    (ch('e'), Command::Motion(Motion::WordEndBackward)),
    (ch('E'), Command::Motion(Motion::BigWordEndBackward)),
    (ch('_'), Command::Motion(Motion::LineEnd)),
];

/// Normal-mode commands other than motions.
pub const NORMAL: &[(KeyEvent, Command)] = &[
    (ch('d'), Command::Operator(Operator::Delete)),
    (ch('c'), Command::Operator(Operator::Change)),
    (ch('y'), Command::Operator(Operator::Yank)),
    (ch('i'), Command::Insert),
    (key(KeyCode::Insert), Command::Insert),
    (ch('a'), Command::Append),
    (ch('I'), Command::InsertAtLineStart),
    (ch('A'), Command::AppendAtLineEnd),
    (ch('o'), Command::OpenBelow),
    (ch('O'), Command::OpenAbove),
    (ch('x'), Command::DeleteChar),
    (key(KeyCode::Delete), Command::DeleteChar),
    (ch('X'), Command::DeleteCharBefore),
    (ch('s'), Command::SubstituteChar),
    (ch('S'), Command::SubstituteLine),
    (ch('D'), Command::DeleteToEnd),
    (ch('C'), Command::ChangeToEnd),
    (ch('Y'), Command::YankLine),
    (ch('p'), Command::PutAfter),
    (ch('P'), Command::PutBefore),
    (ch('J'), Command::JoinLines),
    (ch('~'), Command::ToggleCase),
    (ch('r'), Command::AwaitReplace),
    (ch('R'), Command::ReplaceMode),
    (ch('u'), Command::Undo),
    (ctrl('r'), Command::Redo),
    (ch('.'), Command::RepeatChange),
    (ch('v'), Command::Visual(VisualKind::Char)),
    (ch('V'), Command::Visual(VisualKind::Line)),
    (ctrl('v'), Command::Visual(VisualKind::Block)),
    (ch(':'), Command::CommandLine),
    (ch('/'), Command::Search(SearchDirection::Forward)),
    (ch('?'), Command::Search(SearchDirection::Backward)),
    (ctrl('d'), Command::Scroll(Scroll::HalfDown)),
    (ctrl('u'), Command::Scroll(Scroll::HalfUp)),
    (ctrl('e'), Command::Scroll(Scroll::LineDown)),
    (ctrl('y'), Command::Scroll(Scroll::LineUp)),
    (ch('"'), Command::AwaitRegister),
    (ch('Z'), Command::ZPrefix),
    (key(KeyCode::Escape), Command::Escape),
    (ctrl('c'), Command::Escape),
];

/// Second key after `Z`.
pub const Z_PREFIX: &[(KeyEvent, Command)] = &[
    (ch('Z'), Command::ExitSave),
    (ch('Q'), Command::ForceQuit),
];

/// Visual-mode commands other than motions.
pub const VISUAL: &[(KeyEvent, Command)] = &[
    (ch('d'), Command::Operator(Operator::Delete)),
    (ch('x'), Command::Operator(Operator::Delete)),
    (key(KeyCode::Delete), Command::Operator(Operator::Delete)),
    (ch('y'), Command::Operator(Operator::Yank)),
    (ch('c'), Command::Operator(Operator::Change)),
    (ch('s'), Command::Operator(Operator::Change)),
    (ch('~'), Command::ToggleCase),
    (ch('J'), Command::JoinLines),
    (ch('o'), Command::SwapSelectionEnds),
    (ch('I'), Command::BlockInsert),
    (ch('A'), Command::BlockAppend),
    (ch('v'), Command::Visual(VisualKind::Char)),
    (ch('V'), Command::Visual(VisualKind::Line)),
    (ctrl('v'), Command::Visual(VisualKind::Block)),
    (ch(':'), Command::CommandLine),
    (ch('"'), Command::AwaitRegister),
    (ctrl('d'), Command::Scroll(Scroll::HalfDown)),
    (ctrl('u'), Command::Scroll(Scroll::HalfUp)),
    (ctrl('e'), Command::Scroll(Scroll::LineDown)),
    (ctrl('y'), Command::Scroll(Scroll::LineUp)),
    (key(KeyCode::Escape), Command::Escape),
    (ctrl('c'), Command::Escape),
];

/// Find `key` in `table`. Shift on a char key is folded into the char.
#[must_use]
pub fn lookup(table: &[(KeyEvent, Command)], key: KeyEvent) -> Option<Command> {
    let key = normalize(key);
    table.iter().find(|(k, _)| *k == key).map(|&(_, cmd)| cmd)
}

/// Look `key` up in the mode table, then in [`MOTIONS`].
#[must_use]
pub fn lookup_with_motions(table: &[(KeyEvent, Command)], key: KeyEvent) -> Option<Command> {
    lookup(table, key).or_else(|| lookup(MOTIONS, key))
}

fn normalize(key: KeyEvent) -> KeyEvent {
    match key.code {
        KeyCode::Char(_) if key.modifiers == Modifiers::SHIFT => KeyEvent::plain(key.code),
        _ => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motions_shared_by_modes() {
        assert_eq!(
            lookup_with_motions(NORMAL, ch('w')),
            Some(Command::Motion(Motion::WordForward))
        );
        assert_eq!(
            lookup_with_motions(VISUAL, ch('$')),
            Some(Command::Motion(Motion::LineEnd))
        );
    }

    #[test]
    fn mode_tables_shadow_nothing_unexpected() {
        assert_eq!(lookup(NORMAL, ch('x')), Some(Command::DeleteChar));
        assert_eq!(lookup(VISUAL, ch('x')), Some(Command::Operator(Operator::Delete)));
        assert_eq!(lookup(VISUAL, ch('o')), Some(Command::SwapSelectionEnds));
        assert_eq!(lookup(NORMAL, ctrl('r')), Some(Command::Redo));
        assert_eq!(lookup(NORMAL, ch('q')), None);
    }

    #[test]
    fn prefixes() {
        assert_eq!(lookup(G_PREFIX, ch('g')), Some(Command::Motion(Motion::FirstLine)));
        assert_eq!(lookup(Z_PREFIX, ch('Z')), Some(Command::ExitSave));
        assert_eq!(lookup(Z_PREFIX, ch('x')), None);
    }

    #[test]
    fn no_key_bound_twice_in_a_table() {
        for table in [MOTIONS, G_PREFIX, NORMAL, Z_PREFIX, VISUAL] {
            for (i, (a, _)) in table.iter().enumerate() {
                assert!(
                    table[i + 1..].iter().all(|(b, _)| a != b),
                    "{a} bound twice"
                );
            }
        }
    }

    #[test]
    fn shift_folds_into_char() {
        let shifted = KeyEvent::new(KeyCode::Char('A'), Modifiers::SHIFT);
        assert_eq!(lookup(NORMAL, shifted), Some(Command::AppendAtLineEnd));
    }
}
