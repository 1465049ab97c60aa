//! Editing modes.
//!
//! A pane is always in exactly one [`Mode`]:
//!
//! | Mode        | Cursor limit        | Entered by                  |
//! |-------------|---------------------|-----------------------------|
//! | Normal      | `0..len-1`          | start, `Esc`                |
//! | Insert      | `0..len`            | `i a o O I A s S c*`        |
//! | Replace     | `0..len`            | `R`                         |
//! | Visual      | `0..len-1`          | `v V Ctrl-V`                |
//! | CommandLine | on the prompt       | `:` `/` `?`                 |
//!
//! This is pure data. Key handling lives in the pane modules.

use std::fmt;

/// The sub-mode of a Visual selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    /// `v`
    Char,
    /// `V`
    Line,
    /// `Ctrl-V`
    Block,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Replace,
    Visual(VisualKind),
    CommandLine,
}

impl Mode {
    /// Stable lowercase name used in snapshots and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Insert => "insert",
            Self::Replace => "replace",
            Self::Visual(VisualKind::Char) => "visual",
            Self::Visual(VisualKind::Line) => "visual_line",
            Self::Visual(VisualKind::Block) => "visual_block",
            Self::CommandLine => "command_line",
        }
    }

    /// The `showmode` text for the status row. Normal mode shows nothing.
    #[must_use]
    pub const fn indicator(self) -> &'static str {
        match self {
            Self::Normal | Self::CommandLine => "",
            Self::Insert => "-- INSERT --",
            Self::Replace => "-- REPLACE --",
            Self::Visual(VisualKind::Char) => "-- VISUAL --",
            Self::Visual(VisualKind::Line) => "-- VISUAL LINE --",
            Self::Visual(VisualKind::Block) => "-- VISUAL BLOCK --",
        }
    }

    /// True if the cursor may sit one past the last char.
    #[inline]
    #[must_use]
    pub const fn cursor_past_end(self) -> bool {
        matches!(self, Self::Insert | Self::Replace)
    }

    #[inline]
    #[must_use]
    pub const fn is_visual(self) -> bool {
        matches!(self, Self::Visual(_))
    }

    #[inline]
    #[must_use]
    pub const fn visual_kind(self) -> Option<VisualKind> {
        match self {
            Self::Visual(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
        assert_eq!(Mode::Normal.indicator(), "");
    }

    #[test]
    fn indicators_match_showmode() {
        assert_eq!(Mode::Insert.indicator(), "-- INSERT --");
        assert_eq!(Mode::Replace.indicator(), "-- REPLACE --");
        assert_eq!(Mode::Visual(VisualKind::Line).indicator(), "-- VISUAL LINE --");
        assert_eq!(Mode::Visual(VisualKind::Block).indicator(), "-- VISUAL BLOCK --");
    }

    #[test]
    fn past_end_only_while_typing() {
        assert!(Mode::Insert.cursor_past_end());
        assert!(Mode::Replace.cursor_past_end());
        assert!(!Mode::Normal.cursor_past_end());
        assert!(!Mode::Visual(VisualKind::Char).cursor_past_end());
    }

    #[test]
    fn names_and_visual_kind() {
        assert_eq!(Mode::Visual(VisualKind::Block).to_string(), "visual_block");
        assert_eq!(Mode::CommandLine.name(), "command_line");
        assert_eq!(Mode::Visual(VisualKind::Line).visual_kind(), Some(VisualKind::Line));
        assert!(Mode::Normal.visual_kind().is_none());
        assert!(Mode::Visual(VisualKind::Char).is_visual());
    }
}
