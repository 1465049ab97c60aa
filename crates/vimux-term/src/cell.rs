// SPDX-License-Identifier: MIT
//
// Cell: one character position of the emulated terminal.
//
// A snapshot compares screens as text, so a cell carries just a character
// and the attribute bits the renderer uses to mark status lines, the
// visual selection and search matches. Wide characters (CJK, some emoji)
// occupy two columns: the first cell holds the character, the second is a
// continuation cell that produces no text of its own.

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Display attributes, named after their SGR counterparts.
    ///
    /// ```
    /// use vimux_term::cell::Attr;
    ///
    /// let status = Attr::INVERSE | Attr::BOLD;
    /// assert!(status.contains(Attr::INVERSE));
    /// assert!(!status.contains(Attr::UNDERLINE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1: increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 4: underline.
        const UNDERLINE = 1 << 1;
        /// SGR 7: swap foreground and background.
        const INVERSE   = 1 << 2;
        /// Search match highlight.
        const SEARCH    = 1 << 3;
        /// Visual-mode selection.
        const SELECTED  = 1 << 4;
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Character to display; `None` marks a wide-character continuation.
    pub ch: Option<char>,
    /// Display attributes.
    pub attrs: Attr,
}

impl Cell {
    /// A blank cell: space, no attributes.
    pub const EMPTY: Self = Self {
        ch: Some(' '),
        attrs: Attr::empty(),
    };

    /// A cell holding `ch` with no attributes.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: Some(ch),
            attrs: Attr::empty(),
        }
    }

    /// A cell holding `ch` with attributes.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, attrs: Attr) -> Self {
        Self { ch: Some(ch), attrs }
    }

    /// The second column of a wide character.
    #[inline]
    #[must_use]
    pub const fn continuation(attrs: Attr) -> Self {
        Self { ch: None, attrs }
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch.is_none()
    }

    /// Same cell with attributes added.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self {
            ch: self.ch,
            attrs: self.attrs.union(attrs),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ch {
            Some(ch) if self.attrs.is_empty() => write!(f, "Cell({ch:?})"),
            Some(ch) => write!(f, "Cell({ch:?}, {:?})", self.attrs),
            None => f.write_str("Cell(cont)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_space() {
        assert_eq!(Cell::EMPTY.ch, Some(' '));
        assert_eq!(Cell::default(), Cell::EMPTY);
    }

    #[test]
    fn continuation_has_no_char() {
        let cell = Cell::continuation(Attr::INVERSE);
        assert!(cell.is_continuation());
        assert!(!Cell::new('a').is_continuation());
    }

    #[test]
    fn with_attrs_accumulates() {
        let cell = Cell::styled('x', Attr::BOLD).with_attrs(Attr::SEARCH);
        assert!(cell.attrs.contains(Attr::BOLD | Attr::SEARCH));
        assert_eq!(cell.ch, Some('x'));
    }

    #[test]
    fn debug_is_compact() {
        assert_eq!(format!("{:?}", Cell::new('a')), "Cell('a')");
        assert_eq!(format!("{:?}", Cell::continuation(Attr::empty())), "Cell(cont)");
    }
}
