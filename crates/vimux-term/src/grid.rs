// SPDX-License-Identifier: MIT
//
// Grid: the 2D cell surface a frame is drawn onto.
//
// Panes, dividers, gutters and status rows all paint here, then the
// snapshot reads the rows back as strings. Storage is a flat row-major
// `Vec<Cell>` so a row is a contiguous slice.
//
// Wide characters take two columns (owner + continuation). Painting over
// either half breaks the pair so no orphaned halves survive.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Attr, Cell};

/// A fixed-size character grid.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Grid {
    /// A blank grid of `width × height` cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// The cell at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.in_bounds(x, y).then(|| &self.cells[self.index(x, y)])
    }

    /// One row as a slice.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        (y < self.height).then(|| {
            let start = self.index(0, y);
            &self.cells[start..start + usize::from(self.width)]
        })
    }

    /// The text of row `y`, full width, continuation cells skipped.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|cells| cells.iter().filter_map(|c| c.ch).collect())
            .unwrap_or_default()
    }

    /// Every row as text, top to bottom.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (0..self.height).map(|y| self.row_text(y)).collect()
    }

    // ─── Painting ────────────────────────────────────────────────────────

    /// Write one cell. Returns `false` when out of bounds.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.break_wide_char_at(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Fill `width` cells of row `y` starting at `x`.
    pub fn fill(&mut self, x: u16, y: u16, width: u16, cell: Cell) {
        let end = x.saturating_add(width).min(self.width);
        for col in x..end {
            self.set(col, y, cell);
        }
    }

    /// Paint `text` at `(x, y)`, clipped to `max_cols` columns.
    ///
    /// A wide character that does not fit in the remaining space is drawn
    /// as a space. Returns the number of columns consumed.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, attrs: Attr, max_cols: u16) -> u16 {
        if y >= self.height {
            return 0;
        }
        let limit = x.saturating_add(max_cols).min(self.width);
        let mut col = x;

        for ch in text.chars() {
            if col >= limit {
                break;
            }
            let w = char_width(ch);
            if w == 0 {
                continue;
            }
            if w == 2 && col + 1 >= limit {
                self.set(col, y, Cell::styled(' ', attrs));
                col += 1;
                break;
            }
            self.set(col, y, Cell::styled(ch, attrs));
            if w == 2 {
                self.set(col + 1, y, Cell::continuation(attrs));
            }
            #[allow(clippy::cast_possible_truncation)]
            let w = w as u16;
            col += w;
        }

        col - x
    }

    /// Add attributes to `width` cells of row `y` without changing text.
    pub fn add_attrs(&mut self, x: u16, y: u16, width: u16, attrs: Attr) {
        let end = x.saturating_add(width).min(self.width);
        if y >= self.height {
            return;
        }
        for col in x..end {
            let idx = self.index(col, y);
            self.cells[idx] = self.cells[idx].with_attrs(attrs);
        }
    }

    /// Break any wide character touching `(x, y)`.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);
        if self.cells[idx].is_continuation() && x > 0 {
            let prev = self.index(x - 1, y);
            self.cells[prev].ch = Some(' ');
        }
        if x + 1 < self.width {
            let next = self.index(x + 1, y);
            if self.cells[next].is_continuation() {
                self.cells[next] = Cell::EMPTY;
            }
        }
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Grid({}x{})", self.width, self.height)?;
        for line in self.lines() {
            writeln!(f, "|{line}|")?;
        }
        Ok(())
    }
}

// ─── Text Width Utilities ───────────────────────────────────────────────────

/// Display width of a character in terminal columns.
///
/// ```
/// use vimux_term::grid::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\n'), 0);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Display width of a string in terminal columns.
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_grid_is_blank() {
        let grid = Grid::new(4, 2);
        assert_eq!(grid.lines(), vec!["    ".to_string(), "    ".to_string()]);
    }

    #[test]
    fn put_str_clips() {
        let mut grid = Grid::new(6, 1);
        assert_eq!(grid.put_str(2, 0, "hello", Attr::empty(), 10), 4);
        assert_eq!(grid.row_text(0), "  hell");
    }

    #[test]
    fn put_str_respects_max_cols() {
        let mut grid = Grid::new(10, 1);
        assert_eq!(grid.put_str(0, 0, "abcdef", Attr::empty(), 3), 3);
        assert_eq!(grid.row_text(0), "abc       ");
    }

    #[test]
    fn wide_char_takes_two_columns() {
        let mut grid = Grid::new(4, 1);
        assert_eq!(grid.put_str(0, 0, "中a", Attr::empty(), 4), 3);
        assert_eq!(grid.row_text(0), "中a ");
        assert!(grid.get(1, 0).is_some_and(|c| c.is_continuation()));
    }

    #[test]
    fn wide_char_at_edge_becomes_space() {
        let mut grid = Grid::new(3, 1);
        grid.put_str(2, 0, "中", Attr::empty(), 5);
        assert_eq!(grid.row_text(0), "   ");
    }

    #[test]
    fn overwrite_breaks_wide_pair() {
        let mut grid = Grid::new(4, 1);
        grid.put_str(0, 0, "中", Attr::empty(), 4);
        grid.set(1, 0, Cell::new('x'));
        assert_eq!(grid.row_text(0), " x  ");
    }

    #[test]
    fn fill_and_attrs() {
        let mut grid = Grid::new(5, 2);
        grid.fill(1, 1, 10, Cell::new('-'));
        assert_eq!(grid.row_text(1), " ----");
        grid.add_attrs(0, 1, 2, Attr::SEARCH);
        assert!(grid.get(1, 1).is_some_and(|c| c.attrs.contains(Attr::SEARCH)));
        assert_eq!(grid.get(1, 1).and_then(|c| c.ch), Some('-'));
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut grid = Grid::new(2, 2);
        assert!(!grid.set(2, 0, Cell::new('x')));
        assert_eq!(grid.put_str(0, 5, "x", Attr::empty(), 1), 0);
        assert!(grid.row(2).is_none());
    }

    #[test]
    fn widths() {
        assert_eq!(string_width("a中b"), 4);
        assert_eq!(char_width('\t'), 0);
    }
}
