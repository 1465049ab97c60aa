//! View: the bridge from a pane's buffer to the terminal grid.
//!
//! A [`View`] holds the scroll state of one pane. A [`TextArea`] describes
//! the rectangle the text is laid out in once the gutter and status row are
//! taken off. Rendering handles:
//!
//! - **Scrolling**: the cursor line stays visible, with `scrolloff` context
//! - **Line numbers**: `number`, `relativenumber` or both, in a gutter whose
//!   width depends on the line count and `numberwidth` only
//! - **Tab expansion**: tabs fill to the next multiple of `tabstop`
//! - **Wide characters**: two cells, moved to the next row with a `>`
//!   filler when they would straddle the wrap point
//! - **Filler rows**: `~` past the end of the buffer, `@` when the last
//!   line does not fit
//! - **Status row**: message or mode, file name, ruler; the `:` `/` `?`
//!   prompt replaces it while open
//!
//! ```text
//! ┌──────┬────────────────────────┐
//! │gutter│      text area         │ ← height - 1 rows
//! │      │                        │
//! ├──────┴────────────────────────┤
//! │ status row            ruler   │ ← 1 row
//! └───────────────────────────────┘
//! ```

use ropey::RopeSlice;
use vimux_term::cell::{Attr, Cell};
use vimux_term::grid::{char_width, string_width, Grid};

use crate::buffer::Buffer;
use crate::options::Options;
use crate::pane::Pane;
use crate::position::Position;
use crate::search::{self, Match};
use crate::visual::Selection;

/// Columns the ruler takes at the right of the status row.
const RULER_WIDTH: usize = 18;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Gutter width for line numbers, separator included.
///
/// `max(digits, numberwidth - 1) + 1` when either number option is on, so
/// the width never changes as `relativenumber` rewrites the cells:
///
/// | Lines   | numberwidth | Gutter |
/// |---------|-------------|--------|
/// | 1–999   | 4           | 4      |
/// | 1000+   | 4           | 5      |
/// | 1–9     | 1           | 2      |
#[must_use]
pub fn gutter_width(line_count: usize, options: &Options) -> usize {
    if !options.gutter_enabled() {
        return 0;
    }
    let digits = line_count.max(1).ilog10() as usize + 1;
    digits.max(options.numberwidth.saturating_sub(1)) + 1
}

/// Cell offset of char column `col` from the start of its line.
#[must_use]
pub fn display_col<I: Iterator<Item = char>>(chars: I, col: usize, tabstop: usize) -> usize {
    let ts = tabstop.max(1);
    chars.take(col).fold(0, |vcol, ch| vcol + cell_width(ch, vcol, ts))
}

/// Cells `ch` takes when it starts at `vcol`.
fn cell_width(ch: char, vcol: usize, ts: usize) -> usize {
    match ch {
        '\t' => ts - vcol % ts,
        c if c.is_control() => 2,
        c => char_width(c),
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn cells(n: usize) -> u16 {
    if n > u16::MAX as usize { u16::MAX } else { n as u16 }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// One drawn cell run: a char, a piece of a tab, or filler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Glyph {
    /// Char column it belongs to; `None` for filler.
    col: Option<usize>,
    ch: char,
    width: usize,
}

impl Glyph {
    const fn filler(ch: char) -> Self {
        Self { col: None, ch, width: 1 }
    }
}

/// Where the text goes inside a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextArea {
    /// Gutter columns, separator included.
    pub gutter: usize,
    /// Text columns right of the gutter.
    pub width: usize,
    /// Text rows above the status row.
    pub rows: usize,
    pub wrap: bool,
    pub tabstop: usize,
}

impl TextArea {
    /// The text area of a `width x height` pane showing `buf`.
    #[must_use]
    pub fn new(buf: &Buffer, options: &Options, width: u16, height: u16) -> Self {
        let width = usize::from(width);
        let gutter = gutter_width(buf.line_count(), options).min(width);
        Self {
            gutter,
            width: width - gutter,
            rows: usize::from(height.saturating_sub(1)).max(1),
            wrap: options.wrap,
            tabstop: options.tabstop.max(1),
        }
    }

    /// Every glyph of a line, unwrapped.
    fn glyphs(&self, line: RopeSlice<'_>) -> Vec<Glyph> {
        let mut out = Vec::with_capacity(line.len_chars());
        let mut vcol = 0;
        for (col, ch) in line.chars().enumerate() {
            let w = cell_width(ch, vcol, self.tabstop);
            let col = Some(col);
            match ch {
                '\t' => out.extend((0..w).map(|_| Glyph { col, ch: ' ', width: 1 })),
                c if c.is_control() => {
                    let shown = char::from_u32(u32::from(c) ^ 0x40).unwrap_or('?');
                    out.push(Glyph { col, ch: '^', width: 1 });
                    out.push(Glyph { col, ch: shown, width: 1 });
                }
                _ if w == 0 => continue,
                c => out.push(Glyph { col, ch: c, width: w }),
            }
            vcol += w;
        }
        out
    }

    /// Screen rows of a line: wrapped at `width`, or one row scrolled by
    /// `left` cells.
    fn layout(&self, line: RopeSlice<'_>, left: usize) -> Vec<Vec<Glyph>> {
        let glyphs = self.glyphs(line);
        if self.wrap {
            wrap_rows(&glyphs, self.width)
        } else {
            vec![clip_row(&glyphs, left, self.width)]
        }
    }

    /// Rows `line` occupies on screen.
    #[must_use]
    pub fn line_rows(&self, buf: &Buffer, line: usize) -> usize {
        if !self.wrap {
            return 1;
        }
        buf.line(line)
            .map_or(1, |l| wrap_rows(&self.glyphs(l), self.width).len())
    }

    /// Cell of char column `col` as (row within the line, offset). Normal
    /// mode sits on the last cell of a tab, Insert on the first.
    fn cursor_cell(&self, line: RopeSlice<'_>, col: usize, left: usize, insert: bool) -> (usize, usize) {
        let glyphs = self.glyphs(line);
        let rows = if self.wrap {
            wrap_rows(&glyphs, self.width)
        } else {
            vec![glyphs]
        };
        let mut found = None;
        for (r, row) in rows.iter().enumerate() {
            let mut off = 0;
            for g in row {
                if g.col == Some(col) {
                    if found.is_none() || !insert {
                        found = Some((r, off));
                    }
                    if insert {
                        break;
                    }
                }
                off += g.width;
            }
            if found.is_some() && insert {
                break;
            }
        }
        let (row, off) = found.unwrap_or_else(|| {
            let last = rows.len() - 1;
            let used: usize = rows[last].iter().map(|g| g.width).sum();
            if self.wrap && used >= self.width && used > 0 {
                (last + 1, 0)
            } else {
                (last, used)
            }
        });
        (row, off.saturating_sub(if self.wrap { 0 } else { left }))
    }
}

fn wrap_rows(glyphs: &[Glyph], width: usize) -> Vec<Vec<Glyph>> {
    let width = width.max(1);
    let mut rows = vec![Vec::new()];
    let mut used = 0;
    for &g in glyphs {
        if used > 0 && used + g.width > width {
            if let Some(row) = rows.last_mut() {
                row.extend((used..width).map(|_| Glyph::filler('>')));
            }
            rows.push(Vec::new());
            used = 0;
        }
        if let Some(row) = rows.last_mut() {
            row.push(g);
        }
        used += g.width;
    }
    rows
}

/// Glyphs visible between cells `left` and `left + width`; wide chars cut
/// by either edge become blanks.
fn clip_row(glyphs: &[Glyph], left: usize, width: usize) -> Vec<Glyph> {
    let mut out = Vec::new();
    let mut start = 0;
    for &g in glyphs {
        let end = start + g.width;
        if end > left && start < left + width {
            if start < left || end > left + width {
                let visible = end.min(left + width) - start.max(left);
                out.extend((0..visible).map(|_| Glyph { col: g.col, ch: ' ', width: 1 }));
            } else {
                out.push(g);
            }
        }
        start = end;
    }
    out
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Scroll state of one pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    /// First visible buffer line.
    top: usize,
    /// Horizontal scroll in cells, used with `nowrap`.
    left: usize,
}

impl View {
    #[must_use]
    pub const fn new() -> Self {
        Self { top: 0, left: 0 }
    }

    #[inline]
    #[must_use]
    pub const fn top_line(&self) -> usize {
        self.top
    }

    #[inline]
    #[must_use]
    pub const fn left_col(&self) -> usize {
        self.left
    }

    pub const fn set_top_line(&mut self, line: usize) {
        self.top = line;
    }

    // -- Extent -------------------------------------------------------------

    /// Lines shown in full from the top line down (at least 1).
    #[must_use]
    pub fn visible_lines(&self, buf: &Buffer, area: &TextArea) -> usize {
        let mut used = 0;
        let mut n = 0;
        for line in self.top..buf.line_count() {
            used += area.line_rows(buf, line);
            if used > area.rows {
                break;
            }
            n += 1;
        }
        n.max(1)
    }

    /// Last line shown in full.
    #[must_use]
    pub fn bottom_line(&self, buf: &Buffer, area: &TextArea) -> usize {
        (self.top + self.visible_lines(buf, area) - 1).min(buf.line_count() - 1)
    }

    /// Top line that puts the last buffer line on the bottom row.
    #[must_use]
    pub fn max_top(&self, buf: &Buffer, area: &TextArea) -> usize {
        top_for_bottom(buf, area, buf.line_count() - 1)
    }

    // -- Scrolling ----------------------------------------------------------

    /// Scroll so `pos` is visible with `scrolloff` lines of context.
    ///
    /// A short move scrolls just enough; a jump of about a screen or more
    /// centers the cursor line, like Vim.
    pub fn scroll_to_cursor(&mut self, buf: &Buffer, pos: Position, area: &TextArea, scrolloff: usize) {
        let last = buf.line_count() - 1;
        let line = pos.line.min(last);
        let so = scrolloff.min(area.rows.saturating_sub(1) / 2);
        self.top = self.top.min(last);

        let want_top = line.saturating_sub(so);
        if want_top < self.top {
            if self.top - want_top >= area.rows / 2 && area.rows > 1 {
                self.top = center_top(buf, area, line);
            } else {
                self.top = want_top;
            }
        } else {
            let want_bottom = (line + so).min(last);
            if !fits(buf, area, self.top, want_bottom) {
                let bottom = self.bottom_line(buf, area);
                self.top = if want_bottom.saturating_sub(bottom) > area.rows {
                    center_top(buf, area, line)
                } else {
                    top_for_bottom(buf, area, want_bottom)
                };
            }
        }

        if area.wrap {
            self.left = 0;
            return;
        }
        let vcol = buf
            .line(line)
            .map_or(0, |l| display_col(l.chars(), pos.col, area.tabstop));
        let width = area.width.max(1);
        if vcol < self.left {
            self.left = vcol;
        } else if vcol >= self.left + width {
            self.left = vcol + 1 - width;
        }
    }
}

/// Lines `from..=to` fit in the text rows.
fn fits(buf: &Buffer, area: &TextArea, from: usize, to: usize) -> bool {
    let mut used = 0;
    for line in from..=to {
        used += area.line_rows(buf, line);
        if used > area.rows {
            return false;
        }
    }
    true
}

/// Smallest top line that still shows `bottom` in full.
fn top_for_bottom(buf: &Buffer, area: &TextArea, bottom: usize) -> usize {
    let mut used = area.line_rows(buf, bottom);
    let mut top = bottom;
    while top > 0 {
        let rows = area.line_rows(buf, top - 1);
        if used + rows > area.rows {
            break;
        }
        used += rows;
        top -= 1;
    }
    top
}

/// Top line that centers `line`, adding context below and above in turn.
/// Missing lines below the end leave their rows to the lines above.
fn center_top(buf: &Buffer, area: &TextArea, line: usize) -> usize {
    let count = buf.line_count();
    let (mut top, mut bottom) = (line, line);
    let mut used = area.line_rows(buf, line);
    let (mut above, mut below) = (0, 0);
    loop {
        let can_below = bottom + 1 < count;
        let can_above = top > 0;
        if can_below && (below <= above || !can_above) {
            let rows = area.line_rows(buf, bottom + 1);
            if used + rows > area.rows {
                break;
            }
            used += rows;
            below += rows;
            bottom += 1;
        } else if can_above {
            let rows = area.line_rows(buf, top - 1);
            if used + rows > area.rows {
                break;
            }
            used += rows;
            above += rows;
            top -= 1;
        } else {
            break;
        }
    }
    top
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// What decorates one buffer line while it is drawn.
struct Marks<'a> {
    matches: &'a [Match],
    selection: Option<&'a Selection>,
}

impl Marks<'_> {
    fn attrs(&self, line: usize, col: usize) -> Attr {
        let mut attrs = Attr::empty();
        let hit = self
            .matches
            .iter()
            .any(|m| m.start.line == line && (m.start.col..m.start.col + m.len).contains(&col));
        if hit {
            attrs |= Attr::SEARCH;
        }
        if self.selected(Position::new(line, col)) {
            attrs |= Attr::SELECTED;
        }
        attrs
    }

    fn selected(&self, pos: Position) -> bool {
        match self.selection {
            Some(Selection::Chars(range)) => range.contains(pos),
            Some(Selection::Lines(first, last)) => (*first..=*last).contains(&pos.line),
            Some(Selection::Block { rect, to_eol }) => {
                (rect.top..=rect.bottom).contains(&pos.line)
                    && pos.col >= rect.left
                    && (*to_eol || pos.col <= rect.right)
            }
            None => false,
        }
    }

    /// The cell after the text is lit when the selection takes the line
    /// break.
    fn eol_selected(&self, line: usize, len: usize) -> bool {
        match self.selection {
            Some(Selection::Chars(range)) => range.contains(Position::new(line, len)),
            Some(Selection::Lines(first, last)) => (*first..=*last).contains(&line),
            _ => false,
        }
    }
}

impl Pane {
    /// Draw the pane with its top-left corner at `(x, y)`.
    ///
    /// Returns the terminal cursor in grid coordinates: on the prompt while
    /// one is open, otherwise on the cursor cell.
    pub fn render(&self, grid: &mut Grid, x: u16, y: u16) -> (u16, u16) {
        if self.width == 0 || self.height == 0 {
            return (x, y);
        }
        for row in 0..self.height {
            grid.fill(x, y + row, self.width, Cell::EMPTY);
        }

        let area = self.text_area();
        let text_rows = usize::from(self.height - 1);
        let top = self.view.top_line();
        let left = self.view.left_col();
        let count = self.buffer.line_count();
        let text_x = x + cells(area.gutter);

        let matches = self.search.highlighted().map_or_else(Vec::new, |pattern| {
            search::find_all(&self.buffer, pattern, top, top + text_rows + 1)
        });
        let selection = self.selection();
        let marks = Marks {
            matches: &matches,
            selection: selection.as_ref(),
        };

        let mut row = 0;
        let mut line = top;
        let mut cursor = (text_x, y);
        while row < text_rows && line < count {
            let Some(text) = self.buffer.line(line) else { break };
            let rows = area.layout(text, left);
            if area.wrap && row > 0 && row + rows.len() > text_rows {
                for r in row..text_rows {
                    grid.set(x, y + cells(r), Cell::new('@'));
                }
                row = text_rows;
                break;
            }
            if line == self.cursor.line() {
                let insert = self.mode.cursor_past_end();
                let (r, off) = area.cursor_cell(text, self.cursor.col(), left, insert);
                cursor = (text_x + cells(off.min(area.width.saturating_sub(1))), y + cells(row + r));
            }
            if area.gutter > 0 {
                let number = self.gutter_text(line, area.gutter);
                grid.put_str(x, y + cells(row), &number, Attr::empty(), cells(area.gutter));
            }
            let len = text.len_chars();
            for (i, glyphs) in rows.iter().enumerate() {
                if row >= text_rows {
                    break;
                }
                let screen_y = y + cells(row);
                let mut off = 0;
                for g in glyphs {
                    let attrs = g.col.map_or(Attr::empty(), |col| marks.attrs(line, col));
                    draw_glyph(grid, text_x + cells(off), screen_y, *g, attrs);
                    off += g.width;
                }
                if i + 1 == rows.len() && off < area.width && marks.eol_selected(line, len) {
                    grid.set(text_x + cells(off), screen_y, Cell::styled(' ', Attr::SELECTED));
                }
                row += 1;
            }
            line += 1;
        }
        for r in row..text_rows {
            grid.set(x, y + cells(r), Cell::new('~'));
        }

        let status_y = y + self.height - 1;
        let (status, attrs) = self.status_text();
        grid.put_str(x, status_y, &status, attrs, self.width);

        if let Some(prompt) = self.prompt() {
            let before: String = prompt.line().input().chars().take(prompt.line().cursor()).collect();
            let col = (1 + string_width(&before)).min(usize::from(self.width) - 1);
            return (x + cells(col), status_y);
        }
        cursor
    }

    /// The number shown in the gutter for `line`.
    fn gutter_text(&self, line: usize, width: usize) -> String {
        let digits = width - 1;
        let current = self.cursor.line();
        let (nu, rnu) = (self.options.number, self.options.relativenumber);
        if rnu && line != current {
            format!("{:>digits$} ", line.abs_diff(current))
        } else if rnu && nu {
            format!("{:<digits$} ", line + 1)
        } else if rnu {
            format!("{:>digits$} ", 0)
        } else {
            format!("{:>digits$} ", line + 1)
        }
    }

    /// The status row: the open prompt, or the message (else the mode and
    /// file name) with the ruler at the right.
    #[must_use]
    pub fn status_text(&self) -> (String, Attr) {
        if let Some(prompt) = self.prompt() {
            return (prompt.display(), Attr::empty());
        }
        let (left, attrs) = match &self.message {
            Some(msg) if msg.error => (msg.text.clone(), Attr::BOLD),
            Some(msg) => (msg.text.clone(), Attr::empty()),
            None => {
                let name = self.buffer.name().unwrap_or("[No Name]");
                let dirty = if self.buffer.is_modified() { " [+]" } else { "" };
                let indicator = self.mode.indicator();
                let sep = if indicator.is_empty() { "" } else { " " };
                (format!("{indicator}{sep}{name}{dirty}"), Attr::empty())
            }
        };

        let width = usize::from(self.width);
        let ruler_col = width.saturating_sub(RULER_WIDTH);
        if width < RULER_WIDTH + 2 || string_width(&left) >= ruler_col {
            return (left, attrs);
        }
        let pad = ruler_col - string_width(&left);
        (format!("{left}{}{}", " ".repeat(pad), self.ruler()), attrs)
    }

    /// `line,col` plus the file position, as `:set ruler` shows it.
    fn ruler(&self) -> String {
        let line = self.cursor.line();
        let col = self.cursor.col();
        let text = self.buffer.line_text(line);
        let empty_buffer = self.buffer.line_count() == 1 && text.is_empty();

        let linecol = if text.is_empty() {
            format!("{},0-1", if empty_buffer { 0 } else { line + 1 })
        } else {
            let bytes: usize = text.chars().take(col).map(char::len_utf8).sum::<usize>() + 1;
            let area = self.text_area();
            let insert = self.mode.cursor_past_end();
            let vcol = self.buffer.line(line).map_or(1, |l| {
                let start = display_col(l.chars(), col, area.tabstop);
                let on_tab = l.get_char(col) == Some('\t');
                if on_tab && !insert {
                    display_col(l.chars(), col + 1, area.tabstop)
                } else {
                    start + 1
                }
            });
            if vcol == bytes {
                format!("{},{bytes}", line + 1)
            } else {
                format!("{},{bytes}-{vcol}", line + 1)
            }
        };
        format!("{linecol:<13} {}", self.file_position())
    }

    /// `All`, `Top`, `Bot` or the percentage of lines above the view.
    fn file_position(&self) -> String {
        let area = self.text_area();
        let above = self.view.top_line();
        let below = self.buffer.line_count() - 1 - self.view.bottom_line(&self.buffer, &area);
        match (above, below) {
            (0, 0) => "All".to_string(),
            (0, _) => "Top".to_string(),
            (_, 0) => "Bot".to_string(),
            _ => format!("{}%", above * 100 / (above + below)),
        }
    }
}

fn draw_glyph(grid: &mut Grid, x: u16, y: u16, glyph: Glyph, attrs: Attr) {
    grid.set(x, y, Cell::styled(glyph.ch, attrs));
    if glyph.width == 2 {
        grid.set(x + 1, y, Cell::continuation(attrs));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::tests::{feed, run};
    use pretty_assertions::assert_eq;

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    /// Render into a grid of the pane's size; rows with trailing blanks cut.
    fn screen(p: &Pane) -> (Vec<String>, (u16, u16)) {
        let (w, h) = p.size();
        let mut grid = Grid::new(w, h);
        let cursor = p.render(&mut grid, 0, 0);
        let rows = grid.lines().iter().map(|r| r.trim_end().to_string()).collect();
        (rows, cursor)
    }

    fn status(p: &Pane) -> String {
        screen(p).0.last().cloned().unwrap_or_default()
    }

    fn small(text: &str, keys: &str, width: u16, height: u16) -> Pane {
        let mut p = run(text, "");
        p.resize(width, height);
        feed(&mut p, keys);
        p
    }

    // -- Gutter ---------------------------------------------------------------

    #[test]
    fn gutter_width_tracks_digits_and_numberwidth() {
        let mut o = Options::default();
        assert_eq!(gutter_width(100, &o), 0);
        o.number = true;
        assert_eq!(gutter_width(5, &o), 4);
        assert_eq!(gutter_width(100, &o), 4);
        assert_eq!(gutter_width(1000, &o), 5);
        o.numberwidth = 1;
        assert_eq!(gutter_width(5, &o), 2);
        o.number = false;
        o.relativenumber = true;
        assert_eq!(gutter_width(12, &o), 3);
    }

    #[test]
    fn number_gutter_is_right_aligned() {
        let p = run(&numbered(100), ":set nu\r");
        let (rows, cursor) = screen(&p);
        assert_eq!(rows[0], "  1 line 1");
        assert_eq!(rows[9], " 10 line 10");
        assert_eq!(cursor, (4, 0));
    }

    #[test]
    fn relative_numbers_around_cursor() {
        let p = run(&numbered(5), ":set rnu\rjj");
        let rows = screen(&p).0;
        assert_eq!(&rows[..5], ["  2 line 1", "  1 line 2", "  0 line 3", "  1 line 4", "  2 line 5"]);
    }

    #[test]
    fn hybrid_numbers_show_absolute_on_cursor_line() {
        let p = run(&numbered(5), ":set nu rnu\rj");
        let rows = screen(&p).0;
        assert_eq!(&rows[..3], ["  1 line 1", "2   line 2", "  1 line 3"]);
    }

    #[test]
    fn gutter_width_stable_when_toggling_relative() {
        let mut p = run(&numbered(100), ":set nu\r");
        let before = screen(&p).0[0].find('l');
        feed(&mut p, ":set rnu\r");
        assert_eq!(screen(&p).0[0].find('l'), before);
    }

    // -- Filler rows ----------------------------------------------------------

    #[test]
    fn tildes_past_end() {
        let p = run("one\ntwo", "");
        let rows = screen(&p).0;
        assert_eq!(&rows[..4], ["one", "two", "~", "~"]);
        assert_eq!(rows[10], "~");
    }

    #[test]
    fn long_line_wraps() {
        let p = small(&"x".repeat(25), "", 10, 5);
        let rows = screen(&p).0;
        assert_eq!(&rows[..4], ["xxxxxxxxxx", "xxxxxxxxxx", "xxxxx", "~"]);
    }

    #[test]
    fn line_that_does_not_fit_shows_at_rows() {
        let text = format!("a\n{}", "y".repeat(40));
        let p = small(&text, "", 10, 5);
        let rows = screen(&p).0;
        assert_eq!(&rows[..4], ["a", "@", "@", "@"]);
    }

    #[test]
    fn wide_char_moves_to_next_row() {
        let p = small("abcdefghi中", "", 10, 4);
        let rows = screen(&p).0;
        assert_eq!(&rows[..2], ["abcdefghi>", "中"]);
    }

    #[test]
    fn nowrap_scrolls_horizontally() {
        let p = small(&format!("{}end", "-".repeat(20)), ":set nowrap\r$", 10, 4);
        let rows = screen(&p).0;
        assert_eq!(rows[0], "-------end");
        assert_eq!(rows[0].len(), 10);
        assert_eq!(screen(&p).1, (9, 0));
    }

    // -- Tabs and cursor ------------------------------------------------------

    #[test]
    fn tab_expands_and_cursor_sits_on_last_cell() {
        let p = run("\tx", "");
        let (rows, cursor) = screen(&p);
        assert_eq!(rows[0], "        x");
        assert_eq!(cursor, (7, 0));
    }

    #[test]
    fn insert_cursor_sits_on_first_cell_of_tab() {
        let p = run("\tx", "i");
        assert_eq!(screen(&p).1, (0, 0));
    }

    #[test]
    fn insert_cursor_past_end() {
        let p = run("abc", "A");
        assert_eq!(screen(&p).1, (3, 0));
    }

    // -- Status row -----------------------------------------------------------

    #[test]
    fn status_shows_name_and_ruler() {
        let p = run("hello\nworld", "jl");
        assert_eq!(status(&p), format!("[No Name]{}{:<13} All", " ".repeat(13), "2,2"));
    }

    #[test]
    fn status_shows_mode_and_dirty_flag() {
        let p = run("hello", "ix");
        assert!(status(&p).starts_with("-- INSERT -- [No Name] [+]"));
    }

    #[test]
    fn ruler_for_empty_buffer_and_tabs() {
        let p = run("", "");
        assert!(status(&p).ends_with(&format!("{:<13} All", "0,0-1")));
        let p = run("\tx", "");
        assert!(status(&p).ends_with(&format!("{:<13} All", "1,1-8")));
    }

    #[test]
    fn ruler_position_percentages() {
        let mut p = run(&numbered(100), "");
        assert!(status(&p).ends_with("Top"));
        feed(&mut p, "G");
        assert!(status(&p).ends_with("Bot"));
        feed(&mut p, "50G");
        let above = p.view.top_line();
        let below = 99 - p.view.bottom_line(&p.buffer, &p.text_area());
        assert!(status(&p).ends_with(&format!("{}%", above * 100 / (above + below))));
    }

    #[test]
    fn error_message_replaces_name() {
        let p = run("abc", ":frob\r");
        assert!(status(&p).starts_with("E492: Not an editor command: frob"));
    }

    #[test]
    fn prompt_overlays_status_row() {
        let p = run("abc", ":");
        let (rows, cursor) = screen(&p);
        assert_eq!(rows[11], ":");
        assert_eq!(cursor, (1, 11));
        let p = run("abc", "/ab");
        let (rows, cursor) = screen(&p);
        assert_eq!(rows[11], "/ab");
        assert_eq!(cursor, (3, 11));
    }

    // -- Highlights -----------------------------------------------------------

    #[test]
    fn search_matches_are_highlighted_until_noh() {
        let mut p = run("foo bar foo", "/foo\r");
        let mut grid = Grid::new(40, 12);
        p.render(&mut grid, 0, 0);
        let lit = |g: &Grid, x| g.get(x, 0).is_some_and(|c| c.attrs.contains(Attr::SEARCH));
        assert!(lit(&grid, 0) && lit(&grid, 8) && !lit(&grid, 4));

        feed(&mut p, ":noh\r");
        let mut grid = Grid::new(40, 12);
        p.render(&mut grid, 0, 0);
        assert!(!lit(&grid, 0));
    }

    #[test]
    fn visual_selection_is_marked() {
        let p = run("abcdef\nghi", "lvl");
        let mut grid = Grid::new(40, 12);
        p.render(&mut grid, 0, 0);
        let sel: Vec<bool> = (0..6)
            .map(|x| grid.get(x, 0).is_some_and(|c| c.attrs.contains(Attr::SELECTED)))
            .collect();
        assert_eq!(sel, [false, true, true, false, false, false]);
    }

    #[test]
    fn block_selection_is_marked() {
        let p = run("abcd\nefgh\nijkl", "l<C-v>jl");
        let mut grid = Grid::new(40, 12);
        p.render(&mut grid, 0, 0);
        let lit = |x, y| grid.get(x, y).is_some_and(|c| c.attrs.contains(Attr::SELECTED));
        assert!(lit(1, 0) && lit(2, 1));
        assert!(!lit(0, 1) && !lit(3, 0) && !lit(1, 2));
    }

    // -- Scrolling ------------------------------------------------------------

    #[test]
    fn short_move_scrolls_one_line() {
        let p = run(&numbered(100), "11j");
        assert_eq!(p.view.top_line(), 1);
        assert_eq!(screen(&p).1, (0, 10));
    }

    #[test]
    fn long_jump_centers() {
        let p = run(&numbered(100), "50G");
        assert_eq!(p.view.top_line(), 44);
        let p = run(&numbered(100), "G");
        assert_eq!(p.view.top_line(), 89);
    }

    #[test]
    fn scrolloff_keeps_context() {
        let p = run(&numbered(100), ":set so=3\r8j");
        assert_eq!(p.view.top_line(), 1);
        let p = run(&numbered(100), ":set so=3\rGk10k");
        assert_eq!(p.view.top_line(), 85);
    }

    #[test]
    fn visible_extent_with_wrapped_lines() {
        let text = format!("{}\nb\nc", "x".repeat(30));
        let p = small(&text, "", 10, 4);
        let area = p.text_area();
        assert_eq!(area.line_rows(&p.buffer, 0), 3);
        assert_eq!(p.view.visible_lines(&p.buffer, &area), 1);
        assert_eq!(p.view.max_top(&p.buffer, &area), 1);
    }
}
