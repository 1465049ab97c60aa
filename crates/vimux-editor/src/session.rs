//! Session: the multiplexer around the panes.
//!
//! A [`Session`] owns every pane, the [`Layout`] tree that places them and
//! the terminal size. Keys go to the active pane unless they follow the
//! prefix key (`Ctrl-B` by default), in which case they are looked up in
//! the multiplexer table:
//!
//! | Key after prefix | Action                                        |
//! |------------------|-----------------------------------------------|
//! | `%`              | split side by side                            |
//! | `"`              | split stacked                                 |
//! | `x`              | close the active pane (asks when it is dirty) |
//! | `z`              | zoom toggle                                   |
//! | `o`              | next pane                                     |
//! | `;`              | last active pane                              |
//! | arrows           | pane across that divider                      |
//! | `Ctrl`-arrows    | move the divider 1 cell                       |
//! | `Alt`-arrows     | move the divider 5 cells                      |
//! | prefix           | send the prefix key to the pane               |
//!
//! Anything else after the prefix is dropped. Splitting, selecting,
//! resizing or closing while zoomed un-zooms first.
//!
//! The session is plain data driven by [`Session::handle_key`]: no clock,
//! no I/O, so the same keys always produce the same frames.

use std::collections::BTreeMap;

use tracing::{debug, trace};
use vimux_term::cell::{Attr, Cell};
use vimux_term::grid::{string_width, Grid};
use vimux_term::input::{decode_str, parse_token, KeyCode, KeyEvent, Modifiers};

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::layout::{Direction, Layout, PaneId, Rect, SplitDir};
use crate::options::Options;
use crate::pane::{Pane, PaneRequest};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Everything a session is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub cols: u16,
    pub rows: u16,
    /// Options every new pane starts with.
    pub options: Options,
    /// Name of the initial buffer; new panes are unnamed.
    pub filename: Option<String>,
    pub prefix: KeyEvent,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            options: Options::default(),
            filename: None,
            prefix: KeyEvent::ctrl('b'),
        }
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One rendered screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub grid: Grid,
    /// Terminal cursor as `(col, row)`.
    pub cursor: (u16, u16),
}

/// A line the multiplexer draws over the active pane's status row.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Overlay {
    /// `kill-pane N? (y/n)`
    ConfirmKill(PaneId),
    Notice(String),
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Session {
    cols: u16,
    rows: u16,
    options: Options,
    prefix: KeyEvent,
    panes: BTreeMap<PaneId, Pane>,
    layout: Layout,
    active: PaneId,
    last_active: Option<PaneId>,
    next_id: PaneId,
    zoomed: bool,
    prefix_pending: bool,
    overlay: Option<Overlay>,
    exited: bool,
}

impl Session {
    /// A session with one pane holding `text`.
    ///
    /// # Errors
    ///
    /// [`Error::TerminalSize`] when the terminal is smaller than 2x2.
    pub fn new(config: SessionConfig, text: &str) -> Result<Self> {
        let SessionConfig { cols, rows, options, filename, prefix } = config;
        if cols < 2 || rows < 2 {
            return Err(Error::TerminalSize { cols, rows });
        }
        let mut buffer = Buffer::from_text(text);
        if let Some(name) = filename {
            buffer = buffer.with_name(name);
        }
        debug!(target: "session", cols, rows, lines = buffer.line_count(), "new session");
        let mut panes = BTreeMap::new();
        panes.insert(0, Pane::new(buffer, options, cols, rows));
        Ok(Self {
            cols,
            rows,
            options,
            prefix,
            panes,
            layout: Layout::leaf(0),
            active: 0,
            last_active: None,
            next_id: 1,
            zoomed: false,
            prefix_pending: false,
            overlay: None,
            exited: false,
        })
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    #[must_use]
    pub const fn active_id(&self) -> PaneId {
        self.active
    }

    /// The pane receiving keys.
    ///
    /// # Panics
    ///
    /// Never: the active id always names a live pane.
    #[must_use]
    pub fn active_pane(&self) -> &Pane {
        &self.panes[&self.active]
    }

    /// # Errors
    ///
    /// [`Error::UnknownPane`] when `id` is not open.
    pub fn pane(&self, id: PaneId) -> Result<&Pane> {
        self.panes.get(&id).ok_or(Error::UnknownPane(id))
    }

    /// Open pane ids in layout order.
    #[must_use]
    pub fn pane_ids(&self) -> Vec<PaneId> {
        self.layout.leaves()
    }

    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub const fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    /// True once the last pane has closed.
    #[must_use]
    pub const fn has_exited(&self) -> bool {
        self.exited
    }

    const fn area(&self) -> Rect {
        Rect::new(0, 0, self.cols, self.rows)
    }

    /// Every visible pane with its rectangle.
    #[must_use]
    pub fn pane_rects(&self) -> Vec<(PaneId, Rect)> {
        if self.zoomed {
            vec![(self.active, self.area())]
        } else {
            self.layout.layout(self.area())
        }
    }

    // -- Input --------------------------------------------------------------

    /// Feed a key string: raw bytes and `<Name>` keys mixed.
    pub fn feed_str(&mut self, keys: &str) {
        for key in decode_str(keys) {
            self.handle_key(key);
        }
    }

    /// Feed an array of key tokens (`"Escape"`, `"C-r"`, `"dd"`, ...).
    ///
    /// # Errors
    ///
    /// [`Error::Key`] for a token that names no key. Keys before it have
    /// already been processed.
    pub fn feed_tokens<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<()> {
        for token in tokens {
            for key in parse_token(token.as_ref())? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    /// Feed one key.
    pub fn handle_key(&mut self, key: KeyEvent) {
        trace!(target: "session.key", %key, prefix = self.prefix_pending, "key");
        if self.exited {
            return;
        }
        if let Some(overlay) = self.overlay.take() {
            if let Overlay::ConfirmKill(id) = overlay {
                if key.typed_char() == Some('y') {
                    self.close_pane(id);
                }
                return;
            }
        }
        if self.prefix_pending {
            self.prefix_pending = false;
            self.handle_prefixed(key);
            return;
        }
        if key == self.prefix {
            self.prefix_pending = true;
            return;
        }

        let id = self.active;
        let request = self.panes.get_mut(&id).and_then(|pane| {
            pane.handle_key(key);
            pane.take_request()
        });
        if request == Some(PaneRequest::Close) {
            self.close_pane(id);
        }
    }

    fn handle_prefixed(&mut self, key: KeyEvent) {
        debug!(target: "session.key", %key, "prefix command");
        if key == self.prefix {
            if let Some(pane) = self.panes.get_mut(&self.active) {
                pane.handle_key(key);
            }
            return;
        }
        let dir = match key.code {
            KeyCode::Left => Some(Direction::Left),
            KeyCode::Right => Some(Direction::Right),
            KeyCode::Up => Some(Direction::Up),
            KeyCode::Down => Some(Direction::Down),
            _ => None,
        };
        if let Some(dir) = dir {
            if key.modifiers == Modifiers::CTRL {
                self.resize_pane(dir, 1);
            } else if key.modifiers == Modifiers::ALT {
                self.resize_pane(dir, 5);
            } else if key.modifiers.is_empty() {
                self.select_direction(dir);
            }
            return;
        }
        match key.typed_char() {
            Some('%') => self.split(SplitDir::Vertical),
            Some('"') => self.split(SplitDir::Horizontal),
            Some('x') => self.kill_active(),
            Some('z') => self.toggle_zoom(),
            Some('o') => {
                self.unzoom();
                let next = self.layout.cycle_next(self.active);
                self.select(next);
            }
            Some(';') => {
                if let Some(last) = self.last_active.filter(|id| self.panes.contains_key(id)) {
                    self.unzoom();
                    self.select(last);
                }
            }
            _ => {}
        }
    }

    // -- Multiplexer commands -----------------------------------------------

    /// Split the active pane; the new pane gets an empty buffer and focus.
    pub fn split(&mut self, dir: SplitDir) {
        self.unzoom();
        let Some(rect) = self.layout.rect_of(self.active, self.area()) else {
            return;
        };
        let extent = match dir {
            SplitDir::Vertical => rect.w,
            SplitDir::Horizontal => rect.h,
        };
        if extent < 3 {
            self.overlay = Some(Overlay::Notice("no space for new pane".to_string()));
            return;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.layout.split_pane(self.active, id, dir);
        debug!(target: "session", pane = id, from = self.active, ?dir, "split");
        self.panes.insert(id, Pane::new(Buffer::new(), self.options, rect.w, rect.h));
        self.select(id);
        self.relayout();
    }

    /// `x`: close the active pane, asking first when its buffer is dirty.
    fn kill_active(&mut self) {
        self.unzoom();
        let id = self.active;
        if self.panes.get(&id).is_some_and(Pane::is_dirty) {
            self.overlay = Some(Overlay::ConfirmKill(id));
        } else {
            self.close_pane(id);
        }
    }

    /// Remove a pane. Focus goes back to the previously active pane, else
    /// the one before it in layout order. Closing the last pane ends the
    /// session.
    pub fn close_pane(&mut self, id: PaneId) {
        if !self.panes.contains_key(&id) {
            return;
        }
        self.unzoom();
        let order = self.layout.leaves();
        if order.len() == 1 {
            debug!(target: "session", pane = id, "last pane closed");
            self.exited = true;
            return;
        }
        let index = order.iter().position(|&p| p == id).unwrap_or(0);
        self.layout.remove(id);
        self.panes.remove(&id);
        debug!(target: "session", pane = id, "close pane");

        if self.active == id {
            let fallback = if index > 0 { order[index - 1] } else { order[1] };
            self.active = self
                .last_active
                .filter(|p| self.panes.contains_key(p))
                .unwrap_or(fallback);
            self.last_active = None;
        } else if self.last_active == Some(id) {
            self.last_active = None;
        }
        self.relayout();
    }

    pub fn toggle_zoom(&mut self) {
        if self.layout.pane_count() < 2 {
            return;
        }
        self.zoomed = !self.zoomed;
        debug!(target: "session", zoomed = self.zoomed, pane = self.active, "zoom");
        self.relayout();
    }

    fn unzoom(&mut self) {
        if self.zoomed {
            self.zoomed = false;
            self.relayout();
        }
    }

    fn select(&mut self, id: PaneId) {
        if id != self.active && self.panes.contains_key(&id) {
            trace!(target: "session", from = self.active, to = id, "select pane");
            self.last_active = Some(self.active);
            self.active = id;
        }
    }

    fn select_direction(&mut self, dir: Direction) {
        self.unzoom();
        if let Some(id) = self.layout.neighbor(self.active, dir, self.area()) {
            self.select(id);
        }
    }

    fn resize_pane(&mut self, dir: Direction, amount: u16) {
        self.unzoom();
        let area = self.area();
        if self.layout.resize(self.active, dir, amount, area) {
            self.relayout();
        }
    }

    /// Give every visible pane the size of its rectangle.
    fn relayout(&mut self) {
        for (id, rect) in self.pane_rects() {
            if let Some(pane) = self.panes.get_mut(&id) {
                pane.resize(rect.w, rect.h);
            }
        }
    }

    // -- Rendering ----------------------------------------------------------

    /// Draw every visible pane, the dividers and any overlay.
    #[must_use]
    pub fn render(&self) -> Frame {
        let mut grid = Grid::new(self.cols, self.rows);
        if self.exited {
            grid.put_str(0, 0, "[exited]", Attr::empty(), self.cols);
            return Frame { grid, cursor: (0, 1) };
        }

        let mut cursor = (0, 0);
        let rects = self.pane_rects();
        for &(id, rect) in &rects {
            if let Some(pane) = self.panes.get(&id) {
                let at = pane.render(&mut grid, rect.x, rect.y);
                if id == self.active {
                    cursor = at;
                }
            }
        }
        if !self.zoomed {
            for d in self.layout.dividers(self.area()) {
                for i in 0..d.len {
                    if d.vertical {
                        grid.set(d.x, d.y + i, Cell::new('│'));
                    } else {
                        grid.set(d.x + i, d.y, Cell::new('─'));
                    }
                }
            }
        }

        if let Some(text) = self.overlay_text() {
            if let Some(&(_, rect)) = rects.iter().find(|(id, _)| *id == self.active) {
                let y = rect.y + rect.h - 1;
                grid.fill(rect.x, y, rect.w, Cell::EMPTY);
                let used = grid.put_str(rect.x, y, &text, Attr::INVERSE, rect.w);
                cursor = (rect.x + used.min(rect.w.saturating_sub(1)), y);
            }
        }
        Frame { grid, cursor }
    }

    fn overlay_text(&self) -> Option<String> {
        match self.overlay.as_ref()? {
            Overlay::ConfirmKill(id) => {
                let index = self.layout.leaves().iter().position(|p| p == id).unwrap_or(0);
                Some(format!("kill-pane {index}? (y/n)"))
            }
            Overlay::Notice(text) => Some(text.clone()),
        }
    }

    /// Text of the active pane's last row as drawn (overlay included).
    #[must_use]
    pub fn status_text(&self) -> String {
        if let Some(text) = self.overlay_text() {
            return text;
        }
        let pane = self.active_pane();
        let (text, _) = pane.status_text();
        let width = usize::from(pane.size().0);
        if string_width(&text) > width {
            text.chars().take(width).collect()
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use pretty_assertions::assert_eq;

    fn session(text: &str, keys: &str) -> Session {
        let config = SessionConfig {
            cols: 40,
            rows: 10,
            ..SessionConfig::default()
        };
        let mut s = Session::new(config, text).expect("valid size");
        s.feed_str(keys);
        s
    }

    fn rows(s: &Session) -> Vec<String> {
        s.render().grid.lines().iter().map(|r| r.trim_end().to_string()).collect()
    }

    // -- Construction ---------------------------------------------------------

    #[test]
    fn rejects_tiny_terminal() {
        let config = SessionConfig { cols: 1, rows: 5, ..SessionConfig::default() };
        assert!(matches!(Session::new(config, ""), Err(Error::TerminalSize { cols: 1, rows: 5 })));
    }

    #[test]
    fn keys_reach_active_pane() {
        let s = session("abc", "x");
        assert_eq!(s.active_pane().buffer().contents(), "bc");
    }

    #[test]
    fn token_feed_and_bad_token() {
        let mut s = session("abc", "");
        s.feed_tokens(&["A", "!", "Escape"]).expect("tokens");
        assert_eq!(s.active_pane().buffer().contents(), "abc!");
        assert_eq!(s.active_pane().mode(), Mode::Normal);
        assert!(matches!(s.feed_tokens(&["<Bogus>"]), Err(Error::Key(_))));
    }

    // -- Splits ---------------------------------------------------------------

    #[test]
    fn vertical_split_draws_divider_and_focuses_new_pane() {
        let s = session("left", "<C-b>%");
        assert_eq!(s.pane_ids(), vec![0, 1]);
        assert_eq!(s.active_id(), 1);
        let screen = rows(&s);
        assert!(screen[0].starts_with("left"));
        assert_eq!(screen[0].chars().nth(20), Some('│'));
        assert_eq!(s.render().cursor, (21, 0));
    }

    #[test]
    fn horizontal_split_draws_divider_row() {
        let s = session("top", "<C-b>\"");
        let screen = rows(&s);
        assert_eq!(screen[5], "─".repeat(40));
        assert_eq!(screen[0], "top");
        assert_eq!(s.render().cursor, (0, 6));
        assert_eq!(s.pane(1).map(Pane::size).ok(), Some((40, 4)));
    }

    #[test]
    fn panes_tile_terminal() {
        let s = session("", "<C-b>%<C-b>\"<C-b><Left><C-b>\"");
        let mut cells = 0;
        for (_, r) in s.pane_rects() {
            cells += usize::from(r.w) * usize::from(r.h);
        }
        let dividers: usize = s.layout().dividers(s.area()).iter().map(|d| usize::from(d.len)).sum();
        assert_eq!(cells + dividers, 40 * 10);
        assert_eq!(s.pane_ids().len(), 4);
    }

    #[test]
    fn no_space_notice() {
        let mut s = session("", "");
        for _ in 0..6 {
            s.feed_str("<C-b>%");
        }
        assert_eq!(s.status_text(), "no space for new pane");
        s.feed_str("j");
        assert_ne!(s.status_text(), "no space for new pane");
    }

    // -- Selection ------------------------------------------------------------

    #[test]
    fn select_with_arrows_next_and_last() {
        let mut s = session("", "<C-b>%");
        s.feed_str("<C-b><Left>");
        assert_eq!(s.active_id(), 0);
        s.feed_str("<C-b>o");
        assert_eq!(s.active_id(), 1);
        s.feed_str("<C-b>;");
        assert_eq!(s.active_id(), 0);
    }

    #[test]
    fn unknown_prefixed_key_is_dropped() {
        let s = session("abc", "<C-b>qx");
        assert_eq!(s.active_pane().buffer().contents(), "bc");
    }

    #[test]
    fn double_prefix_sends_prefix() {
        let s = session(&"a\n".repeat(40), "<C-b><C-b>");
        assert_eq!(s.active_pane().cursor().line(), 0);
        assert!(!s.prefix_pending);
    }

    // -- Zoom -----------------------------------------------------------------

    #[test]
    fn zoom_fills_terminal_and_restores() {
        let mut s = session("one", "<C-b>%<C-b>z");
        assert!(s.is_zoomed());
        assert_eq!(s.pane_rects(), vec![(1, Rect::new(0, 0, 40, 10))]);
        assert_eq!(s.active_pane().size(), (40, 10));
        assert!(!rows(&s)[0].contains('│'));
        s.feed_str("<C-b>z");
        assert!(!s.is_zoomed());
        assert_eq!(s.pane_rects().len(), 2);
        assert_eq!(s.active_pane().size(), (19, 10));
    }

    #[test]
    fn split_while_zoomed_unzooms() {
        let s = session("", "<C-b>%<C-b>z<C-b>\"");
        assert!(!s.is_zoomed());
        assert_eq!(s.pane_ids(), vec![0, 1, 2]);
    }

    #[test]
    fn zoom_with_single_pane_is_noop() {
        let s = session("", "<C-b>z");
        assert!(!s.is_zoomed());
    }

    // -- Resize ---------------------------------------------------------------

    #[test]
    fn ctrl_and_alt_arrows_resize() {
        let mut s = session("", "<C-b>%");
        s.feed_str("<C-b><C-Left>");
        assert_eq!(s.pane(0).map(Pane::size).ok(), Some((19, 10)));
        s.feed_str("<C-b><M-Right>");
        assert_eq!(s.pane(0).map(Pane::size).ok(), Some((24, 10)));
        assert_eq!(s.pane(1).map(Pane::size).ok(), Some((15, 10)));
    }

    // -- Closing --------------------------------------------------------------

    #[test]
    fn kill_clean_pane_without_asking() {
        let s = session("", "<C-b>%<C-b>x");
        assert_eq!(s.pane_ids(), vec![0]);
        assert_eq!(s.active_id(), 0);
        assert_eq!(s.active_pane().size(), (40, 10));
    }

    #[test]
    fn kill_dirty_pane_asks_first() {
        let mut s = session("", "<C-b>%ihi<Esc><C-b>x");
        assert_eq!(s.status_text(), "kill-pane 1? (y/n)");
        let frame = s.render();
        assert_eq!(frame.cursor, (39, 9));
        s.feed_str("n");
        assert_eq!(s.pane_ids(), vec![0, 1]);
        s.feed_str("<C-b>xy");
        assert_eq!(s.pane_ids(), vec![0]);
    }

    #[test]
    fn quit_closes_pane_and_last_quit_exits() {
        let mut s = session("", "<C-b>%:q\r");
        assert_eq!(s.pane_ids(), vec![0]);
        s.feed_str(":q\r");
        assert!(s.has_exited());
        assert_eq!(rows(&s)[0], "[exited]");
        s.feed_str("ihello");
        assert!(s.has_exited());
    }

    #[test]
    fn unknown_pane_is_an_error() {
        let s = session("", "");
        assert!(matches!(s.pane(7), Err(Error::UnknownPane(7))));
    }
}
