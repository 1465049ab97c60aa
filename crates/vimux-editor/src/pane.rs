//! A pane: one buffer with its own cursor, mode, history and viewport.
//!
//! The pane is the unit the multiplexer splits. It owns everything one
//! editor instance would own and consumes keys one at a time through
//! [`Pane::handle_key`]. Key handling is spread over several modules, each
//! adding an `impl Pane` block:
//!
//! | Module              | Handles                                        |
//! |---------------------|------------------------------------------------|
//! | [`crate::normal`]   | counts, pending keys, motions, operators       |
//! | [`crate::insert`]   | Insert and Replace mode                        |
//! | [`crate::visual`]   | charwise, linewise and block selections        |
//! | [`crate::excmd`]    | committed `:` commands and `/` `?` searches     |
//! | [`crate::edit`]     | buffer edits shared by all of the above        |
//!
//! After every key the pane settles: Normal-mode changes are committed to
//! the undo history, the dirty flag is reconciled with the last written
//! state, a finished change is stored for `.` and the viewport follows the
//! cursor.

use tracing::{debug, trace};
use vimux_term::input::KeyEvent;

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::excmd::LastSubstitute;
use crate::history::History;
use crate::insert::InsertSession;
use crate::mode::{Mode, VisualKind};
use crate::motion::Find;
use crate::normal::Pending;
use crate::options::Options;
use crate::position::Position;
use crate::prompt::Prompt;
use crate::register::RegisterFile;
use crate::search::SearchState;
use crate::view::{TextArea, View};

/// A status-line message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub error: bool,
}

/// Something the pane cannot do by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneRequest {
    /// `:q`, `:q!`, `:wq`, `:x`, `ZZ`, `ZQ`: the editor in this pane exits.
    Close,
}

/// An open prompt and where it returns to.
#[derive(Debug, Clone)]
pub(crate) struct PromptState {
    pub(crate) prompt: Prompt,
    /// Mode to go back to on cancel or after a search.
    pub(crate) origin: Mode,
    /// `d/pat`: the operator waiting for the search motion.
    pub(crate) operator: Option<crate::normal::PendingOp>,
    /// Count typed before `/` or `?`.
    pub(crate) count: Option<usize>,
}

/// Corners of the last Visual selection, for `'<,'>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VisualMarks {
    pub(crate) kind: VisualKind,
    pub(crate) start: Position,
    pub(crate) end: Position,
}

// ---------------------------------------------------------------------------
// Dot repeat
// ---------------------------------------------------------------------------

/// A finished change, ready for `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RecordedChange {
    keys: Vec<KeyEvent>,
    count: Option<usize>,
}

/// Records the keys of the command in progress so `.` can replay them.
///
/// Recording starts on the first key typed while the pane is idle and
/// runs until it is idle again, so an Insert or Visual session is part of
/// the command that opened it. Count digits are dropped from the keys and
/// folded into `count`; a replay supplies the count up front. Only
/// recordings that changed the buffer replace the stored change.
#[derive(Debug, Clone, Default)]
pub(crate) struct DotRecorder {
    active: bool,
    replaying: bool,
    changed: bool,
    keys: Vec<KeyEvent>,
    count: Option<usize>,
    last: Option<RecordedChange>,
}

impl DotRecorder {
    fn start(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.changed = false;
        self.keys.clear();
        self.count = None;
    }

    fn push(&mut self, key: KeyEvent) {
        if self.active {
            self.keys.push(key);
        }
    }

    /// Drop the count digit just recorded.
    pub(crate) fn pop_digit(&mut self) {
        if self.active && !self.replaying {
            self.keys.pop();
        }
    }

    /// Fold a count taken by the command into the recorded count.
    pub(crate) fn note_count(&mut self, count: Option<usize>) {
        if !self.active || self.replaying {
            return;
        }
        self.count = match (self.count, count) {
            (Some(a), Some(b)) => Some(a.saturating_mul(b)),
            (a, b) => a.or(b),
        };
    }

    pub(crate) fn mark_change(&mut self) {
        if self.active && !self.replaying {
            self.changed = true;
        }
    }

    /// Forget the current recording (`:` and `/` are not repeatable).
    pub(crate) fn cancel(&mut self) {
        if !self.replaying {
            self.active = false;
            self.keys.clear();
        }
    }

    fn finish(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if self.changed && !self.keys.is_empty() {
            self.last = Some(RecordedChange {
                keys: std::mem::take(&mut self.keys),
                count: self.count,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Pane
// ---------------------------------------------------------------------------

/// One editor instance inside the multiplexer.
#[derive(Debug)]
pub struct Pane {
    pub(crate) buffer: Buffer,
    pub(crate) cursor: Cursor,
    pub(crate) mode: Mode,
    pub(crate) history: History,
    pub(crate) registers: RegisterFile,
    pub(crate) search: SearchState,
    pub(crate) options: Options,
    pub(crate) view: View,
    pub(crate) width: u16,
    pub(crate) height: u16,

    pub(crate) pending: Option<Pending>,
    pub(crate) count: Option<usize>,
    /// Register named with `"x` for the next command.
    pub(crate) register: Option<char>,
    pub(crate) prompt: Option<PromptState>,
    pub(crate) message: Option<Message>,
    pub(crate) last_find: Option<(Find, char)>,
    pub(crate) insert: Option<InsertSession>,
    pub(crate) dot: DotRecorder,
    pub(crate) last_sub: Option<LastSubstitute>,
    pub(crate) last_visual: Option<VisualMarks>,

    /// History state of the last `:w` (0 for the initial text).
    pub(crate) saved_id: u64,
    request: Option<PaneRequest>,
}

impl Pane {
    /// A pane showing `buffer` in a `width x height` cell rectangle (the
    /// last row is the status line).
    #[must_use]
    pub fn new(buffer: Buffer, options: Options, width: u16, height: u16) -> Self {
        Self {
            buffer,
            cursor: Cursor::new(),
            mode: Mode::Normal,
            history: History::new(),
            registers: RegisterFile::new(),
            search: SearchState::new(),
            options,
            view: View::new(),
            width,
            height,
            pending: None,
            count: None,
            register: None,
            prompt: None,
            message: None,
            last_find: None,
            insert: None,
            dot: DotRecorder::default(),
            last_sub: None,
            last_visual: None,
            saved_id: 0,
            request: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub const fn search(&self) -> &SearchState {
        &self.search
    }

    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub const fn view(&self) -> &View {
        &self.view
    }

    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// The open `:`/`/`/`?` prompt, if any.
    #[must_use]
    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref().map(|p| &p.prompt)
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.buffer.is_modified()
    }

    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Text rows and columns after the gutter and status line.
    #[must_use]
    pub fn text_area(&self) -> TextArea {
        TextArea::new(&self.buffer, &self.options, self.width, self.height)
    }

    /// Take a pending request for the session.
    pub const fn take_request(&mut self) -> Option<PaneRequest> {
        self.request.take()
    }

    pub(crate) const fn request(&mut self, request: PaneRequest) {
        self.request = Some(request);
    }

    // -- Messages -----------------------------------------------------------

    pub(crate) fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some(Message { text: text.into(), error: false });
    }

    pub(crate) fn set_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        debug!(target: "pane", error = %text, "status error");
        self.message = Some(Message { text, error: true });
    }

    pub(crate) fn clear_message(&mut self) {
        self.message = None;
    }

    // -- Geometry -----------------------------------------------------------

    /// Give the pane a new size; the viewport follows the cursor again.
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        trace!(target: "pane", width, height, "resize");
        self.width = width;
        self.height = height;
        self.scroll_to_cursor();
    }

    pub(crate) fn scroll_to_cursor(&mut self) {
        let area = self.text_area();
        let scrolloff = self.options.scrolloff;
        self.view
            .scroll_to_cursor(&self.buffer, self.cursor.position(), &area, scrolloff);
    }

    // -- Key handling -------------------------------------------------------

    /// Feed one key.
    pub fn handle_key(&mut self, key: KeyEvent) {
        trace!(target: "pane.key", %key, mode = %self.mode, "key");
        if self.is_idle() {
            self.dot.start();
        }
        self.dot.push(key);
        self.dispatch(key);
        self.settle();
    }

    pub(crate) fn dispatch(&mut self, key: KeyEvent) {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }
        match self.mode {
            Mode::Normal => self.handle_normal(key),
            Mode::Insert | Mode::Replace => self.handle_insert(key),
            Mode::Visual(kind) => self.handle_visual(key, kind),
            // Opening a prompt sets this mode and closing it restores the
            // previous one, so a prompt is always present here. Recover to
            // Normal rather than leave the pane stuck.
            Mode::CommandLine => self.mode = Mode::Normal,
        }
    }

    /// Nothing half-typed: no pending key, count, register or prompt.
    fn is_idle(&self) -> bool {
        self.mode == Mode::Normal
            && self.pending.is_none()
            && self.count.is_none()
            && self.register.is_none()
            && self.prompt.is_none()
    }

    fn settle(&mut self) {
        if !self.mode.cursor_past_end() && self.history.is_open() {
            self.history.commit(self.cursor.position());
        }
        self.sync_modified();
        if self.is_idle() {
            self.dot.finish();
        }
        self.scroll_to_cursor();
    }

    /// The buffer is dirty unless the history sits on the written state.
    pub(crate) fn sync_modified(&mut self) {
        if !self.history.is_open() {
            let dirty = self.history.state_id() != self.saved_id;
            self.buffer.set_modified(dirty);
        }
    }

    /// `.`: replay the last change, with `count` replacing its count.
    pub(crate) fn repeat_change(&mut self, count: Option<usize>) {
        let Some(change) = self.dot.last.clone() else {
            return;
        };
        debug!(target: "pane", keys = change.keys.len(), "repeat change");
        self.dot.replaying = true;
        self.count = count.or(change.count);
        for key in change.keys {
            self.dispatch(key);
        }
        self.dot.replaying = false;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vimux_term::input::decode_str;

    /// A 40x12 pane holding `text`.
    pub(crate) fn pane(text: &str) -> Pane {
        Pane::new(Buffer::from_text(text), Options::default(), 40, 12)
    }

    pub(crate) fn feed(pane: &mut Pane, keys: &str) {
        for key in decode_str(keys) {
            pane.handle_key(key);
        }
    }

    pub(crate) fn run(text: &str, keys: &str) -> Pane {
        let mut p = pane(text);
        feed(&mut p, keys);
        p
    }

    pub(crate) fn at(pane: &Pane) -> (usize, usize) {
        (pane.cursor.line(), pane.cursor.col())
    }

    // -- Dirty state ----------------------------------------------------------

    #[test]
    fn undo_back_to_written_state_is_clean() {
        let mut p = run("abc", "x");
        assert!(p.is_dirty());
        feed(&mut p, "u");
        assert!(!p.is_dirty());
        feed(&mut p, "x:w\r");
        assert!(!p.is_dirty());
        feed(&mut p, "u");
        assert!(p.is_dirty());
    }

    #[test]
    fn command_line_mode_always_has_a_prompt() {
        for keys in [":", ":<Esc>", ":set nu\r", "/abc", "/abc<Esc>", "/b\r", "v:", "v:<Esc>", ":<BS>"] {
            let p = run("abc", keys);
            assert_eq!(p.mode() == Mode::CommandLine, p.prompt().is_some(), "{keys}");
        }
    }

    #[test]
    fn dirty_while_typing() {
        let mut p = run("", "ihi");
        assert!(p.is_dirty());
        feed(&mut p, "<Esc>");
        assert!(p.is_dirty());
        assert_eq!(p.history.undo_count(), 1);
    }

    // -- Dot repeat -----------------------------------------------------------

    #[test]
    fn dot_repeats_x_with_count() {
        let p = run("abcdefgh", "2x.");
        assert_eq!(p.buffer.contents(), "efgh");
    }

    #[test]
    fn dot_count_overrides() {
        let p = run("abcdefgh", "2x3.");
        assert_eq!(p.buffer.contents(), "fgh");
    }

    #[test]
    fn dot_repeats_insert_session() {
        let p = run("x", "ihi <Esc>j0.");
        assert_eq!(p.buffer.contents(), "hi hi x");
    }

    #[test]
    fn dot_repeats_operator_with_counts() {
        let p = run("a b c d e f g h i j", "2d2w.");
        assert_eq!(p.buffer.contents(), "i j");
    }

    #[test]
    fn yank_keeps_last_change() {
        let p = run("one\ntwo\nthree", "ddyy.");
        assert_eq!(p.buffer.lines(), vec!["three"]);
    }

    #[test]
    fn dot_is_one_undo_step() {
        let p = run("one\ntwo\nthree", "dd.u");
        assert_eq!(p.buffer.lines(), vec!["two", "three"]);
    }

    #[test]
    fn command_line_is_not_repeatable() {
        let p = run("abc abc", "x:s/b/X/\r.");
        assert_eq!(p.buffer.contents(), "c abc");
    }

    // -- Requests -------------------------------------------------------------

    #[test]
    fn quit_requests_close() {
        let mut p = run("abc", ":q\r");
        assert_eq!(p.take_request(), Some(PaneRequest::Close));
        assert_eq!(p.take_request(), None);
    }

    #[test]
    fn quit_refused_when_dirty() {
        let mut p = run("abc", "x:q\r");
        assert_eq!(p.take_request(), None);
        assert_eq!(
            p.message().map(|m| m.text.as_str()),
            Some("E37: No write since last change (add ! to override)")
        );
        feed(&mut p, ":q!\r");
        assert_eq!(p.take_request(), Some(PaneRequest::Close));
    }

    #[test]
    fn resize_keeps_cursor_visible() {
        let text: Vec<String> = (1..=50).map(|n| n.to_string()).collect();
        let mut p = run(&text.join("\n"), "30G");
        assert_eq!(at(&p), (29, 0));
        p.resize(40, 5);
        let top = p.view.top_line();
        assert!(top <= 29 && 29 < top + 4, "top {top}");
    }
}
