//! The one-line prompt shared by `:` commands and `/`/`?` searches.
//!
//! While a prompt is open the pane is in [`Mode::CommandLine`] and every key
//! goes to [`Prompt::handle_key`]. The prompt overlays the pane's status row
//! as the prompt char followed by the input, and the terminal cursor sits
//! on the input cursor.
//!
//! [`Mode::CommandLine`]: crate::mode::Mode::CommandLine

use vimux_term::input::{KeyCode, KeyEvent};

use crate::search::SearchDirection;

/// What the prompt collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Command,
    Search(SearchDirection),
}

impl PromptKind {
    #[must_use]
    pub const fn prompt_char(self) -> char {
        match self {
            Self::Command => ':',
            Self::Search(dir) => dir.prompt(),
        }
    }
}

/// Outcome of one key in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    /// Still editing.
    Pending,
    /// Enter: the collected text.
    Submit(String),
    /// Escape, or Backspace on an empty line.
    Cancel,
}

// ---------------------------------------------------------------------------
// InputLine
// ---------------------------------------------------------------------------

/// Editable text with a char-offset cursor.
#[derive(Debug, Clone, Default)]
pub struct InputLine {
    input: String,
    cursor: usize,
}

impl InputLine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: String::new(),
            cursor: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Cursor position within the input (char offset).
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert_char(&mut self, ch: char) {
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.insert(byte_idx, ch);
        self.cursor += 1;
    }

    /// Delete the char before the cursor. Returns `true` if one was deleted.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.remove(byte_idx);
        true
    }

    /// Delete the char at the cursor. Returns `true` if one was deleted.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.input.chars().count() {
            return false;
        }
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.remove(byte_idx);
        true
    }

    /// Delete the word before the cursor (`Ctrl-W`).
    pub fn delete_word(&mut self) {
        let chars: Vec<char> = self.input.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1] == ' ' {
            start -= 1;
        }
        while start > 0 && chars[start - 1] != ' ' {
            start -= 1;
        }
        let from = self.char_to_byte(start);
        let to = self.char_to_byte(self.cursor);
        self.input.replace_range(from..to, "");
        self.cursor = start;
    }

    /// Delete everything before the cursor (`Ctrl-U`).
    pub fn clear_before_cursor(&mut self) {
        let to = self.char_to_byte(self.cursor);
        self.input.replace_range(..to, "");
        self.cursor = 0;
    }

    pub const fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map_or(self.input.len(), |(byte_idx, _)| byte_idx)
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Prompt {
    kind: PromptKind,
    line: InputLine,
}

impl Prompt {
    #[must_use]
    pub const fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            line: InputLine::new(),
        }
    }

    /// A prompt that opens with `text` already typed (`:'<,'>` from Visual).
    #[must_use]
    pub fn with_text(kind: PromptKind, text: &str) -> Self {
        let mut prompt = Self::new(kind);
        text.chars().for_each(|ch| prompt.line.insert_char(ch));
        prompt
    }

    #[must_use]
    pub const fn kind(&self) -> PromptKind {
        self.kind
    }

    #[must_use]
    pub const fn line(&self) -> &InputLine {
        &self.line
    }

    /// Prompt char plus input, as drawn on the status row.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{}", self.kind.prompt_char(), self.line.input())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptEvent {
        if key.is_ctrl('u') {
            self.line.clear_before_cursor();
            return PromptEvent::Pending;
        }
        if key.is_ctrl('w') {
            self.line.delete_word();
            return PromptEvent::Pending;
        }
        if key.is_ctrl('c') || key.is_ctrl('[') {
            return PromptEvent::Cancel;
        }
        if key.is_ctrl('h') {
            return self.backspace();
        }

        match key.code {
            KeyCode::Enter => PromptEvent::Submit(self.line.input().to_string()),
            KeyCode::Escape => PromptEvent::Cancel,
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => {
                self.line.delete();
                PromptEvent::Pending
            }
            KeyCode::Left => {
                self.line.move_left();
                PromptEvent::Pending
            }
            KeyCode::Right => {
                self.line.move_right();
                PromptEvent::Pending
            }
            KeyCode::Home => {
                self.line.move_home();
                PromptEvent::Pending
            }
            KeyCode::End => {
                self.line.move_end();
                PromptEvent::Pending
            }
            KeyCode::Tab => {
                self.line.insert_char('\t');
                PromptEvent::Pending
            }
            _ => {
                if let Some(ch) = key.typed_char() {
                    self.line.insert_char(ch);
                }
                PromptEvent::Pending
            }
        }
    }

    fn backspace(&mut self) -> PromptEvent {
        if self.line.is_empty() {
            return PromptEvent::Cancel;
        }
        self.line.backspace();
        PromptEvent::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vimux_term::input::decode_str;

    fn feed(prompt: &mut Prompt, keys: &str) -> PromptEvent {
        let mut last = PromptEvent::Pending;
        for key in decode_str(keys) {
            last = prompt.handle_key(key);
        }
        last
    }

    // -- InputLine -----------------------------------------------------------

    #[test]
    fn insert_in_middle() {
        let mut line = InputLine::new();
        line.insert_char('w');
        line.insert_char('q');
        line.move_left();
        line.insert_char('!');
        assert_eq!(line.input(), "w!q");
        assert_eq!(line.cursor(), 2);
    }

    #[test]
    fn backspace_and_delete_bounds() {
        let mut line = InputLine::new();
        assert!(!line.backspace());
        line.insert_char('a');
        assert!(!line.delete());
        line.move_home();
        assert!(line.delete());
        assert!(line.is_empty());
    }

    #[test]
    fn delete_word_and_clear() {
        let mut line = InputLine::new();
        "set nu rnu".chars().for_each(|c| line.insert_char(c));
        line.delete_word();
        assert_eq!(line.input(), "set nu ");
        line.move_left();
        line.clear_before_cursor();
        assert_eq!(line.input(), " ");
        assert_eq!(line.cursor(), 0);
    }

    // -- Prompt --------------------------------------------------------------

    #[test]
    fn submit_returns_text() {
        let mut prompt = Prompt::new(PromptKind::Command);
        assert_eq!(prompt.display(), ":");
        assert_eq!(feed(&mut prompt, "wq\r"), PromptEvent::Submit("wq".into()));
    }

    #[test]
    fn editing_keys() {
        let mut prompt = Prompt::new(PromptKind::Search(SearchDirection::Backward));
        assert_eq!(feed(&mut prompt, "helo<Left>l<End>!"), PromptEvent::Pending);
        assert_eq!(prompt.display(), "?hello!");
        assert_eq!(prompt.line().cursor(), 6);
    }

    #[test]
    fn prefilled_text_keeps_editing() {
        let mut prompt = Prompt::with_text(PromptKind::Command, "'<,'>");
        assert_eq!(prompt.line().cursor(), 5);
        assert_eq!(feed(&mut prompt, "d\r"), PromptEvent::Submit("'<,'>d".into()));
    }

    #[test]
    fn backspace_on_empty_cancels() {
        let mut prompt = Prompt::new(PromptKind::Command);
        assert_eq!(feed(&mut prompt, "a<BS>"), PromptEvent::Pending);
        assert_eq!(feed(&mut prompt, "<BS>"), PromptEvent::Cancel);
        let mut prompt = Prompt::new(PromptKind::Command);
        assert_eq!(feed(&mut prompt, "abc<Esc>"), PromptEvent::Cancel);
    }
}
