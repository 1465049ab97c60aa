//! Running committed prompts: `:` commands and `/` `?` searches.
//!
//! Parsing lives in [`crate::command`]; this module applies the parsed
//! [`Command`] to the pane. Failures a user can cause are reported on the
//! status line with Vim's numbered messages and never abort key handling.

use tracing::debug;
use vimux_term::input::KeyEvent;

use crate::command::{self, CmdRange, Command, SubFlags, substitute_line};
use crate::mode::Mode;
use crate::normal::{PendingOp, motion_span};
use crate::pane::{Pane, PaneRequest, PromptState};
use crate::position::{Position, Range};
use crate::prompt::{Prompt, PromptEvent, PromptKind};
use crate::search::{Pattern, SearchDirection};

/// The last `:s`, for `:s` without arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LastSubstitute {
    pub(crate) pattern: String,
    pub(crate) replacement: String,
    pub(crate) flags: SubFlags,
}

const fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

impl Pane {
    // -- Prompt -------------------------------------------------------------

    /// Open the `:` or search prompt, optionally with text already typed.
    pub(crate) fn open_prompt(
        &mut self,
        kind: PromptKind,
        text: &str,
        operator: Option<PendingOp>,
        count: Option<usize>,
    ) {
        self.prompt = Some(PromptState {
            prompt: Prompt::with_text(kind, text),
            origin: self.mode,
            operator,
            count,
        });
        self.mode = Mode::CommandLine;
        self.clear_message();
    }

    pub(crate) fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(state) = self.prompt.as_mut() else {
            return;
        };
        match state.prompt.handle_key(key) {
            PromptEvent::Pending => {}
            PromptEvent::Cancel => {
                if let Some(state) = self.prompt.take() {
                    self.mode = state.origin;
                }
                self.cancel_command();
            }
            PromptEvent::Submit(text) => {
                let Some(state) = self.prompt.take() else {
                    return;
                };
                self.mode = state.origin;
                match state.prompt.kind() {
                    PromptKind::Command => self.execute_line(&text),
                    PromptKind::Search(direction) => {
                        self.submit_search(&text, direction, state.operator, state.count);
                    }
                }
            }
        }
    }

    fn submit_search(
        &mut self,
        text: &str,
        direction: SearchDirection,
        operator: Option<PendingOp>,
        count: Option<usize>,
    ) {
        let source = if text.is_empty() {
            match self.search.pattern() {
                Some(pattern) => pattern.source().to_string(),
                None => {
                    self.set_error("E35: No previous regular expression");
                    return;
                }
            }
        } else {
            text.to_string()
        };
        let pattern = match Pattern::new(&source) {
            Ok(pattern) => pattern,
            Err(err) => {
                debug!(target: "search", %err, "rejected pattern");
                self.set_error(format!("E383: Invalid search string: {source}"));
                return;
            }
        };
        self.search.set(pattern.clone(), direction);

        let start = self.cursor.position();
        let Some(target) = self.search_from(&pattern, start, direction, count.unwrap_or(1)) else {
            self.register = None;
            return;
        };
        match operator {
            Some(pending_op) => {
                if let Some(span) = motion_span(&self.buffer, start, target) {
                    self.apply_operator(pending_op.op, span);
                }
            }
            None => self.jump_to(target),
        }
    }

    // -- Commands -----------------------------------------------------------

    /// Parse and run the text of a `:` prompt.
    pub(crate) fn execute_line(&mut self, text: &str) {
        self.execute(command::parse(text));
    }

    pub(crate) fn execute(&mut self, command: Command) {
        debug!(target: "excmd", ?command, "execute");
        match command {
            Command::Empty => {}
            Command::Write => self.write(),
            Command::Quit => {
                if self.is_dirty() {
                    self.set_error("E37: No write since last change (add ! to override)");
                } else {
                    self.request(PaneRequest::Close);
                }
            }
            Command::ForceQuit => self.request(PaneRequest::Close),
            Command::WriteQuit => {
                self.write();
                self.request(PaneRequest::Close);
            }
            Command::ExitSave => {
                if self.is_dirty() {
                    self.write();
                }
                self.request(PaneRequest::Close);
            }
            Command::Goto(address) => {
                let last = self.buffer.line_count() - 1;
                let line = address.resolve(self.cursor.line(), last).min(last);
                self.cursor.goto_line(line, &self.buffer, false);
            }
            Command::Set(args) => match self.options.apply_str(&args) {
                Ok(Some(echo)) => self.set_message(echo),
                Ok(None) => {}
                Err(err) => self.set_error(err),
            },
            Command::NoHighlight => self.search.clear_highlight(),
            Command::Substitute { range, pattern, replacement, flags } => {
                self.substitute(range, pattern, replacement, flags);
            }
            Command::SubRepeat { range } => match self.last_sub.clone() {
                Some(last) => self.substitute(range, last.pattern, last.replacement, SubFlags::default()),
                None => self.set_error("E35: No previous regular expression"),
            },
            Command::Unknown(text) => self.set_error(format!("E492: Not an editor command: {text}")),
        }
    }

    /// `:w` marks the current history state as the written one.
    fn write(&mut self) {
        self.saved_id = self.history.state_id();
        self.buffer.set_modified(false);
        let name = self.buffer.name().unwrap_or("[No Name]");
        let text = format!(
            "\"{name}\" {}L, {}B written",
            self.buffer.line_count(),
            self.buffer.written_bytes()
        );
        self.set_message(text);
    }

    /// First and last line of a range, or `None` after reporting why not.
    fn line_range(&mut self, range: CmdRange) -> Option<(usize, usize)> {
        let current = self.cursor.line();
        let last = self.buffer.line_count() - 1;
        match range {
            CmdRange::CurrentLine => Some((current, current)),
            CmdRange::All => Some((0, last)),
            CmdRange::Lines(from, to) => {
                let (from, to) = (from.resolve(current, last), to.resolve(current, last));
                if from > last || to > last {
                    self.set_error("E16: Invalid range");
                    return None;
                }
                Some((from.min(to), from.max(to)))
            }
            CmdRange::Visual => match self.last_visual {
                Some(marks) => Some((marks.start.line, marks.end.line.min(last))),
                None => {
                    self.set_error("E20: Mark not set");
                    None
                }
            },
        }
    }

    /// `:s`. An empty pattern reuses the last search pattern; the pattern
    /// used becomes the last search pattern.
    fn substitute(&mut self, range: CmdRange, pattern: String, replacement: String, flags: SubFlags) {
        let Some((first, last)) = self.line_range(range) else {
            return;
        };
        let source = if pattern.is_empty() {
            match self.search.pattern() {
                Some(pattern) => pattern.source().to_string(),
                None => {
                    self.set_error("E35: No previous regular expression");
                    return;
                }
            }
        } else {
            pattern
        };
        let compiled = if flags.case_insensitive { format!("\\c{source}") } else { source.clone() };
        let regex_pattern = match Pattern::new(&compiled) {
            Ok(pattern) => pattern,
            Err(err) => {
                debug!(target: "excmd", %err, "rejected pattern");
                self.set_error(format!("E383: Invalid search string: {source}"));
                return;
            }
        };
        if let Ok(search_pattern) = Pattern::new(&source) {
            let direction = self.search.direction();
            self.search.set(search_pattern, direction);
        }
        self.last_sub = Some(LastSubstitute {
            pattern: source.clone(),
            replacement: replacement.clone(),
            flags,
        });

        let mut matches = 0;
        let mut lines = 0;
        let mut last_changed = None;
        for line in first..=last {
            let text = self.buffer.line_text(line);
            let Some((new_text, n)) = substitute_line(regex_pattern.regex(), &text, &replacement, flags) else {
                continue;
            };
            matches += n;
            lines += 1;
            last_changed = Some(line);
            if !flags.count_only {
                let range = Range::ordered(Position::new(line, 0), Position::new(line, text.chars().count()));
                self.replace_text(range, &new_text);
            }
        }
        debug!(target: "excmd", matches, lines, "substitute");

        let Some(line) = last_changed else {
            self.set_error(format!("E486: Pattern not found: {source}"));
            return;
        };
        if flags.count_only {
            self.set_message(format!(
                "{matches} match{} on {lines} line{}",
                if matches == 1 { "" } else { "es" },
                plural(lines)
            ));
            return;
        }
        self.dot.mark_change();
        self.cursor.goto_line(line, &self.buffer, false);
        if matches > 2 {
            self.set_message(format!(
                "{matches} substitution{} on {lines} line{}",
                plural(matches),
                plural(lines)
            ));
        }
    }
}
