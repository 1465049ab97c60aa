//! Ex commands: the text typed after `:`.
//!
//! [`parse`] turns the committed prompt text into a [`Command`]; the pane
//! executes it. Parsing never fails: anything unrecognised becomes
//! [`Command::Unknown`] and is reported as `E492` on the status line.
//!
//! # Supported commands
//!
//! | Command                    | Action                                   |
//! |----------------------------|------------------------------------------|
//! | `:w`                       | Mark the buffer saved                    |
//! | `:q`                       | Close the pane (fails if modified)       |
//! | `:q!`                      | Close the pane, discarding changes       |
//! | `:wq`, `:x`                | Save then close                          |
//! | `:{N}`, `:$`               | Go to line N (first non-blank)           |
//! | `:set ...`                 | See [`crate::options`]                   |
//! | `:noh`, `:nohlsearch`      | Hide search highlighting                 |
//! | `:s/pat/rep/flags`         | Substitute on current line               |
//! | `:%s/pat/rep/flags`        | Substitute on all lines                  |
//! | `:N,Ms/pat/rep/flags`      | Substitute on a line range               |
//! | `:'<,'>s/pat/rep/flags`    | Substitute on the last visual selection  |
//! | `:s`                       | Repeat the last substitution             |
//!
//! # Substitution flags
//!
//! | Flag | Effect                               |
//! |------|--------------------------------------|
//! | `g`  | Replace all matches per line          |
//! | `i`  | Case-insensitive matching             |
//! | `n`  | Count matches only (don't replace)    |

use regex::{Captures, Regex};

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// One end of a line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    /// A line number, 0-indexed (Vim's 1-indexed input is converted).
    Line(usize),
    /// `.`
    Current,
    /// `$`
    Last,
}

impl Address {
    /// Resolve against the cursor line and the buffer's last line.
    #[must_use]
    pub const fn resolve(self, current: usize, last: usize) -> usize {
        match self {
            Self::Line(n) => n,
            Self::Current => current,
            Self::Last => last,
        }
    }
}

/// An address range prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmdRange {
    /// No range given.
    CurrentLine,
    /// `%`
    All,
    /// `N` or `N,M`
    Lines(Address, Address),
    /// `'<,'>`
    Visual,
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubFlags {
    /// `g`
    pub global: bool,
    /// `i`
    pub case_insensitive: bool,
    /// `n`
    pub count_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `:` followed by Enter.
    Empty,
    Write,
    Quit,
    ForceQuit,
    /// `:wq`
    WriteQuit,
    /// `:x`, also `ZZ`.
    ExitSave,
    /// `:{N}`, with the address unresolved.
    Goto(Address),
    /// `:set` and its argument string.
    Set(String),
    NoHighlight,
    Substitute {
        range: CmdRange,
        pattern: String,
        replacement: String,
        flags: SubFlags,
    },
    /// `:s` with no pattern.
    SubRepeat { range: CmdRange },
    /// Anything else, holding the input for the error message.
    Unknown(String),
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a command string (without the leading `:`).
#[must_use]
pub fn parse(input: &str) -> Command {
    let trimmed = input.trim_start_matches([' ', ':']).trim_end();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    let (range, rest) = parse_range(trimmed);
    let rest = rest.trim_start();

    if let Some(body) = substitute_body(rest) {
        return parse_substitute(range, body);
    }

    if rest.is_empty() {
        return match range {
            CmdRange::Lines(_, to) => Command::Goto(to),
            CmdRange::All => Command::Goto(Address::Last),
            _ => Command::Unknown(trimmed.to_string()),
        };
    }

    // Ranges are ignored by the remaining commands, as in Vim.
    let (cmd, arg) = rest
        .find(char::is_whitespace)
        .map_or((rest, ""), |pos| (&rest[..pos], rest[pos..].trim_start()));

    match cmd {
        "w" | "write" | "w!" => Command::Write,
        "q" | "quit" => Command::Quit,
        "q!" | "quit!" => Command::ForceQuit,
        "wq" | "wq!" => Command::WriteQuit,
        "x" | "xit" | "exit" | "x!" => Command::ExitSave,
        "se" | "set" => Command::Set(arg.to_string()),
        "noh" | "nohl" | "nohls" | "nohlsearch" => Command::NoHighlight,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

/// The text after `s`/`substitute` when `rest` is a substitute command.
fn substitute_body(rest: &str) -> Option<&str> {
    let body = rest.strip_prefix("substitute").or_else(|| rest.strip_prefix('s'))?;
    match body.chars().next() {
        None => Some(body),
        Some(ch) if !ch.is_alphanumeric() && ch != '\\' && ch != '"' && ch != '|' && ch != ' ' => {
            Some(body)
        }
        _ => None,
    }
}

/// Parse a range prefix. Returns `(CmdRange::CurrentLine, input)` when
/// there is none.
fn parse_range(input: &str) -> (CmdRange, &str) {
    if let Some(rest) = input.strip_prefix('%') {
        return (CmdRange::All, rest);
    }
    if let Some(rest) = input.strip_prefix("'<,'>") {
        return (CmdRange::Visual, rest);
    }
    let Some((from, rest)) = parse_address(input) else {
        return (CmdRange::CurrentLine, input);
    };
    if let Some(after_comma) = rest.strip_prefix(',') {
        if let Some((to, rest)) = parse_address(after_comma) {
            return (CmdRange::Lines(from, to), rest);
        }
    }
    (CmdRange::Lines(from, from), rest)
}

/// A single address: a 1-indexed number, `.` or `$`.
fn parse_address(input: &str) -> Option<(Address, &str)> {
    if let Some(rest) = input.strip_prefix('.') {
        return Some((Address::Current, rest));
    }
    if let Some(rest) = input.strip_prefix('$') {
        return Some((Address::Last, rest));
    }
    let end = input
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(input.len());
    if end == 0 {
        return None;
    }
    let num: usize = input[..end].parse().unwrap_or(usize::MAX);
    Some((Address::Line(num.saturating_sub(1)), &input[end..]))
}

/// Parse the body of a `:s` command (everything after the `s`).
///
/// Handles any delimiter and escaped delimiters (`s#a#b#g`, `s/a\/b/c/`).
fn parse_substitute(range: CmdRange, body: &str) -> Command {
    let Some(delim) = body.chars().next() else {
        return Command::SubRepeat { range };
    };
    let after_delim = &body[delim.len_utf8()..];

    let Some((pattern, rest)) = split_at_unescaped(after_delim, delim) else {
        return Command::Substitute {
            range,
            pattern: unescape_delim(after_delim, delim),
            replacement: String::new(),
            flags: SubFlags::default(),
        };
    };

    let (replacement, flags) = match split_at_unescaped(rest, delim) {
        Some((replacement, flags)) => (replacement, parse_sub_flags(flags)),
        None => (rest, SubFlags::default()),
    };

    Command::Substitute {
        range,
        pattern: unescape_delim(pattern, delim),
        replacement: unescape_delim(replacement, delim),
        flags,
    }
}

/// Split at the first occurrence of `delim` not preceded by `\`.
fn split_at_unescaped(s: &str, delim: char) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (byte_idx, ch) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == delim {
            return Some((&s[..byte_idx], &s[byte_idx + ch.len_utf8()..]));
        }
    }
    None
}

/// `\<delim>` becomes `<delim>`; other escapes pass through.
fn unescape_delim(s: &str, delim: char) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' && chars.peek() == Some(&delim) {
            result.push(delim);
            chars.next();
            continue;
        }
        result.push(ch);
    }
    result
}

fn parse_sub_flags(s: &str) -> SubFlags {
    let mut flags = SubFlags::default();
    for ch in s.chars() {
        match ch {
            'g' => flags.global = !flags.global,
            'i' => flags.case_insensitive = true,
            'n' => flags.count_only = true,
            _ => {}
        }
    }
    flags
}

// ---------------------------------------------------------------------------
// Substitution
// ---------------------------------------------------------------------------

/// Substitute on one line.
///
/// Returns the new text and the number of matches, or `None` when nothing
/// matched. With `count_only` the text is returned unchanged.
#[must_use]
pub fn substitute_line(
    regex: &Regex,
    text: &str,
    replacement: &str,
    flags: SubFlags,
) -> Option<(String, usize)> {
    let count = if flags.global {
        regex.find_iter(text).count()
    } else {
        usize::from(regex.is_match(text))
    };
    if count == 0 {
        return None;
    }
    if flags.count_only {
        return Some((text.to_string(), count));
    }
    let limit = if flags.global { 0 } else { 1 };
    let replaced = regex.replacen(text, limit, |caps: &Captures<'_>| expand_replacement(caps, replacement));
    Some((replaced.into_owned(), count))
}

/// Expand Vim replacement syntax: `&` and `\0` are the whole match, `\1`
/// to `\9` groups, `\&` a literal `&`, `\t` a tab. `\u`/`\l` upcase or
/// downcase the next char, `\U`/`\L` until `\E`.
fn expand_replacement(caps: &Captures<'_>, replacement: &str) -> String {
    let mut out = CaseWriter::default();
    let group = |n: usize| caps.get(n).map_or("", |m| m.as_str());
    let mut chars = replacement.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '&' => out.push_str(group(0)),
            '\\' => match chars.next() {
                Some(d @ '0'..='9') => {
                    let n = d.to_digit(10).map_or(0, |n| n as usize);
                    out.push_str(group(n));
                }
                Some('t') => out.push('\t'),
                Some('u') => out.one_shot = Case::Upper,
                Some('l') => out.one_shot = Case::Lower,
                Some('U') => out.sticky = Case::Upper,
                Some('L') => out.sticky = Case::Lower,
                Some('E' | 'e') => out.sticky = Case::Keep,
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    out.text
}

#[derive(Clone, Copy, PartialEq, Eq, Default)]
enum Case {
    #[default]
    Keep,
    Upper,
    Lower,
}

/// Output buffer applying `\u \l \U \L` case changes.
#[derive(Default)]
struct CaseWriter {
    text: String,
    one_shot: Case,
    sticky: Case,
}

impl CaseWriter {
    fn push(&mut self, ch: char) {
        let case = if self.one_shot == Case::Keep { self.sticky } else { self.one_shot };
        self.one_shot = Case::Keep;
        match case {
            Case::Upper => self.text.extend(ch.to_uppercase()),
            Case::Lower => self.text.extend(ch.to_lowercase()),
            Case::Keep => self.text.push(ch),
        }
    }

    fn push_str(&mut self, s: &str) {
        s.chars().for_each(|ch| self.push(ch));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
