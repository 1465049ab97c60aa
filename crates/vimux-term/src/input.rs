// SPDX-License-Identifier: MIT
//
// Key input decoding.
//
// Turns the keystrokes of a recorded session into structured key events.
// Keystrokes arrive in two shapes:
//
// - Raw terminal bytes, exactly what a multiplexer writes into a pane:
//   printable UTF-8, C0 control bytes for Ctrl+letter, and CSI escape
//   sequences for arrows and editing keys (optionally with modifiers).
// - Named tokens such as `Escape`, `Enter`, `C-r` or `<Left>`, the form a
//   lesson script or fixture file uses when bytes would be unreadable.
//
// # Escape handling
//
// A live terminal has to guess whether ESC starts a sequence or is the
// Escape key, and waits on a timer to decide. A replay has no timer, so the
// rule is structural: ESC starts a sequence only when it is followed by `[`
// and the bytes form a complete, recognised CSI key. Anything else
// (including `ESC O`, which in a replay is almost always Escape followed by
// the `O` command) is a plain Escape keypress.

use std::fmt;

use bitflags::bitflags;
use thiserror::Error;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A single key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Keyboard modifier flags, in xterm's `1 + bitmask` order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

impl KeyEvent {
    /// A key with explicit modifiers.
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// An unmodified character key.
    #[inline]
    #[must_use]
    pub const fn char(ch: char) -> Self {
        Self::plain(KeyCode::Char(ch))
    }

    /// Ctrl plus a character, e.g. `ctrl('r')` for redo.
    #[inline]
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::CTRL)
    }

    /// The printable character this key types, if it has no Ctrl/Alt.
    #[must_use]
    pub fn typed_char(self) -> Option<char> {
        match self.code {
            KeyCode::Char(ch) if !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) => {
                Some(ch)
            }
            _ => None,
        }
    }

    /// Whether this is Ctrl + `ch`.
    #[must_use]
    pub fn is_ctrl(self, ch: char) -> bool {
        self.code == KeyCode::Char(ch) && self.modifiers == Modifiers::CTRL
    }
}

impl fmt::Display for KeyEvent {
    /// Vim-style key notation: `a`, `<Esc>`, `<C-r>`, `<M-Left>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.code {
            KeyCode::Char(ch) if self.modifiers.is_empty() => {
                return match ch {
                    '<' => f.write_str("<lt>"),
                    ' ' => f.write_str("<Space>"),
                    _ => write!(f, "{ch}"),
                };
            }
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(ch) => ch.to_string(),
            KeyCode::Enter => "CR".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "BS".to_string(),
            KeyCode::Escape => "Esc".to_string(),
            KeyCode::Delete => "Del".to_string(),
            KeyCode::Insert => "Insert".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
        };
        f.write_str("<")?;
        if self.modifiers.contains(Modifiers::CTRL) {
            f.write_str("C-")?;
        }
        if self.modifiers.contains(Modifiers::ALT) {
            f.write_str("M-")?;
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            f.write_str("S-")?;
        }
        write!(f, "{name}>")
    }
}

/// Rejected key token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("empty key token")]
    Empty,
    #[error("unknown key name `{0}`")]
    UnknownName(String),
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Byte-level key decoder.
///
/// Feed bytes with [`advance`](Parser::advance); bytes that may still
/// become a longer sequence (a trailing ESC, a partial CSI or UTF-8 lead)
/// stay buffered until more input arrives or [`finish`](Parser::finish)
/// resolves them.
#[derive(Debug, Default)]
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(16),
        }
    }

    /// Feed bytes and return every key that is complete.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }
        keys
    }

    /// Whether bytes are waiting for more input.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve everything still buffered.
    ///
    /// A pending ESC becomes Escape and whatever follows it is decoded
    /// again on its own; truncated UTF-8 is dropped.
    pub fn finish(&mut self) -> Vec<KeyEvent> {
        let mut keys = Vec::new();
        let rest = std::mem::take(&mut self.buf);
        let mut pos = 0;
        while pos < rest.len() {
            match try_parse(&rest[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete if rest[pos] == 0x1B => {
                    keys.push(KeyEvent::plain(KeyCode::Escape));
                    pos += 1;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }
        keys
    }
}

/// Decode a complete byte string into keys.
#[must_use]
pub fn decode(bytes: &[u8]) -> Vec<KeyEvent> {
    let mut parser = Parser::new();
    let mut keys = parser.advance(bytes);
    keys.extend(parser.finish());
    keys
}

/// Decode a key string that may mix raw bytes with `<Name>` notation.
///
/// `<Esc>`, `<CR>`, `<C-r>` and the like are recognised only when the
/// name between the brackets is a known key; `<div>` stays literal text.
#[must_use]
pub fn decode_str(input: &str) -> Vec<KeyEvent> {
    let mut parser = Parser::new();
    let mut keys = Vec::new();
    let mut literal_start = 0;
    let mut idx = 0;

    while idx < input.len() {
        let rest = &input[idx..];
        if rest.starts_with('<') {
            if let Some(close) = rest[1..].find('>') {
                let inner = &rest[1..=close];
                if let Some(key) = parse_name(inner) {
                    keys.extend(parser.advance(input[literal_start..idx].as_bytes()));
                    keys.extend(parser.finish());
                    keys.push(key);
                    idx += close + 2;
                    literal_start = idx;
                    continue;
                }
            }
        }
        idx += rest.chars().next().map_or(1, char::len_utf8);
    }

    keys.extend(parser.advance(input[literal_start..].as_bytes()));
    keys.extend(parser.finish());
    keys
}

/// Decode one element of a token array.
///
/// A token is a key name (`Escape`, `C-r`, `<Left>`, `^W`) or literal
/// text typed key by key, the way `send-keys` treats unknown words.
///
/// # Errors
///
/// Returns [`KeyError::Empty`] for `""` and [`KeyError::UnknownName`] for
/// a bracketed name such as `<Bogus>` that is not a key.
pub fn parse_token(token: &str) -> Result<Vec<KeyEvent>, KeyError> {
    if token.is_empty() {
        return Err(KeyError::Empty);
    }

    let bare = token
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(token);

    if let Some(key) = parse_name(bare) {
        return Ok(vec![key]);
    }

    if let Some(ch) = bare.strip_prefix('^') {
        let mut chars = ch.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphabetic() {
                return Ok(vec![KeyEvent::ctrl(c.to_ascii_lowercase())]);
            }
        }
    }

    if bare.len() != token.len() {
        return Err(KeyError::UnknownName(bare.to_string()));
    }

    Ok(decode(token.as_bytes()))
}

/// Resolve a key name such as `Esc`, `Enter`, `C-r` or `M-Left`.
///
/// Names are case-insensitive except for the single character after a
/// modifier prefix.
#[must_use]
pub fn parse_name(name: &str) -> Option<KeyEvent> {
    if let Some((modifiers, rest)) = split_modifiers(name) {
        if rest.is_empty() {
            return None;
        }
        let mut key = parse_name(rest).or_else(|| single_char(rest).map(KeyEvent::char))?;
        if modifiers.contains(Modifiers::CTRL) {
            if let KeyCode::Char(ch) = key.code {
                key.code = KeyCode::Char(ch.to_ascii_lowercase());
            }
        }
        key.modifiers |= modifiers;
        return Some(key);
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "esc" | "escape" => KeyCode::Escape,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" | "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "del" | "delete" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        _ => return None,
    };
    Some(KeyEvent::plain(code))
}

/// Peel `C-`, `Ctrl-`, `M-`, `A-`, `Alt-`, `S-` and `Shift-` prefixes.
fn split_modifiers(name: &str) -> Option<(Modifiers, &str)> {
    let mut modifiers = Modifiers::empty();
    let mut rest = name;
    loop {
        let lower = rest.to_ascii_lowercase();
        let (flag, len) = if lower.starts_with("ctrl-") {
            (Modifiers::CTRL, 5)
        } else if lower.starts_with("shift-") {
            (Modifiers::SHIFT, 6)
        } else if lower.starts_with("alt-") {
            (Modifiers::ALT, 4)
        } else if lower.starts_with("c-") {
            (Modifiers::CTRL, 2)
        } else if lower.starts_with("m-") || lower.starts_with("a-") {
            (Modifiers::ALT, 2)
        } else if lower.starts_with("s-") {
            (Modifiers::SHIFT, 2)
        } else {
            break;
        };
        modifiers |= flag;
        rest = &rest[len..];
    }
    if modifiers.is_empty() {
        None
    } else {
        Some((modifiers, rest))
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────

enum Parsed {
    /// A key, consuming `usize` bytes.
    Key(KeyEvent, usize),
    /// Need more bytes to decide.
    Incomplete,
    /// Unusable byte(s), skip `usize` bytes.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&lead) = buf.first() else {
        return Parsed::Skip(0);
    };

    match lead {
        0x1B => parse_escape(buf),
        0x00 => Parsed::Key(KeyEvent::ctrl('@'), 1),
        0x08 | 0x7F => Parsed::Key(KeyEvent::plain(KeyCode::Backspace), 1),
        0x09 => Parsed::Key(KeyEvent::plain(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Key(KeyEvent::plain(KeyCode::Enter), 1),
        b @ 0x01..=0x1A => Parsed::Key(KeyEvent::ctrl(char::from(b + b'a' - 1)), 1),
        b @ 0x20..=0x7E => Parsed::Key(KeyEvent::char(char::from(b)), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    match buf.get(1) {
        None => Parsed::Incomplete,
        Some(b'[') => match parse_csi(buf) {
            Parsed::Skip(_) => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
            other => other,
        },
        Some(_) => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

/// `ESC [ params final`, recognising cursor and editing keys only.
///
/// Returns `Skip` for anything unrecognised so the caller can fall back
/// to a bare Escape.
fn parse_csi(buf: &[u8]) -> Parsed {
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(b.is_ascii_digit() || b == b';') {
            return Parsed::Skip(1);
        }
        end += 1;
    }
    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let params = parse_csi_params(&buf[2..end]);
    let consumed = end + 1;

    if buf[end] == b'~' {
        let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));
        let code = match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Parsed::Skip(1),
        };
        return Parsed::Key(KeyEvent::new(code, modifiers), consumed);
    }

    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));
    let code = match buf[end] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Parsed::Skip(1),
    };
    Parsed::Key(KeyEvent::new(code, modifiers), consumed)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);
    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }
    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| Parsed::Key(KeyEvent::char(ch), expected))
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Semicolon-separated CSI parameters. Empty fields read as 0.
fn parse_csi_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field.iter().fold(0u16, |acc, &d| {
                acc.saturating_mul(10).saturating_add(u16::from(d - b'0'))
            })
        })
        .collect()
}

/// xterm modifier parameter: `1 + bitmask`, 0 and 1 mean none.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

/// Expected byte length of a UTF-8 character from its lead byte,
/// 0 for bytes that cannot start one.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    fn chars(s: &str) -> Vec<KeyEvent> {
        s.chars().map(KeyEvent::char).collect()
    }

    // ── Bytes ───────────────────────────────────────────────────────────

    #[test]
    fn printable_ascii() {
        assert_eq!(decode(b"dw"), chars("dw"));
    }

    #[test]
    fn control_bytes_are_ctrl_letters() {
        assert_eq!(decode(b"\x12"), vec![KeyEvent::ctrl('r')]);
        assert_eq!(decode(b"\x02"), vec![KeyEvent::ctrl('b')]);
        assert_eq!(decode(b"\x16"), vec![KeyEvent::ctrl('v')]);
    }

    #[test]
    fn enter_and_backspace_bytes() {
        assert_eq!(decode(b"\r"), vec![key(KeyCode::Enter)]);
        assert_eq!(decode(b"\n"), vec![key(KeyCode::Enter)]);
        assert_eq!(decode(b"\x08"), vec![key(KeyCode::Backspace)]);
        assert_eq!(decode(b"\x7f"), vec![key(KeyCode::Backspace)]);
        assert_eq!(decode(b"\t"), vec![key(KeyCode::Tab)]);
    }

    #[test]
    fn utf8_multibyte() {
        assert_eq!(decode("é中".as_bytes()), chars("é中"));
    }

    // ── Escape ──────────────────────────────────────────────────────────

    #[test]
    fn trailing_escape() {
        let keys = decode(b"ihi\x1b");
        assert_eq!(keys.last(), Some(&key(KeyCode::Escape)));
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn escape_then_command_is_not_alt() {
        assert_eq!(
            decode(b"\x1bdd"),
            vec![key(KeyCode::Escape), KeyEvent::char('d'), KeyEvent::char('d')]
        );
    }

    #[test]
    fn escape_then_capital_o_opens_line() {
        assert_eq!(
            decode(b"\x1bOA"),
            vec![key(KeyCode::Escape), KeyEvent::char('O'), KeyEvent::char('A')]
        );
    }

    #[test]
    fn double_escape() {
        assert_eq!(decode(b"\x1b\x1b"), vec![key(KeyCode::Escape); 2]);
    }

    #[test]
    fn arrows() {
        assert_eq!(
            decode(b"\x1b[A\x1b[B\x1b[C\x1b[D"),
            vec![key(KeyCode::Up), key(KeyCode::Down), key(KeyCode::Right), key(KeyCode::Left)]
        );
    }

    #[test]
    fn modified_arrows() {
        assert_eq!(
            decode(b"\x1b[1;5C"),
            vec![KeyEvent::new(KeyCode::Right, Modifiers::CTRL)]
        );
        assert_eq!(
            decode(b"\x1b[1;3A"),
            vec![KeyEvent::new(KeyCode::Up, Modifiers::ALT)]
        );
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(decode(b"\x1b[3~"), vec![key(KeyCode::Delete)]);
        assert_eq!(decode(b"\x1b[5~"), vec![key(KeyCode::PageUp)]);
    }

    #[test]
    fn unknown_csi_falls_back_to_escape() {
        assert_eq!(
            decode(b"\x1b[x"),
            vec![key(KeyCode::Escape), KeyEvent::char('['), KeyEvent::char('x')]
        );
    }

    #[test]
    fn escape_bracket_at_end() {
        assert_eq!(decode(b"\x1b["), vec![key(KeyCode::Escape), KeyEvent::char('[')]);
    }

    #[test]
    fn split_sequence_across_advance() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[").is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.advance(b"D"), vec![key(KeyCode::Left)]);
        assert!(!parser.has_pending());
    }

    // ── Names and tokens ────────────────────────────────────────────────

    #[test]
    fn named_keys() {
        assert_eq!(parse_name("Escape"), Some(key(KeyCode::Escape)));
        assert_eq!(parse_name("esc"), Some(key(KeyCode::Escape)));
        assert_eq!(parse_name("CR"), Some(key(KeyCode::Enter)));
        assert_eq!(parse_name("BS"), Some(key(KeyCode::Backspace)));
        assert_eq!(parse_name("Space"), Some(KeyEvent::char(' ')));
        assert_eq!(parse_name("nope"), None);
    }

    #[test]
    fn modifier_names() {
        assert_eq!(parse_name("C-r"), Some(KeyEvent::ctrl('r')));
        assert_eq!(parse_name("Ctrl-R"), Some(KeyEvent::ctrl('r')));
        assert_eq!(
            parse_name("M-Left"),
            Some(KeyEvent::new(KeyCode::Left, Modifiers::ALT))
        );
        assert_eq!(
            parse_name("C-Up"),
            Some(KeyEvent::new(KeyCode::Up, Modifiers::CTRL))
        );
    }

    #[test]
    fn tokens() {
        assert_eq!(parse_token("Escape"), Ok(vec![key(KeyCode::Escape)]));
        assert_eq!(parse_token("<C-v>"), Ok(vec![KeyEvent::ctrl('v')]));
        assert_eq!(parse_token("^W"), Ok(vec![KeyEvent::ctrl('w')]));
        assert_eq!(parse_token("dw"), Ok(chars("dw")));
        assert_eq!(parse_token("\r"), Ok(vec![key(KeyCode::Enter)]));
        assert_eq!(parse_token("\u{8}"), Ok(vec![key(KeyCode::Backspace)]));
    }

    #[test]
    fn token_errors() {
        assert_eq!(parse_token(""), Err(KeyError::Empty));
        assert_eq!(
            parse_token("<C-Bogus>"),
            Err(KeyError::UnknownName("C-Bogus".to_string()))
        );
        assert_eq!(parse_token("c-style"), Ok(chars("c-style")));
    }

    #[test]
    fn angle_notation_in_strings() {
        assert_eq!(
            decode_str("ihi<Esc>u"),
            vec![
                KeyEvent::char('i'),
                KeyEvent::char('h'),
                KeyEvent::char('i'),
                key(KeyCode::Escape),
                KeyEvent::char('u'),
            ]
        );
    }

    #[test]
    fn unknown_angle_text_is_literal() {
        assert_eq!(decode_str("i<div>"), chars("i<div>"));
    }

    #[test]
    fn raw_escape_before_angle_name() {
        assert_eq!(
            decode_str("\x1b<C-r>"),
            vec![key(KeyCode::Escape), KeyEvent::ctrl('r')]
        );
    }

    // ── Display ─────────────────────────────────────────────────────────

    #[test]
    fn display_notation() {
        assert_eq!(KeyEvent::char('x').to_string(), "x");
        assert_eq!(KeyEvent::char('<').to_string(), "<lt>");
        assert_eq!(key(KeyCode::Escape).to_string(), "<Esc>");
        assert_eq!(KeyEvent::ctrl('r').to_string(), "<C-r>");
        assert_eq!(
            KeyEvent::new(KeyCode::Left, Modifiers::ALT).to_string(),
            "<M-Left>"
        );
    }

    #[test]
    fn typed_char_ignores_ctrl() {
        assert_eq!(KeyEvent::char('a').typed_char(), Some('a'));
        assert_eq!(KeyEvent::ctrl('a').typed_char(), None);
        assert!(KeyEvent::ctrl('a').is_ctrl('a'));
    }

    #[test]
    fn decode_modifier_values() {
        assert_eq!(decode_modifiers(0), Modifiers::empty());
        assert_eq!(decode_modifiers(2), Modifiers::SHIFT);
        assert_eq!(decode_modifiers(5), Modifiers::CTRL);
        assert_eq!(decode_modifiers(3), Modifiers::ALT);
    }
}
