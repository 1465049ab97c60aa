//! Registers: storage for yanked and deleted text.
//!
//! Every yank and delete writes the unnamed register. Put (`p`, `P`)
//! reads it back, and the register's [`RegisterKind`] decides the shape:
//!
//! - **Char**: inline at the cursor.
//! - **Line**: whole lines below/above. Content always ends with `\n`.
//! - **Block**: a rectangle, one row per `\n`-separated piece.
//!
//! Named registers `"a`-`"z` are kept as well; uppercase appends.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterKind {
    #[default]
    Char,
    Line,
    Block,
}

/// One register slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    content: String,
    kind: RegisterKind,
}

impl Register {
    #[must_use]
    pub fn new(content: impl Into<String>, kind: RegisterKind) -> Self {
        let mut content = content.into();
        if kind == RegisterKind::Line && !content.ends_with('\n') {
            content.push('\n');
        }
        Self { content, kind }
    }

    fn append(&mut self, other: &Self) {
        if self.kind == RegisterKind::Line || other.kind == RegisterKind::Line {
            if !self.content.is_empty() && !self.content.ends_with('\n') {
                self.content.push('\n');
            }
            self.content.push_str(&other.content);
            self.kind = RegisterKind::Line;
        } else {
            self.content.push_str(&other.content);
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn kind(&self) -> RegisterKind {
        self.kind
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Content split into rows. A linewise register's final newline does
    /// not produce an extra empty row.
    #[must_use]
    pub fn rows(&self) -> Vec<&str> {
        let body = match self.kind {
            RegisterKind::Line => self.content.strip_suffix('\n').unwrap_or(&self.content),
            _ => &self.content,
        };
        body.split('\n').collect()
    }
}

// ── Register file ────────────────────────────────────────────────────────

/// The unnamed register plus `a`-`z`.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    unnamed: Register,
    named: [Register; 26],
}

impl RegisterFile {
    #[must_use]
    pub fn new() -> Self {
        Self {
            unnamed: Register::default(),
            named: std::array::from_fn(|_| Register::default()),
        }
    }

    /// Store a yank/delete. `name` addresses a named register: lowercase
    /// overwrites, uppercase appends. The unnamed register always ends up
    /// holding what was written.
    pub fn store(&mut self, name: Option<char>, reg: Register) {
        match name.and_then(named_index) {
            Some((idx, true)) => {
                self.named[idx].append(&reg);
                self.unnamed = self.named[idx].clone();
            }
            Some((idx, false)) => {
                self.named[idx] = reg.clone();
                self.unnamed = reg;
            }
            None => self.unnamed = reg,
        }
    }

    /// Read a register; unknown names read the unnamed register.
    #[must_use]
    pub fn get(&self, name: Option<char>) -> &Register {
        match name.and_then(named_index) {
            Some((idx, _)) => &self.named[idx],
            None => &self.unnamed,
        }
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

/// `(slot, is_append)` for a register name letter.
fn named_index(name: char) -> Option<(usize, bool)> {
    if name.is_ascii_lowercase() {
        Some((usize::from(name as u8 - b'a'), false))
    } else if name.is_ascii_uppercase() {
        Some((usize::from(name as u8 - b'A'), true))
    } else {
        None
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
