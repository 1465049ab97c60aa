//! Error types for the engine.
//!
//! Only integration mistakes are errors: a bad key token in a fixture, a
//! terminal too small to hold a pane, a pattern that does not compile.
//! Everything a user can trigger by typing (unknown commands, `:q` with
//! changes, a missing search match) is a status-line message on the pane
//! instead, and key processing carries on.

use thiserror::Error;
use vimux_term::input::KeyError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid key token: {0}")]
    Key(#[from] KeyError),

    #[error("terminal size {cols}x{rows} is too small (need at least 2x2)")]
    TerminalSize { cols: u16, rows: u16 },

    #[error("no pane with id {0}")]
    UnknownPane(usize),

    #[error("invalid search pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
