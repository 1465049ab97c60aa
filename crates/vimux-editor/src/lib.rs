//! # vimux-editor: the modal editor and multiplexer engine
//!
//! Given an initial buffer and a sequence of keys, this crate reproduces
//! the screen a modal editor running inside a terminal multiplexer would
//! show. Everything is synchronous and deterministic.
//!
//! Leaf data types:
//!
//! - **[`position`]**: `Position`, `Range`, `Span` and block rectangles
//! - **[`buffer`]**: `Buffer`, a rope with a dirty flag
//! - **[`cursor`]**: cursor movement with the sticky column
//! - **[`word`]** and **[`text_object`]**: character classes, `iw` `a"` `i(`
//! - **[`register`]**, **[`history`]**, **[`search`]**, **[`options`]**
//!
//! Key handling:
//!
//! - **[`keymap`]**: the `(mode, key) -> command` tables
//! - **[`motion`]**: motion resolution
//! - **[`command`]**: `:` command parsing and substitution
//! - **[`prompt`]**: the `:` `/` `?` input line
//! - **[`pane`]**: one editor instance, with its key handling split over
//!   `normal`, `insert`, `visual`, `excmd` and `edit`
//!
//! Screen:
//!
//! - **[`view`]**: scrolling and drawing a pane
//! - **[`layout`]**: the split tree
//! - **[`session`]**: panes, prefix keys, zoom, frames
//! - **[`snapshot`]**: the record compared against ground truth

pub mod buffer;
pub mod command;
pub mod cursor;
mod edit;
pub mod error;
mod excmd;
pub mod history;
mod insert;
pub mod keymap;
pub mod layout;
pub mod mode;
pub mod motion;
mod normal;
pub mod options;
pub mod pane;
pub mod position;
pub mod prompt;
pub mod register;
pub mod search;
pub mod session;
pub mod snapshot;
pub mod text_object;
pub mod view;
pub mod visual;
pub mod word;

pub use error::{Error, Result};
pub use session::{Frame, Session, SessionConfig};
pub use snapshot::Snapshot;
