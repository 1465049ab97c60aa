//! Undo/redo history: transactions of reversible edits.
//!
//! Every buffer mutation is recorded as an [`Edit`] inside the currently
//! open [`Transaction`]. A transaction is one undo step:
//!
//! - **Normal mode**: one command (`x`, `dd`, `p`, `J`, ...).
//! - **Insert/Replace mode**: everything from entering the mode to `Esc`.
//!
//! ```text
//! history.begin(cursor);
//! history.record_insert(pos, text);   // after buf.insert(...)
//! history.record_delete(pos, text);   // after buf.delete(...)
//! history.commit(cursor);
//! ```
//!
//! Each committed transaction gets a fresh id. [`History::state_id`] names
//! the buffer state the history is currently sitting at, which lets a pane
//! decide whether undoing has walked back to the last written state.
//!
//! Undo and redo saturate: at either end of the stack they return `None`
//! and touch nothing.

use crate::buffer::Buffer;
use crate::position::{Position, Range};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit {
    Insert { pos: Position, text: String },
    Delete { pos: Position, text: String },
}

#[derive(Debug, Clone)]
struct Transaction {
    id: u64,
    edits: Vec<Edit>,
    cursor_before: Position,
    cursor_after: Position,
}

impl Transaction {
    fn undo(&self, buf: &mut Buffer) {
        for edit in self.edits.iter().rev() {
            match edit {
                Edit::Insert { pos, text } => {
                    buf.delete(Range::ordered(*pos, end_after_insert(*pos, text)));
                }
                Edit::Delete { pos, text } => buf.insert(*pos, text),
            }
        }
    }

    fn redo(&self, buf: &mut Buffer) {
        for edit in &self.edits {
            match edit {
                Edit::Insert { pos, text } => buf.insert(*pos, text),
                Edit::Delete { pos, text } => {
                    buf.delete(Range::ordered(*pos, end_after_insert(*pos, text)));
                }
            }
        }
    }
}

/// Undo/redo history for one buffer.
///
/// A new commit after an undo discards the redo tail; history does not
/// branch.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    pending: Option<Transaction>,
    next_id: u64,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction. A transaction still open is committed first.
    pub fn begin(&mut self, cursor: Position) {
        if self.pending.is_some() {
            self.commit(cursor);
        }
        self.pending = Some(Transaction {
            id: 0,
            edits: Vec::new(),
            cursor_before: cursor,
            cursor_after: cursor,
        });
    }

    /// True while a transaction is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn record_insert(&mut self, pos: Position, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(txn) = &mut self.pending {
            txn.edits.push(Edit::Insert { pos, text: text.to_string() });
        }
    }

    pub fn record_delete(&mut self, pos: Position, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(txn) = &mut self.pending {
            txn.edits.push(Edit::Delete { pos, text: text.to_string() });
        }
    }

    /// Close the open transaction. Empty transactions are dropped.
    /// Returns `true` when something was pushed onto the undo stack.
    pub fn commit(&mut self, cursor: Position) -> bool {
        let Some(mut txn) = self.pending.take() else {
            return false;
        };
        if txn.edits.is_empty() {
            return false;
        }
        self.next_id += 1;
        txn.id = self.next_id;
        txn.cursor_after = cursor;
        self.redo_stack.clear();
        self.undo_stack.push(txn);
        true
    }

    /// Revert the newest transaction; returns the cursor to restore.
    pub fn undo(&mut self, buf: &mut Buffer) -> Option<Position> {
        if let Some(txn) = self.pending.as_ref() {
            let cursor = txn.cursor_after;
            self.commit(cursor);
        }
        let txn = self.undo_stack.pop()?;
        txn.undo(buf);
        let cursor = txn.cursor_before;
        self.redo_stack.push(txn);
        Some(cursor)
    }

    /// Re-apply the newest undone transaction; returns the cursor to restore.
    pub fn redo(&mut self, buf: &mut Buffer) -> Option<Position> {
        let txn = self.redo_stack.pop()?;
        txn.redo(buf);
        let cursor = txn.cursor_before;
        self.undo_stack.push(txn);
        Some(cursor)
    }

    /// Id of the state the buffer is in: the newest applied transaction,
    /// or 0 for the initial text.
    #[must_use]
    pub fn state_id(&self) -> u64 {
        self.undo_stack.last().map_or(0, |t| t.id)
    }

    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

/// Where `text` ends when inserted at `start`.
fn end_after_insert(start: Position, text: &str) -> Position {
    let mut line = start.line;
    let mut col = start.col;
    for ch in text.chars() {
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    Position::new(line, col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pos(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    /// Insert through the history, like the pane's edit helpers do.
    fn insert(h: &mut History, buf: &mut Buffer, at: Position, text: &str) {
        buf.insert(at, text);
        h.record_insert(at, text);
    }

    fn delete(h: &mut History, buf: &mut Buffer, from: Position, to: Position) {
        let removed = buf.delete(Range::ordered(from, to));
        h.record_delete(from, &removed);
    }

    // -- end_after_insert -----------------------------------------------------

    #[test]
    fn end_after_insert_tracks_newlines() {
        assert_eq!(end_after_insert(pos(0, 0), "hello"), pos(0, 5));
        assert_eq!(end_after_insert(pos(3, 5), "hi\nthere"), pos(4, 5));
        assert_eq!(end_after_insert(pos(0, 2), "x\n"), pos(1, 0));
    }

    // -- Undo / redo ----------------------------------------------------------

    #[test]
    fn undo_restores_text_and_cursor() {
        let mut buf = Buffer::from_text("hello");
        let mut h = History::new();
        h.begin(pos(0, 4));
        insert(&mut h, &mut buf, pos(0, 5), " world");
        h.commit(pos(0, 10));

        assert_eq!(h.undo(&mut buf), Some(pos(0, 4)));
        assert_eq!(buf.contents(), "hello");
        assert_eq!(h.redo(&mut buf), Some(pos(0, 4)));
        assert_eq!(buf.contents(), "hello world");
    }

    #[test]
    fn multi_edit_transaction_undoes_as_one() {
        let mut buf = Buffer::from_text("alpha\nbeta");
        let mut h = History::new();
        h.begin(pos(0, 0));
        delete(&mut h, &mut buf, pos(0, 0), pos(1, 0));
        insert(&mut h, &mut buf, pos(0, 4), "\nalpha");
        h.commit(pos(1, 0));
        assert_eq!(buf.lines(), vec!["beta", "alpha"]);

        h.undo(&mut buf);
        assert_eq!(buf.lines(), vec!["alpha", "beta"]);
    }

    #[test]
    fn saturates_at_both_ends() {
        let mut buf = Buffer::from_text("x");
        let mut h = History::new();
        assert_eq!(h.undo(&mut buf), None);
        assert_eq!(h.redo(&mut buf), None);

        h.begin(pos(0, 0));
        delete(&mut h, &mut buf, pos(0, 0), pos(0, 1));
        h.commit(pos(0, 0));
        assert!(h.undo(&mut buf).is_some());
        assert_eq!(h.undo(&mut buf), None);
        assert!(h.redo(&mut buf).is_some());
        assert_eq!(h.redo(&mut buf), None);
        assert_eq!(buf.contents(), "");
    }

    #[test]
    fn new_commit_clears_redo() {
        let mut buf = Buffer::from_text("");
        let mut h = History::new();
        h.begin(pos(0, 0));
        insert(&mut h, &mut buf, pos(0, 0), "a");
        h.commit(pos(0, 0));
        h.undo(&mut buf);
        assert_eq!(h.redo_count(), 1);

        h.begin(pos(0, 0));
        insert(&mut h, &mut buf, pos(0, 0), "b");
        h.commit(pos(0, 0));
        assert_eq!(h.redo_count(), 0);
        assert_eq!(h.redo(&mut buf), None);
        assert_eq!(buf.contents(), "b");
    }

    #[test]
    fn empty_transaction_is_dropped() {
        let mut h = History::new();
        h.begin(pos(0, 0));
        assert!(h.is_open());
        assert!(!h.commit(pos(0, 0)));
        assert_eq!(h.undo_count(), 0);
        assert!(!h.is_open());
    }

    #[test]
    fn undo_commits_an_open_transaction() {
        let mut buf = Buffer::from_text("");
        let mut h = History::new();
        h.begin(pos(0, 0));
        insert(&mut h, &mut buf, pos(0, 0), "typed");
        assert_eq!(h.undo(&mut buf), Some(pos(0, 0)));
        assert_eq!(buf.contents(), "");
    }

    // -- State ids ------------------------------------------------------------

    #[test]
    fn state_id_walks_with_undo() {
        let mut buf = Buffer::from_text("");
        let mut h = History::new();
        assert_eq!(h.state_id(), 0);
        for ch in ["a", "b"] {
            h.begin(pos(0, 0));
            insert(&mut h, &mut buf, pos(0, 0), ch);
            h.commit(pos(0, 0));
        }
        let top = h.state_id();
        assert_ne!(top, 0);
        h.undo(&mut buf);
        assert_ne!(h.state_id(), top);
        h.undo(&mut buf);
        assert_eq!(h.state_id(), 0);
        h.redo(&mut buf);
        h.redo(&mut buf);
        assert_eq!(h.state_id(), top);
    }
}
