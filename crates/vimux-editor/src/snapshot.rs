//! Snapshots: what a session looks like after a key sequence.
//!
//! A [`Snapshot`] is the record compared against captured ground truth:
//! every screen row, the rows of the active pane, its status row and the
//! terminal cursor. Rows are stored with trailing blanks removed, since a
//! capture of a real terminal does not keep them either.
//!
//! All fields default when missing, so a ground-truth file may carry only
//! the fields it cares about.

use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Terminal cursor, 0-indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPos {
    pub row: u16,
    pub col: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Every row of the terminal.
    pub screen: Vec<String>,
    /// Rows of the active pane, status row included.
    pub pane_lines: Vec<String>,
    /// The active pane's status row.
    pub status: String,
    pub cursor: CursorPos,
    /// Mode of the active pane (`normal`, `insert`, `visual_line`, ...).
    pub mode: String,
    /// Buffer lines of the active pane.
    pub buffer: Vec<String>,
}

impl Snapshot {
    /// Render `session` and record the result.
    #[must_use]
    pub fn capture(session: &Session) -> Self {
        let frame = session.render();
        let screen: Vec<String> = frame.grid.lines().iter().map(|r| r.trim_end().to_string()).collect();

        let active = session.active_pane();
        let pane_lines = if session.has_exited() {
            Vec::new()
        } else {
            session
                .pane_rects()
                .into_iter()
                .find(|(id, _)| *id == session.active_id())
                .map(|(_, rect)| {
                    (rect.y..rect.y + rect.h)
                        .map(|y| {
                            let row = frame.grid.row(y).unwrap_or_default();
                            let start = usize::from(rect.x);
                            let end = (start + usize::from(rect.w)).min(row.len());
                            row[start.min(end)..end]
                                .iter()
                                .filter_map(|c| c.ch)
                                .collect::<String>()
                                .trim_end()
                                .to_string()
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            screen,
            pane_lines,
            status: session.status_text().trim_end().to_string(),
            cursor: CursorPos {
                row: frame.cursor.1,
                col: frame.cursor.0,
            },
            mode: active.mode().name().to_string(),
            buffer: active.buffer().lines(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use pretty_assertions::assert_eq;

    fn capture(text: &str, keys: &str) -> Snapshot {
        let config = SessionConfig {
            cols: 40,
            rows: 6,
            ..SessionConfig::default()
        };
        let mut session = Session::new(config, text).expect("valid size");
        session.feed_str(keys);
        Snapshot::capture(&session)
    }

    #[test]
    fn captures_screen_status_and_cursor() {
        let snap = capture("beta = 2\nalpha = 1", "ddp");
        assert_eq!(snap.buffer, vec!["alpha = 1", "beta = 2"]);
        assert_eq!(&snap.screen[..3], ["alpha = 1", "beta = 2", "~"]);
        assert_eq!(snap.cursor, CursorPos { row: 1, col: 0 });
        assert_eq!(snap.mode, "normal");
        assert!(snap.status.starts_with("[No Name] [+]"));
        assert!(snap.status.ends_with("All"));
    }

    #[test]
    fn empty_command_prompt() {
        let snap = capture("text", ":");
        assert_eq!(snap.status, ":");
        assert_eq!(snap.cursor, CursorPos { row: 5, col: 1 });
        assert_eq!(snap.mode, "command_line");
    }

    #[test]
    fn pane_lines_cover_active_pane_only() {
        let snap = capture("left side", "<C-b>%ix<Esc>");
        assert_eq!(snap.pane_lines.len(), 6);
        assert_eq!(snap.pane_lines[0], "x");
        assert!(snap.screen[0].starts_with("left side"));
    }

    #[test]
    fn same_keys_same_snapshot() {
        let keys = "wcwvim<Esc>/a\r:set nu rnu\r<C-b>\"jkdd<C-b>z";
        assert_eq!(capture("a b\nc a\nd", keys), capture("a b\nc a\nd", keys));
    }

    #[test]
    fn partial_ground_truth_deserializes() {
        let snap: Snapshot = serde_json::from_str(r#"{"status": ":", "cursor": {"row": 5, "col": 1}}"#)
            .expect("valid json");
        assert_eq!(snap.status, ":");
        assert!(snap.screen.is_empty());
    }
}
