// SPDX-License-Identifier: MIT
//
// vimux.toml: terminal size, editor options and the prefix key.
//
//   [terminal]
//   cols = 80
//   rows = 24
//
//   [editor]
//   tab_width = 8
//   number = false
//   relativenumber = false
//   numberwidth = 4
//   filename = "notes.txt"      # omitted: [No Name]
//
//   [multiplexer]
//   prefix = "C-b"
//
// Every key is optional. CLI flags override the file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;
use vimux_editor::SessionConfig;
use vimux_editor::options::Options;
use vimux_term::input::{KeyEvent, parse_token};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_PATH: &str = "vimux.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub terminal: TerminalConfig,
    pub editor: EditorConfig,
    pub multiplexer: MultiplexerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub cols: u16,
    pub rows: u16,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub tab_width: usize,
    pub number: bool,
    pub relativenumber: bool,
    pub numberwidth: usize,
    pub filename: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let options = Options::default();
        Self {
            tab_width: options.tabstop,
            number: options.number,
            relativenumber: options.relativenumber,
            numberwidth: options.numberwidth,
            filename: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MultiplexerConfig {
    /// Key name as accepted in fixtures: `C-b`, `C-a`, `<C-Space>`...
    pub prefix: String,
}

impl Default for MultiplexerConfig {
    fn default() -> Self {
        Self { prefix: "C-b".to_string() }
    }
}

/// Load the configuration.
///
/// An explicit `path` must exist. Without one, [`DEFAULT_PATH`] is read
/// when present and defaults are used otherwise.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_PATH);
            if !default.exists() {
                debug!(target: "config", "no vimux.toml, using defaults");
                return Ok(Config::default());
            }
            default
        }
    };

    let content = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
    debug!(target: "config", path = %path.display(), ?config, "loaded");
    Ok(config)
}

impl Config {
    /// Options every pane starts with.
    pub fn options(&self) -> Options {
        Options {
            number: self.editor.number,
            relativenumber: self.editor.relativenumber,
            numberwidth: self.editor.numberwidth.clamp(1, 20),
            tabstop: self.editor.tab_width.max(1),
            ..Options::default()
        }
    }

    /// The prefix key, which must name exactly one key.
    pub fn prefix_key(&self) -> Result<KeyEvent> {
        let token = self.multiplexer.prefix.trim();
        let keys = parse_token(token).with_context(|| format!("multiplexer prefix `{token}`"))?;
        match keys.as_slice() {
            [key] => Ok(*key),
            _ => bail!("multiplexer prefix `{token}` must be a single key"),
        }
    }

    pub fn session_config(&self) -> Result<SessionConfig> {
        Ok(SessionConfig {
            cols: self.terminal.cols,
            rows: self.terminal.rows,
            options: self.options(),
            filename: self.editor.filename.clone(),
            prefix: self.prefix_key()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        fs::write(tmp.path(), text).unwrap();
        tmp
    }

    // -- Loading ------------------------------------------------------------

    #[test]
    fn defaults_match_session_defaults() {
        let config = Config::default().session_config().unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let missing = PathBuf::from("__no_such_vimux_config__.toml");
        assert!(load(Some(&missing)).is_err());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = write_config("[terminal]\ncols = 120\n\n[editor]\nnumber = true\n");
        let config = load(Some(tmp.path())).unwrap();
        assert_eq!(config.terminal, TerminalConfig { cols: 120, rows: 24 });
        assert!(config.editor.number);
        assert!(!config.editor.relativenumber);
        assert_eq!(config.editor.tab_width, 8);
        assert_eq!(config.multiplexer.prefix, "C-b");
    }

    #[test]
    fn full_file() {
        let tmp = write_config(
            "[terminal]\ncols = 100\nrows = 30\n\n\
             [editor]\ntab_width = 4\nnumber = true\nrelativenumber = true\nnumberwidth = 6\nfilename = \"notes.txt\"\n\n\
             [multiplexer]\nprefix = \"C-a\"\n",
        );
        let session = load(Some(tmp.path())).unwrap().session_config().unwrap();
        assert_eq!(session.cols, 100);
        assert_eq!(session.rows, 30);
        assert_eq!(session.options.tabstop, 4);
        assert_eq!(session.options.numberwidth, 6);
        assert!(session.options.number && session.options.relativenumber);
        assert_eq!(session.filename.as_deref(), Some("notes.txt"));
        assert_eq!(session.prefix, KeyEvent::ctrl('a'));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let tmp = write_config("[terminal\ncols = ");
        let err = load(Some(tmp.path())).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }

    // -- Prefix -------------------------------------------------------------

    #[test]
    fn prefix_accepts_bracketed_names() {
        let mut config = Config::default();
        config.multiplexer.prefix = "<C-a>".to_string();
        assert_eq!(config.prefix_key().unwrap(), KeyEvent::ctrl('a'));
    }

    #[test]
    fn prefix_must_be_one_key() {
        let mut config = Config::default();
        config.multiplexer.prefix = "ab".to_string();
        assert!(config.prefix_key().is_err());
        config.multiplexer.prefix = String::new();
        assert!(config.prefix_key().is_err());
    }
}
