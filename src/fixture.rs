// SPDX-License-Identifier: MIT
//
// Scenario fixtures: a JSON object mapping scenario names to
//
//   { "initial": "buffer text", "keys": "dd:q\r" }
//   { "initial": "", "keys": ["i", "hello", "Escape", "C-b", "%"] }
//
// `keys` is either raw key bytes (escape sequences and `<Name>` keys
// allowed) or an array of key tokens. `cols`, `rows` and `filename`
// override the session configuration for that one scenario.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;
use vimux_editor::{Session, SessionConfig, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Keys {
    Raw(String),
    Tokens(Vec<String>),
}

impl Default for Keys {
    fn default() -> Self {
        Self::Raw(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub initial: String,
    #[serde(default)]
    pub keys: Keys,
    #[serde(default)]
    pub cols: Option<u16>,
    #[serde(default)]
    pub rows: Option<u16>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Scenarios in name order.
pub type Fixtures = BTreeMap<String, Fixture>;

pub fn load(path: &Path) -> Result<Fixtures> {
    let content = fs::read_to_string(path).with_context(|| format!("reading fixtures {}", path.display()))?;
    parse(&content).with_context(|| format!("parsing fixtures {}", path.display()))
}

pub fn parse(json: &str) -> Result<Fixtures> {
    Ok(serde_json::from_str(json)?)
}

impl Fixture {
    /// The session configuration for this scenario.
    pub fn session_config(&self, base: &SessionConfig) -> SessionConfig {
        SessionConfig {
            cols: self.cols.unwrap_or(base.cols),
            rows: self.rows.unwrap_or(base.rows),
            filename: self.filename.clone().or_else(|| base.filename.clone()),
            ..base.clone()
        }
    }

    /// Replay the keys on a fresh session and capture the result.
    pub fn run(&self, base: &SessionConfig) -> Result<Snapshot> {
        let config = self.session_config(base);
        debug!(
            target: "fixture",
            cols = config.cols,
            rows = config.rows,
            initial_lines = self.initial.lines().count(),
            "run"
        );
        let mut session = Session::new(config, &self.initial)?;
        match &self.keys {
            Keys::Raw(keys) => session.feed_str(keys),
            Keys::Tokens(tokens) => session.feed_tokens(tokens)?,
        }
        Ok(Snapshot::capture(&session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- Decoding -----------------------------------------------------------

    #[test]
    fn keys_as_string_or_tokens() {
        let fixtures = parse(
            r#"{
                "raw": {"initial": "a", "keys": "dd"},
                "tokens": {"initial": "a", "keys": ["i", "x", "Escape"], "cols": 40}
            }"#,
        )
        .unwrap();
        assert_eq!(fixtures["raw"].keys, Keys::Raw("dd".into()));
        assert_eq!(
            fixtures["tokens"].keys,
            Keys::Tokens(vec!["i".into(), "x".into(), "Escape".into()])
        );
        assert_eq!(fixtures["tokens"].cols, Some(40));
        assert_eq!(fixtures.keys().collect::<Vec<_>>(), ["raw", "tokens"]);
    }

    #[test]
    fn missing_fields_default() {
        let fixtures = parse(r#"{"empty": {}}"#).unwrap();
        assert_eq!(fixtures["empty"], Fixture::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse(r#"{"a": {"keys": 3}}"#).is_err());
        assert!(parse("[").is_err());
    }

    // -- Running ------------------------------------------------------------

    #[test]
    fn overrides_apply_per_scenario() {
        let fixture = Fixture {
            cols: Some(40),
            filename: Some("a.txt".into()),
            ..Fixture::default()
        };
        let config = fixture.session_config(&SessionConfig::default());
        assert_eq!((config.cols, config.rows), (40, 24));
        assert_eq!(config.filename.as_deref(), Some("a.txt"));
    }

    #[test]
    fn raw_and_token_keys_agree() {
        let base = SessionConfig {
            cols: 40,
            rows: 8,
            ..SessionConfig::default()
        };
        let raw = Fixture {
            initial: "beta = 2\nalpha = 1".into(),
            keys: Keys::Raw("ddpix\x1b".into()),
            ..Fixture::default()
        };
        let tokens = Fixture {
            keys: Keys::Tokens(vec!["dd".into(), "p".into(), "i".into(), "x".into(), "Escape".into()]),
            ..raw.clone()
        };
        let a = raw.run(&base).unwrap();
        assert_eq!(a.buffer, vec!["alpha = 1", "xbeta = 2"]);
        assert_eq!(a, tokens.run(&base).unwrap());
    }

    #[test]
    fn unknown_token_is_an_error() {
        let fixture = Fixture {
            keys: Keys::Tokens(vec!["<Bogus>".into()]),
            ..Fixture::default()
        };
        assert!(fixture.run(&SessionConfig::default()).is_err());
    }

    #[test]
    fn tiny_terminal_is_an_error() {
        let fixture = Fixture {
            rows: Some(1),
            ..Fixture::default()
        };
        assert!(fixture.run(&SessionConfig::default()).is_err());
    }
}
