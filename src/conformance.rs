// SPDX-License-Identifier: MIT
//
// Ground-truth comparison. The expected file maps scenario names to
// snapshot objects; only the fields an expected object carries are
// compared, so a capture may record just `status` and `cursor`.
//
// Differences are reported by path: `cursor.col`, `screen[3]`,
// `pane_lines.len`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use vimux_editor::Snapshot;

pub type GroundTruth = BTreeMap<String, Value>;

pub fn load(path: &Path) -> Result<GroundTruth> {
    let content = fs::read_to_string(path).with_context(|| format!("reading ground truth {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing ground truth {}", path.display()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub path: String,
    pub expected: Value,
    pub actual: Value,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, got {}", self.path, self.expected, self.actual)
    }
}

/// Every difference between `expected` and `actual`.
pub fn compare(expected: &Value, actual: &Snapshot) -> Result<Vec<Mismatch>> {
    let actual = serde_json::to_value(actual).context("serializing snapshot")?;
    let mut out = Vec::new();
    diff("", expected, &actual, &mut out);
    Ok(out)
}

fn diff(path: &str, expected: &Value, actual: &Value, out: &mut Vec<Mismatch>) {
    match (expected, actual) {
        (Value::Object(want), Value::Object(got)) => {
            for (key, value) in want {
                let child = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                diff(&child, value, got.get(key).unwrap_or(&Value::Null), out);
            }
        }
        (Value::Array(want), Value::Array(got)) => {
            if want.len() != got.len() {
                out.push(Mismatch {
                    path: format!("{path}.len"),
                    expected: want.len().into(),
                    actual: got.len().into(),
                });
            }
            for (i, value) in want.iter().enumerate() {
                diff(&format!("{path}[{i}]"), value, got.get(i).unwrap_or(&Value::Null), out);
            }
        }
        _ if expected == actual => {}
        _ => out.push(Mismatch {
            path: path.to_string(),
            expected: expected.clone(),
            actual: actual.clone(),
        }),
    }
}

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(Vec<Mismatch>),
    /// No ground truth recorded for the scenario.
    Missing,
}

#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: BTreeMap<String, Outcome>,
}

impl Report {
    pub fn record(&mut self, name: &str, expected: Option<&Value>, actual: &Snapshot) -> Result<()> {
        let outcome = match expected {
            None => Outcome::Missing,
            Some(expected) => {
                let mismatches = compare(expected, actual)?;
                if mismatches.is_empty() { Outcome::Pass } else { Outcome::Fail(mismatches) }
            }
        };
        self.outcomes.insert(name.to_string(), outcome);
        Ok(())
    }

    pub fn failures(&self) -> usize {
        self.outcomes.values().filter(|o| matches!(o, Outcome::Fail(_))).count()
    }

    fn count(&self, want: &Outcome) -> usize {
        self.outcomes.values().filter(|o| *o == want).count()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, outcome) in &self.outcomes {
            match outcome {
                Outcome::Pass => writeln!(f, "ok       {name}")?,
                Outcome::Missing => writeln!(f, "skipped  {name} (no ground truth)")?,
                Outcome::Fail(mismatches) => {
                    writeln!(f, "FAILED   {name}")?;
                    for m in mismatches {
                        writeln!(f, "    {m}")?;
                    }
                }
            }
        }
        write!(
            f,
            "{} passed, {} failed, {} skipped",
            self.count(&Outcome::Pass),
            self.failures(),
            self.count(&Outcome::Missing)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use vimux_editor::snapshot::CursorPos;

    fn snapshot() -> Snapshot {
        Snapshot {
            screen: vec!["hello".into(), "~".into()],
            status: "[No Name]".into(),
            cursor: CursorPos { row: 0, col: 4 },
            mode: "normal".into(),
            ..Snapshot::default()
        }
    }

    // -- Diffing ------------------------------------------------------------

    #[test]
    fn only_present_fields_are_compared() {
        let expected = json!({"status": "[No Name]", "cursor": {"row": 0, "col": 4}});
        assert!(compare(&expected, &snapshot()).unwrap().is_empty());
    }

    #[test]
    fn mismatches_are_reported_by_path() {
        let expected = json!({"cursor": {"row": 0, "col": 2}, "screen": ["hello", "world", "~"]});
        let paths: Vec<String> = compare(&expected, &snapshot())
            .unwrap()
            .into_iter()
            .map(|m| m.path)
            .collect();
        assert_eq!(paths, ["cursor.col", "screen.len", "screen[1]", "screen[2]"]);
    }

    #[test]
    fn unknown_field_compares_against_null() {
        let mismatches = compare(&json!({"bogus": 1}), &snapshot()).unwrap();
        assert_eq!(mismatches[0].actual, Value::Null);
        assert_eq!(mismatches[0].to_string(), "bogus: expected 1, got null");
    }

    // -- Report -------------------------------------------------------------

    #[test]
    fn report_counts_outcomes() {
        let mut report = Report::default();
        let snap = snapshot();
        report.record("a", Some(&json!({"mode": "normal"})), &snap).unwrap();
        report.record("b", Some(&json!({"mode": "insert"})), &snap).unwrap();
        report.record("c", None, &snap).unwrap();
        assert_eq!(report.failures(), 1);

        let text = report.to_string();
        assert!(text.contains("ok       a"));
        assert!(text.contains("FAILED   b\n    mode: expected \"insert\", got \"normal\""));
        assert!(text.ends_with("1 passed, 1 failed, 1 skipped"));
    }
}
