// SPDX-License-Identifier: MIT
//
// vimux: replay key sequences on a vim + tmux emulation and capture the
// screen they produce.
//
//   fixtures.json → Fixture → Session::feed_* → Snapshot::capture
//                                                  │
//                        stdout (JSON) ◄───────────┤
//                        ground truth diff ◄───────┘  (with --expected)
//
// Settings come from vimux.toml, then CLI flags, then the scenario's own
// `cols`/`rows`/`filename`, each layer overriding the one before.
//
// Logging goes to stderr and is off below `warn` unless VIMUX_LOG or
// RUST_LOG says otherwise, e.g. `VIMUX_LOG=session.key=trace`.

mod config;
mod conformance;
mod fixture;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vimux_editor::Snapshot;

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "vimux", version, about = "Replay vim + tmux key sequences and capture the screen")]
struct Args {
    /// Scenario fixtures: a JSON object of `{initial, keys}` entries.
    fixtures: PathBuf,

    /// Terminal width (overrides the config file).
    #[arg(long)]
    cols: Option<u16>,

    /// Terminal height (overrides the config file).
    #[arg(long)]
    rows: Option<u16>,

    /// Run only the named scenario. Repeatable.
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<String>,

    /// Ground-truth snapshots to compare against. Exits non-zero on any
    /// mismatch.
    #[arg(long, value_name = "FILE")]
    expected: Option<PathBuf>,

    /// Pretty-print the snapshot JSON.
    #[arg(long)]
    pretty: bool,

    /// Configuration file (default: ./vimux.toml when present).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

// ─── Logging ────────────────────────────────────────────────────────────────

fn init_logging() {
    let filter = EnvFilter::try_from_env("VIMUX_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("vimux: {err:#}");
            ExitCode::from(2)
        }
    }
}

/// Returns `false` when a snapshot disagrees with the ground truth.
fn run(args: &Args) -> Result<bool> {
    let mut base = config::load(args.config.as_deref())?.session_config()?;
    if let Some(cols) = args.cols {
        base.cols = cols;
    }
    if let Some(rows) = args.rows {
        base.rows = rows;
    }

    let fixtures = fixture::load(&args.fixtures)?;
    for name in &args.scenarios {
        if !fixtures.contains_key(name) {
            bail!("no scenario named `{name}` in {}", args.fixtures.display());
        }
    }

    let mut snapshots: BTreeMap<&str, Snapshot> = BTreeMap::new();
    for (name, fixture) in &fixtures {
        if !args.scenarios.is_empty() && !args.scenarios.contains(name) {
            continue;
        }
        let snapshot = fixture.run(&base).with_context(|| format!("scenario `{name}`"))?;
        info!(target: "fixture", scenario = name.as_str(), mode = snapshot.mode.as_str(), "captured");
        snapshots.insert(name, snapshot);
    }

    match &args.expected {
        Some(path) => compare(path, &snapshots),
        None => {
            print_snapshots(&snapshots, args.pretty)?;
            Ok(true)
        }
    }
}

fn print_snapshots(snapshots: &BTreeMap<&str, Snapshot>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(snapshots)
    } else {
        serde_json::to_string(snapshots)
    }
    .context("serializing snapshots")?;
    let mut out = io::stdout().lock();
    writeln!(out, "{json}").context("writing snapshots")?;
    Ok(())
}

fn compare(path: &Path, snapshots: &BTreeMap<&str, Snapshot>) -> Result<bool> {
    let truth = conformance::load(path)?;
    let mut report = conformance::Report::default();
    for (name, snapshot) in snapshots {
        let expected = truth.get(*name);
        if expected.is_none() {
            warn!(target: "fixture", scenario = *name, "no ground truth");
        }
        report.record(name, expected, snapshot)?;
    }
    println!("{report}");
    Ok(report.failures() == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_parse() {
        let args = Args::try_parse_from([
            "vimux",
            "cases.json",
            "--cols",
            "100",
            "--scenario",
            "vsplit",
            "--scenario",
            "zoomed",
            "--pretty",
        ])
        .unwrap();
        assert_eq!(args.fixtures, PathBuf::from("cases.json"));
        assert_eq!(args.cols, Some(100));
        assert_eq!(args.rows, None);
        assert_eq!(args.scenarios, ["vsplit", "zoomed"]);
        assert!(args.pretty);
    }

    #[test]
    fn fixtures_path_is_required() {
        assert!(Args::try_parse_from(["vimux"]).is_err());
    }

    #[test]
    fn end_to_end_against_ground_truth() {
        let dir = tempfile::tempdir().unwrap();
        let fixtures = dir.path().join("cases.json");
        let expected = dir.path().join("truth.json");
        let config = dir.path().join("vimux.toml");
        std::fs::write(
            &fixtures,
            r#"{
                "cmd_prompt_empty": {"initial": "text", "keys": ":"},
                "insert": {"initial": "", "keys": ["i", "hi", "Escape"]}
            }"#,
        )
        .unwrap();
        std::fs::write(
            &expected,
            r#"{
                "cmd_prompt_empty": {"status": ":", "cursor": {"row": 5, "col": 1}},
                "insert": {"buffer": ["hi"], "mode": "normal"}
            }"#,
        )
        .unwrap();
        std::fs::write(&config, "[terminal]\ncols = 40\nrows = 6\n").unwrap();

        let args = Args::try_parse_from([
            "vimux",
            fixtures.to_str().unwrap(),
            "--expected",
            expected.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .unwrap();
        assert!(run(&args).unwrap());

        std::fs::write(&expected, r#"{"insert": {"buffer": ["bye"]}}"#).unwrap();
        assert!(!run(&args).unwrap());
    }

    #[test]
    fn unknown_scenario_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fixtures = dir.path().join("cases.json");
        std::fs::write(&fixtures, "{}").unwrap();
        let args = Args::try_parse_from(["vimux", fixtures.to_str().unwrap(), "--scenario", "nope"])
        .unwrap();
        assert!(run(&args).is_err());
    }
}
