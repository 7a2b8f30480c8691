//! scorenav - replay harness for the score selection engine.
//!
//! Loads a score, runs a script of selection commands through a
//! `SelectionStore`, and prints the resulting selection as JSON.
//!
//! # Usage
//!
//! ```bash
//! scorenav --score score.json --script steps.json
//! RUST_LOG=scorenav=debug scorenav -s score.json -c steps.json --history 8
//! ```

use anyhow::{bail, Context, Result};
use scorenav::script::{load_script, run_script, SelectionReport};
use scorenav::{Score, StoreConfig};
use std::path::PathBuf;
use tracing::info;

/// Command-line options for the harness.
struct CliOptions {
    /// Score document (serde JSON form of `Score`).
    score: PathBuf,
    /// JSON array of steps to replay.
    script: PathBuf,
    /// Undo history limit; defaults to the store's own.
    history_limit: Option<usize>,
}

impl CliOptions {
    /// Parses command-line arguments.
    ///
    /// Supports:
    /// - `--score <path>` or `-s <path>`: Score to load
    /// - `--script <path>` or `-c <path>`: Steps to replay
    /// - `--history <n>`: Undo history limit
    /// - `--help` or `-h`: Print help and exit
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut score: Option<PathBuf> = None;
        let mut script: Option<PathBuf> = None;
        let mut history_limit: Option<usize> = None;
        let mut i = 1;

        while i < args.len() {
            match args[i].as_str() {
                "--score" | "-s" => {
                    i += 1;
                    let Some(path) = args.get(i) else {
                        bail!("--score requires a path argument");
                    };
                    score = Some(PathBuf::from(path));
                }
                "--script" | "-c" => {
                    i += 1;
                    let Some(path) = args.get(i) else {
                        bail!("--script requires a path argument");
                    };
                    script = Some(PathBuf::from(path));
                }
                "--history" => {
                    i += 1;
                    let Some(value) = args.get(i) else {
                        bail!("--history requires a number");
                    };
                    history_limit = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid history limit: {}", value))?,
                    );
                }
                "--help" | "-h" => {
                    eprintln!("scorenav - replay selection commands against a score");
                    eprintln!();
                    eprintln!(
                        "Usage: {} --score PATH --script PATH [OPTIONS]",
                        args.first().map(String::as_str).unwrap_or("scorenav")
                    );
                    eprintln!();
                    eprintln!("Options:");
                    eprintln!("  -s, --score PATH   Score document (JSON)");
                    eprintln!("  -c, --script PATH  Steps to replay (JSON array)");
                    eprintln!("      --history N    Undo history limit");
                    eprintln!("  -h, --help         Print this help message");
                    eprintln!();
                    eprintln!("Set RUST_LOG=scorenav=debug to trace dispatch.");
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Use --help for usage information");
                    bail!("unknown option: {}", other);
                }
            }
            i += 1;
        }

        let Some(score) = score else {
            bail!("missing --score");
        };
        let Some(script) = script else {
            bail!("missing --script");
        };
        Ok(Self {
            score,
            script,
            history_limit,
        })
    }

    fn store_config(&self) -> StoreConfig {
        let mut config = StoreConfig::default();
        if let Some(limit) = self.history_limit {
            config.history_limit = limit;
        }
        config
    }
}

/// Main entry point.
fn main() -> Result<()> {
    let cli = CliOptions::parse()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let score = Score::load_from_file(&cli.score)
        .with_context(|| format!("Failed to load score {}", cli.score.display()))?;
    let steps = load_script(&cli.script)
        .with_context(|| format!("Failed to load script {}", cli.script.display()))?;
    info!(
        staves = score.staff_count(),
        events = score.event_count(),
        steps = steps.len(),
        "replaying"
    );

    let replay = run_script(&score, &steps, cli.store_config()).context("Replay failed")?;
    info!(changes = replay.changes, "replay finished");

    let report = SelectionReport::new(&score, replay.store.selection());
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize selection")?;
    println!("{}", json);
    Ok(())
}
