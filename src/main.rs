//! Replay runner (default binary).
//!
//! ```text
//! tetris-sim [--summary] <replay.json>   run a replay file, print the final observation
//! tetris-sim [--summary] -               read line-delimited steps from stdin,
//!                                        print one observation per applied step
//! ```
//!
//! Logging goes to stderr; set `RUST_LOG=debug` for per-step detail.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};

use tetris_sim::adapter::{parse_step, Observation, ReplayFile};
use tetris_sim::core::GameState;
use tetris_sim::engine::{verify, Session};

const USAGE: &str = "usage: tetris-sim [--summary] <replay.json | ->";

struct Args {
    source: String,
    summary: bool,
}

fn parse_args() -> Result<Args> {
    let mut source = None;
    let mut summary = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--summary" => summary = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            _ if source.is_none() => source = Some(arg),
            _ => bail!("unexpected argument {}\n{}", arg, USAGE),
        }
    }
    let Some(source) = source else {
        bail!("{}", USAGE);
    };
    Ok(Args { source, summary })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    if args.source == "-" {
        run_stream(args.summary)
    } else {
        run_file(&args.source, args.summary)
    }
}

fn run_file(path: &str, summary: bool) -> Result<()> {
    let file = ReplayFile::load(path)?;
    let session = file.play();
    log::info!(
        "{}: {} of {} steps applied",
        path,
        session.applied_steps().len(),
        file.steps.len()
    );
    if !verify(&session) {
        bail!("replay of {} is not reproducible", path);
    }
    print_state(session.state(), summary)
}

fn run_stream(summary: bool) -> Result<()> {
    let mut session = Session::default();
    let stdin = io::stdin();
    for (index, line) in stdin.lock().lines().enumerate() {
        let line = line.context("failed to read stdin")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step = parse_step(trimmed).with_context(|| format!("line {}", index + 1))?;
        let name = step.name();
        if !session.apply(step) {
            log::warn!("line {}: {} not applicable", index + 1, name);
            continue;
        }
        for event in session.drain_events() {
            log::debug!("event {}", event.name());
        }
        if !summary {
            print_state(session.state(), false)?;
        }
    }
    if summary {
        print_state(session.state(), true)?;
    }
    Ok(())
}

fn print_state(state: &GameState, summary: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if summary {
        let stats = state.stats();
        writeln!(
            out,
            "status={} pieces={} lines={} holds={} retries={} pps={:.2}",
            state.status_kind().as_str(),
            stats.pieces_placed,
            stats.lines_cleared,
            stats.holds,
            stats.retries,
            stats.pieces_per_second()
        )?;
    } else {
        writeln!(out, "{}", Observation::from_state(state).to_json_line()?)?;
    }
    Ok(())
}
