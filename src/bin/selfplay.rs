//! Self-play game generation CLI.
//!
//! Plays games between random players and writes one JSON record per game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use conquest::board::Scenario;
use conquest::selfplay::{self, SelfPlayConfig};

#[derive(Debug, Parser)]
#[command(name = "selfplay", about = "Play random games and dump them as JSONL")]
struct Args {
    /// Number of games to play.
    #[arg(long, default_value_t = 10)]
    games: usize,

    /// Turns after which an undecided game is stopped.
    #[arg(long, default_value_t = 50)]
    max_turns: u64,

    /// Players per game.
    #[arg(long, default_value_t = 2)]
    players: usize,

    /// Number of parallel threads.
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Random seed, 0 for entropy.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Scenario JSON file; defaults to the five-tile example map.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Output file path (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Suppress progress and summary output.
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    let config = SelfPlayConfig {
        num_games: args.games,
        max_turns: args.max_turns,
        players: args.players,
        threads: args.threads,
        seed: args.seed,
        quiet: args.quiet,
        scenario,
    };

    let start = Instant::now();
    let games = selfplay::run_self_play(&config)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    selfplay::write_jsonl(&games, &mut out)?;

    if !args.quiet {
        let decided = games.iter().filter(|g| g.winner.is_some()).count();
        let turns: u64 = games.iter().map(|g| g.final_turn).sum();
        info!(
            games = games.len(),
            decided,
            avg_turns = turns as f64 / games.len().max(1) as f64,
            secs = start.elapsed().as_secs_f64(),
            "self-play complete"
        );
    }
    Ok(())
}
