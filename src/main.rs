//! Conquest -- a turn-resolution engine for simultaneous-order territory games.
//!
//! This binary reads one JSON message per line from stdin and writes outgoing
//! messages as JSON lines to stdout. Logs go to stderr.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use conquest::board::Scenario;
use conquest::engine::{JsonLinesOutbox, Lobby};
use conquest::protocol::parse_envelope;

#[derive(Debug, Parser)]
#[command(name = "conquest", version, about = "Turn-resolution engine speaking JSON lines")]
struct Args {
    /// Name announced when registering with the backend.
    #[arg(long, default_value = "Conquest")]
    name: String,

    /// Scenario JSON file; defaults to the five-tile example map.
    #[arg(long)]
    scenario: Option<PathBuf>,
}

/// Runs the main message loop, reading messages from stdin and writing
/// responses to stdout.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let scenario = match &args.scenario {
        Some(path) => match Scenario::load(path) {
            Ok(s) => s,
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot load scenario");
                return ExitCode::FAILURE;
            }
        },
        None => Scenario::default(),
    };

    let outbox = Arc::new(JsonLinesOutbox::new(io::stdout()));
    let lobby = Lobby::new(args.name, scenario, outbox);
    info!(name = lobby.name(), "engine ready, reading stdin");

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let envelope = match parse_envelope(&line) {
            Ok(env) => env,
            Err(e) => {
                warn!(error = %e, "dropping unreadable message");
                continue;
            }
        };

        if let Err(e) = lobby.route(envelope) {
            warn!(error = %e, "message not handled");
        }
    }

    ExitCode::SUCCESS
}
