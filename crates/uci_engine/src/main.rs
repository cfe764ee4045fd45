use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use endgame_core::{
    parse_go_movetime, parse_setoption, rank_moves, set_position_from_uci, Engine, Position,
    SearchLimits,
};
use mcts_engine::{MctsConfig, MctsEngine};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "ENDGAME_MCTS_CONFIG";
const DEFAULT_MOVE_TIME_MS: u64 = 1000;

fn init_logging() {
    // stdout belongs to the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config() -> Result<MctsConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            let config = MctsConfig::load(Path::new(&path))
                .with_context(|| format!("loading engine config from {path}"))?;
            info!(path, "engine config loaded");
            Ok(config)
        }
        Err(_) => Ok(MctsConfig::default()),
    }
}

fn main() -> Result<()> {
    init_logging();

    let mut engine = MctsEngine::new(load_config()?);
    let mut pos = Position::startpos();
    let mut move_time = DEFAULT_MOVE_TIME_MS;

    // UCI engines communicate via stdin/stdout.
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            continue;
        };

        match command {
            "uci" => {
                writeln!(stdout, "id name {}", engine.name())?;
                writeln!(stdout, "id author {}", engine.author())?;
                writeln!(
                    stdout,
                    "option name MoveTime type spin default {DEFAULT_MOVE_TIME_MS} min 1 max 600000"
                )?;
                writeln!(stdout, "option name Seed type string default <empty>")?;
                writeln!(
                    stdout,
                    "option name Exploration type string default {}",
                    engine.config().exploration
                )?;
                writeln!(
                    stdout,
                    "option name RolloutPlies type spin default {} min 1 max 1000",
                    engine.config().rollout_max_plies
                )?;
                writeln!(stdout, "option name TablebaseFile type string default <empty>")?;
                writeln!(stdout, "uciok")?;
            }
            "isready" => writeln!(stdout, "readyok")?,
            "ucinewgame" => {
                engine.new_game();
                pos = Position::startpos();
            }
            "setoption" => match parse_setoption(args) {
                Some((name, value)) if name.eq_ignore_ascii_case("movetime") => {
                    match value.parse() {
                        Ok(ms) => move_time = ms,
                        Err(_) => warn!(value, "invalid MoveTime"),
                    }
                }
                Some((name, value)) => {
                    if !engine.set_option(&name, &value) {
                        warn!(name, value, "option rejected");
                    }
                }
                None => warn!(line, "malformed setoption"),
            },
            "position" => match set_position_from_uci(args) {
                Ok(p) => {
                    debug!(fen = %p, "position set");
                    pos = p;
                }
                Err(err) => warn!(error = %err, "position not changed"),
            },
            "go" => {
                let ms = parse_go_movetime(args).unwrap_or(move_time);
                let result = engine.search(&pos, SearchLimits::millis(ms));

                if let Some(stats) = engine.last_stats() {
                    writeln!(stdout, "info string {}", stats.to_json()?)?;
                }
                if let Some(tb) = engine.tablebase() {
                    let ranking = rank_moves(&pos, tb);
                    let verdict = match result.best_move {
                        Some(mv) if ranking.best_outcome.is_some() => {
                            if ranking.is_optimal(mv) { "optimal" } else { "suboptimal" }
                        }
                        _ => "unknown",
                    };
                    writeln!(
                        stdout,
                        "info string tb {verdict} {}",
                        serde_json::to_string(&ranking)?
                    )?;
                }

                match result.best_move {
                    Some(mv) => writeln!(stdout, "bestmove {}", pos.move_to_uci(mv))?,
                    None => writeln!(stdout, "bestmove 0000")?,
                }
            }
            "quit" => break,
            _ => debug!(command, "ignoring unknown command"),
        }
        stdout.flush()?;
    }

    Ok(())
}
