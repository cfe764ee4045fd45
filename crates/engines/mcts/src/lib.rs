//! Endgame MCTS Engine
//!
//! Time-bounded Monte Carlo Tree Search tuned for converting won endgames:
//! - Immediate-mate detection before and during the search
//! - Heuristic move ordering (checks, captures, king and rook approach)
//! - Heuristic rollouts with cycle avoidance and a static endgame fallback
//! - Optional tablebase oracle for priors and rollout short-circuits

pub mod config;
pub mod expand;
pub mod heuristics;
pub mod rollout;
pub mod search;
pub mod select;
pub mod stats;
pub mod trace;
pub mod tree;

use std::path::Path;
use std::sync::Arc;

use endgame_core::{Engine, MemoryTablebase, Position, SearchLimits, SearchResult, Tablebase};
use tracing::{info, warn};

pub use config::{ConfigError, MctsConfig};
pub use rollout::{Outcome, TerminalKind};
pub use search::{search, MctsSearch, SearchOptions, SearchOutcome};
pub use stats::{ChildStats, SearchStats};
pub use trace::{IterationTrace, SearchObserver, TraceCollector};

#[cfg(test)]
mod lib_tests;

/// Endgame engine driving [`search`] behind the [`Engine`] trait.
///
/// Each call builds a fresh tree; nothing is reused between moves.
#[derive(Clone, Default)]
pub struct MctsEngine {
    config: MctsConfig,
    seed: Option<u64>,
    tablebase: Option<Arc<dyn Tablebase>>,
    last_stats: Option<SearchStats>,
}

impl MctsEngine {
    pub fn new(config: MctsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tablebase(mut self, tablebase: Arc<dyn Tablebase>) -> Self {
        self.tablebase = Some(tablebase);
        self
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn has_tablebase(&self) -> bool {
        self.tablebase.is_some()
    }

    pub fn tablebase(&self) -> Option<&dyn Tablebase> {
        self.tablebase.as_deref()
    }

    /// Statistics of the most recent search, if any.
    pub fn last_stats(&self) -> Option<&SearchStats> {
        self.last_stats.as_ref()
    }

    fn load_tablebase(&mut self, path: &str) -> bool {
        match MemoryTablebase::load(Path::new(path)) {
            Ok(tb) => {
                info!(path, entries = tb.len(), "tablebase loaded");
                self.tablebase = Some(Arc::new(tb));
                true
            }
            Err(err) => {
                warn!(path, error = %err, "tablebase not loaded, continuing without one");
                false
            }
        }
    }
}

impl Engine for MctsEngine {
    fn search(&mut self, pos: &Position, limits: SearchLimits) -> SearchResult {
        let options = SearchOptions {
            config: self.config.clone(),
            seed: self.seed,
            tablebase: self.tablebase.as_deref(),
            observer: None,
        };
        let outcome = search(pos, limits.move_time, options);
        let stats = outcome.stats;

        let value = if stats.mate_found {
            1.0
        } else {
            stats.best_mean.unwrap_or(0.0).clamp(-1.0, 1.0)
        };
        let result = SearchResult {
            best_move: outcome.best_move,
            value,
            iterations: stats.iterations,
            nodes: stats.nodes as u64,
            mate_found: stats.mate_found,
        };
        self.last_stats = Some(stats);
        result
    }

    fn name(&self) -> &str {
        "Endgame MCTS v0.1"
    }

    fn new_game(&mut self) {
        self.last_stats = None;
    }

    fn set_option(&mut self, name: &str, value: &str) -> bool {
        match name.to_ascii_lowercase().as_str() {
            "seed" => match value.parse() {
                Ok(seed) => {
                    self.seed = Some(seed);
                    true
                }
                Err(_) => false,
            },
            "exploration" => match value.parse::<f64>() {
                Ok(c) if c.is_finite() && c >= 0.0 => {
                    self.config.exploration = c;
                    true
                }
                _ => false,
            },
            "rolloutplies" => match value.parse() {
                Ok(plies) => {
                    self.config.rollout_max_plies = plies;
                    true
                }
                Err(_) => false,
            },
            "tablebasefile" | "tablebase file" => self.load_tablebase(value),
            _ => false,
        }
    }
}
