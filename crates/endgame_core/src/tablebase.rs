//! Exact-outcome oracle interface for small endgames.
//!
//! The search treats a tablebase as optional, read-only information: a
//! missing oracle or a lookup miss simply means "no information". Nothing in
//! here is allowed to fail a search.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::position::{PlacementKey, Position, PositionError};
use crate::types::{Color, Move};

/// Win/draw/loss from the perspective of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wdl {
    Win,
    Draw,
    Loss,
}

impl Wdl {
    /// 1.0 / 0.0 / -1.0
    pub fn score(self) -> f64 {
        match self {
            Wdl::Win => 1.0,
            Wdl::Draw => 0.0,
            Wdl::Loss => -1.0,
        }
    }

    /// The same result seen by the other player.
    pub fn flip(self) -> Wdl {
        match self {
            Wdl::Win => Wdl::Loss,
            Wdl::Draw => Wdl::Draw,
            Wdl::Loss => Wdl::Win,
        }
    }

    fn rank(self) -> u8 {
        match self {
            Wdl::Win => 2,
            Wdl::Draw => 1,
            Wdl::Loss => 0,
        }
    }
}

/// A read-only endgame oracle.
pub trait Tablebase: Send + Sync {
    /// Exact outcome for the side to move, or None when the position is not covered.
    fn probe_outcome(&self, pos: &Position) -> Option<Wdl>;

    /// Distance (in plies) to the outcome, when known. Used for diagnostics
    /// and move ranking only; the search never reads it.
    fn probe_distance(&self, _pos: &Position) -> Option<i32> {
        None
    }
}

#[derive(Debug, Error)]
pub enum TablebaseError {
    #[error("failed to read tablebase file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tablebase JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad tablebase entry: {0}")]
    Position(#[from] PositionError),
}

/// One line of a tablebase dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablebaseRecord {
    pub fen: String,
    pub wdl: Wdl,
    #[serde(default)]
    pub distance: Option<i32>,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    wdl: Wdl,
    distance: Option<i32>,
}

/// An oracle backed by a hash map, keyed by piece placement and side to move.
///
/// Useful for solved positions exported from a real tablebase and for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryTablebase {
    entries: HashMap<(PlacementKey, bool), Entry>,
}

impl MemoryTablebase {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(pos: &Position) -> (PlacementKey, bool) {
        (pos.placement_key(), pos.side_to_move() == Color::White)
    }

    pub fn insert(&mut self, pos: &Position, wdl: Wdl, distance: Option<i32>) {
        self.entries.insert(Self::key(pos), Entry { wdl, distance });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_records(records: &[TablebaseRecord]) -> Result<Self, TablebaseError> {
        let mut tb = Self::new();
        for record in records {
            let pos = Position::from_fen(&record.fen)?;
            tb.insert(&pos, record.wdl, record.distance);
        }
        Ok(tb)
    }

    /// Parses a JSON array of [`TablebaseRecord`]s.
    pub fn from_json_str(json: &str) -> Result<Self, TablebaseError> {
        let records: Vec<TablebaseRecord> = serde_json::from_str(json)?;
        Self::from_records(&records)
    }

    pub fn load(path: &Path) -> Result<Self, TablebaseError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TablebaseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tb = Self::from_json_str(&contents)?;
        debug!(path = %path.display(), entries = tb.len(), "loaded tablebase");
        Ok(tb)
    }
}

impl Tablebase for MemoryTablebase {
    fn probe_outcome(&self, pos: &Position) -> Option<Wdl> {
        self.entries.get(&Self::key(pos)).map(|e| e.wdl)
    }

    fn probe_distance(&self, pos: &Position) -> Option<i32> {
        self.entries.get(&Self::key(pos)).and_then(|e| e.distance)
    }
}

// =============================================================================
// Move ranking
// =============================================================================

/// Oracle verdict for a single root move, from the mover's perspective.
#[derive(Debug, Clone, Serialize)]
pub struct MoveVerdict {
    #[serde(skip)]
    pub mv: Move,
    pub uci: String,
    pub outcome: Option<Wdl>,
    pub distance: Option<i32>,
}

/// Every legal move classified by the oracle, plus the optimal subset.
#[derive(Debug, Clone, Serialize)]
pub struct TablebaseRanking {
    pub moves: Vec<MoveVerdict>,
    pub best_outcome: Option<Wdl>,
    #[serde(skip)]
    pub best_moves: Vec<Move>,
}

impl TablebaseRanking {
    pub fn is_optimal(&self, mv: Move) -> bool {
        self.best_moves.contains(&mv)
    }
}

/// Lower is better. Wins should be converted quickly, losses dragged out,
/// and draws that are already settled (distance 0) preferred. A loss of
/// unknown length counts as the longest one.
fn distance_key(outcome: Wdl, distance: Option<i32>) -> i64 {
    const UNKNOWN: i64 = 9_999;
    match (outcome, distance) {
        (Wdl::Win, Some(d)) => i64::from(d.abs()),
        (Wdl::Loss, Some(d)) => -i64::from(d.abs()),
        (Wdl::Draw, Some(d)) => i64::from(d.abs()),
        (Wdl::Loss, None) => -UNKNOWN,
        (_, None) => UNKNOWN,
    }
}

/// Classifies every legal move of `pos` with the oracle.
pub fn rank_moves(pos: &Position, tb: &dyn Tablebase) -> TablebaseRanking {
    let moves: Vec<MoveVerdict> = pos
        .legal_moves()
        .into_iter()
        .map(|mv| {
            let child = pos.apply(mv);
            MoveVerdict {
                mv,
                uci: pos.move_to_uci(mv),
                outcome: tb.probe_outcome(&child).map(Wdl::flip),
                distance: tb.probe_distance(&child),
            }
        })
        .collect();

    let best_outcome = moves
        .iter()
        .filter_map(|v| v.outcome)
        .max_by_key(|wdl| wdl.rank());

    let best_moves = match best_outcome {
        Some(best) => {
            let candidates: Vec<&MoveVerdict> =
                moves.iter().filter(|v| v.outcome == Some(best)).collect();
            let best_key = candidates
                .iter()
                .map(|v| distance_key(best, v.distance))
                .min()
                .unwrap_or(0);
            candidates
                .into_iter()
                .filter(|v| distance_key(best, v.distance) == best_key)
                .map(|v| v.mv)
                .collect()
        }
        None => Vec::new(),
    };

    TablebaseRanking {
        moves,
        best_outcome,
        best_moves,
    }
}

#[cfg(test)]
#[path = "tablebase_tests.rs"]
mod tablebase_tests;
