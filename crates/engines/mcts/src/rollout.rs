//! Simulation: heuristic rollouts and outcome evaluation.

use std::collections::HashSet;

use endgame_core::{Color, Move, PlacementKey, Position, Tablebase, Wdl};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::MctsConfig;
use crate::heuristics::{rollout_move_score, static_eval};

/// Why a position ended the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FiftyMoves,
}

/// Result of one simulation, resolved once and converted to a root-relative
/// value in a single place ([`Outcome::root_value`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Static evaluation, already root-relative.
    Heuristic(f64),
    /// Exact tablebase result for `side_to_move`.
    Oracle(Wdl, Color),
    /// The game ended with `side_to_move` to play.
    Terminal(TerminalKind, Color),
}

impl Outcome {
    pub fn root_value(&self, root_side: Color) -> f64 {
        match *self {
            Outcome::Heuristic(v) => v,
            Outcome::Oracle(wdl, side_to_move) => {
                if side_to_move == root_side {
                    wdl.score()
                } else {
                    -wdl.score()
                }
            }
            Outcome::Terminal(TerminalKind::Checkmate, mated) => {
                if mated == root_side {
                    -1.0
                } else {
                    1.0
                }
            }
            Outcome::Terminal(_, _) => 0.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Heuristic(_) => "heuristic",
            Outcome::Oracle(Wdl::Win, _) => "oracle-win",
            Outcome::Oracle(Wdl::Draw, _) => "oracle-draw",
            Outcome::Oracle(Wdl::Loss, _) => "oracle-loss",
            Outcome::Terminal(TerminalKind::Checkmate, _) => "checkmate",
            Outcome::Terminal(TerminalKind::Stalemate, _) => "stalemate",
            Outcome::Terminal(TerminalKind::InsufficientMaterial, _) => "insufficient-material",
            Outcome::Terminal(TerminalKind::FiftyMoves, _) => "fifty-moves",
        }
    }
}

pub fn terminal_kind(pos: &Position) -> Option<TerminalKind> {
    if !pos.has_legal_moves() {
        return Some(if pos.is_check() {
            TerminalKind::Checkmate
        } else {
            TerminalKind::Stalemate
        });
    }
    if pos.is_insufficient_material() {
        return Some(TerminalKind::InsufficientMaterial);
    }
    if pos.is_fifty_move_draw() {
        return Some(TerminalKind::FiftyMoves);
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rollout {
    pub outcome: Outcome,
    pub plies: u32,
}

/// Plays a bounded heuristic continuation from `start`.
///
/// Mating moves are played at once; otherwise a move is drawn uniformly
/// from those scoring within `rollout_tolerance` of the best. The oracle,
/// when present, is consulted before the first move and after every move.
pub fn rollout(
    start: &Position,
    config: &MctsConfig,
    tablebase: Option<&dyn Tablebase>,
    root_side: Color,
    rng: &mut StdRng,
) -> Rollout {
    let mut current = start.clone();
    let mut seen = HashSet::new();
    seen.insert(current.placement_key());
    let mut plies = 0;

    loop {
        if let Some(kind) = terminal_kind(&current) {
            let side = current.side_to_move();
            return Rollout {
                outcome: Outcome::Terminal(kind, side),
                plies,
            };
        }
        if let Some(wdl) = tablebase.and_then(|tb| tb.probe_outcome(&current)) {
            let side = current.side_to_move();
            return Rollout {
                outcome: Outcome::Oracle(wdl, side),
                plies,
            };
        }
        if plies >= config.rollout_max_plies {
            break;
        }

        let mut children: Vec<(Move, Position)> = current
            .legal_moves()
            .into_iter()
            .map(|mv| (mv, current.apply(mv)))
            .collect();

        let next = match children.iter().position(|(_, child)| child.is_checkmate()) {
            Some(i) => i,
            None => pick_rollout_move(&current, &children, &seen, config, rng),
        };

        // Not terminal, so there is at least one child.
        current = children.swap_remove(next).1;
        seen.insert(current.placement_key());
        plies += 1;
    }

    Rollout {
        outcome: Outcome::Heuristic(static_eval(&current, root_side, config)),
        plies,
    }
}

fn pick_rollout_move(
    pos: &Position,
    children: &[(Move, Position)],
    seen: &HashSet<PlacementKey>,
    config: &MctsConfig,
    rng: &mut StdRng,
) -> usize {
    let scores: Vec<f64> = children
        .iter()
        .map(|(mv, child)| rollout_move_score(pos, *mv, child, seen))
        .collect();
    let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let candidates: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s >= best - config.rollout_tolerance)
        .map(|(i, _)| i)
        .collect();

    candidates.choose(rng).copied().unwrap_or(0)
}

#[cfg(test)]
#[path = "rollout_tests.rs"]
mod rollout_tests;
