//! Move-ordering and evaluation heuristics for endgames.
//!
//! Scores are plain `f64`s from the point of view of the side making the
//! move. They only order moves; they are never mixed into tree values.

use std::collections::HashSet;

use cozy_chess::get_king_moves;
use endgame_core::{
    edge_distance, piece_value, square_distance, Color, Move, PieceKind, PlacementKey, Position,
    Square,
};

use crate::config::MctsConfig;

pub const CHECK_BONUS: f64 = 100.0;
pub const HANGING_PENALTY: f64 = 200.0;
pub const CAPTURE_BONUS: f64 = 30.0;
pub const WINNING_CAPTURE_BONUS: f64 = 50.0;
pub const KING_APPROACH_BONUS: f64 = 40.0;
pub const KING_NEAR_BONUS: f64 = 30.0;
pub const KING_MID_BONUS: f64 = 15.0;
pub const KING_BOX_BONUS: f64 = 5.0;
pub const HEAVY_APPROACH_BONUS: f64 = 15.0;
pub const PROMOTION_BONUS: f64 = 200.0;
pub const REPETITION_PENALTY: f64 = -1000.0;
pub const DRAWISH_PENALTY: f64 = -5000.0;

/// True when the piece on `sq` is attacked and either undefended or
/// attacked by a strictly cheaper piece. Kings are never hanging.
pub fn is_hanging(pos: &Position, sq: Square) -> bool {
    let piece = match pos.piece_at(sq) {
        Some(p) if p.kind != PieceKind::King => p,
        _ => return false,
    };

    let attackers = pos.attackers(!piece.color, sq);
    if attackers.is_empty() {
        return false;
    }
    if pos.attackers(piece.color, sq).is_empty() {
        return true;
    }

    attackers
        .into_iter()
        .filter_map(|from| pos.piece_at(from))
        .filter(|a| a.kind != PieceKind::King)
        .map(|a| a.value())
        .min()
        .map_or(false, |cheapest| cheapest < piece.value())
}

/// Value of the piece standing on the destination after `mv` (promotions
/// count as the new piece).
fn landed_value(pos: &Position, mv: Move) -> i32 {
    match mv.promotion {
        Some(kind) => piece_value(kind),
        None => pos.moving_piece(mv).map_or(0, |p| p.value()),
    }
}

/// Check, hanging and capture terms shared by tree expansion and rollouts.
fn tactical_score(pos: &Position, mv: Move, child: &Position) -> f64 {
    let mut score = 0.0;

    if child.is_check() {
        score += CHECK_BONUS;
    }

    if is_hanging(child, mv.to) {
        score -= f64::from(landed_value(pos, mv)) * HANGING_PENALTY;
    }

    if let Some(captured) = pos.captured_piece(mv) {
        let captured = captured.value();
        score += f64::from(captured) * CAPTURE_BONUS;
        let mover = pos.moving_piece(mv).map_or(0, |p| p.value());
        if captured > mover {
            score += WINNING_CAPTURE_BONUS;
        }
    }

    score
}

/// King-step distances to the enemy king before and after `mv`.
fn approach(pos: &Position, mv: Move) -> (i32, i32) {
    let enemy_king = pos.king(!pos.side_to_move());
    (
        square_distance(mv.from, enemy_king),
        square_distance(mv.to, enemy_king),
    )
}

/// Priority of an untried move during expansion. Higher is tried first.
pub fn move_priority(pos: &Position, mv: Move) -> f64 {
    let Some(mover) = pos.moving_piece(mv) else {
        return 0.0;
    };
    let child = pos.apply(mv);
    let mut score = tactical_score(pos, mv, &child);

    match mover.kind {
        PieceKind::King if !pos.is_castle(mv) => {
            let enemy_king = pos.king(!mover.color);
            let (from_d, to_d) = approach(pos, mv);
            if to_d < from_d {
                score += f64::from(from_d - to_d) * KING_APPROACH_BONUS;
            }
            if to_d <= 3 {
                score += KING_NEAR_BONUS;
            } else if to_d == 4 {
                score += KING_MID_BONUS;
            }
            // Squares around the enemy king that our king now covers.
            let boxed = get_king_moves(mv.to)
                .into_iter()
                .filter(|&sq| square_distance(sq, enemy_king) <= 2)
                .count();
            score += boxed as f64 * KING_BOX_BONUS;
        }
        PieceKind::Rook | PieceKind::Queen => {
            let (from_d, to_d) = approach(pos, mv);
            score += f64::from(from_d - to_d) * HEAVY_APPROACH_BONUS;
        }
        _ => {}
    }

    if pos.is_promotion(mv) {
        score += PROMOTION_BONUS;
    }

    score
}

/// Score of a move inside a rollout. `seen` holds the placements already
/// reached in this rollout.
pub fn rollout_move_score(
    pos: &Position,
    mv: Move,
    child: &Position,
    seen: &HashSet<PlacementKey>,
) -> f64 {
    let mut score = 0.0;

    if seen.contains(&child.placement_key()) {
        score += REPETITION_PENALTY;
    }

    score += tactical_score(pos, mv, child);

    match pos.moving_piece(mv).map(|p| p.kind) {
        Some(PieceKind::King) => {
            let (from_d, to_d) = approach(pos, mv);
            score += f64::from(from_d - to_d) * KING_APPROACH_BONUS;
        }
        Some(PieceKind::Rook) | Some(PieceKind::Queen) => {
            let (from_d, to_d) = approach(pos, mv);
            score += f64::from(from_d - to_d) * HEAVY_APPROACH_BONUS;
        }
        _ => {}
    }

    if child.is_stalemate() || child.is_insufficient_material() {
        score += DRAWISH_PENALTY;
    }

    score
}

/// Static evaluation of a non-terminal position, from `side`'s perspective.
///
/// Being behind in material returns `behind_value`; being ahead blends a
/// material term with how far the weaker king has been driven to the edge
/// and how close the kings stand, capped at `decisive_cap`.
pub fn static_eval(pos: &Position, side: Color, config: &MctsConfig) -> f64 {
    let ours = pos.material(side);
    let theirs = pos.material(!side);

    if ours < theirs {
        return config.behind_value;
    }
    if ours == theirs {
        return config.marginal_edge;
    }

    let material = (f64::from(ours - theirs) / 10.0).min(1.0);

    let weak_king = pos.king(!side);
    let strong_king = pos.king(side);
    let edge = 1.0 - f64::from(edge_distance(weak_king)) / 3.0;
    // Kings are never closer than two squares apart in a legal position.
    let closeness = (1.0 - f64::from(square_distance(weak_king, strong_king) - 2) / 5.0).clamp(0.0, 1.0);
    let positional = (edge + closeness) / 2.0;

    (0.3 + 0.4 * material + 0.3 * positional).min(config.decisive_cap)
}

#[cfg(test)]
#[path = "heuristics_tests.rs"]
mod heuristics_tests;
