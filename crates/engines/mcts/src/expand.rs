//! Expansion: materialize children of a frontier node.
//!
//! A node is expanded one move per call, highest heuristic priority first,
//! except when some untried move mates on the spot. Then every mating move
//! gets a child in the same call so selection can compare them by depth.

use endgame_core::{Color, Move, Position, Tablebase};
use serde::Serialize;

use crate::config::MctsConfig;
use crate::heuristics::move_priority;
use crate::tree::{to_node_perspective, NodeId, NodeStore, Prior};

/// What an expansion did, for the diagnostic sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expansion {
    /// Node to simulate from.
    pub target: NodeId,
    pub created: bool,
    /// UCI text of the move that created `target`, when a child was created.
    pub mv: Option<String>,
    pub prior_mean: Option<f64>,
    pub mates_created: usize,
    pub depth: u32,
}

impl Expansion {
    fn unchanged(store: &NodeStore, id: NodeId) -> Self {
        Self {
            target: id,
            created: false,
            mv: None,
            prior_mean: None,
            mates_created: 0,
            depth: store.get(id).depth,
        }
    }
}

/// Prior for a child whose outcome the tablebase knows exactly.
pub fn tablebase_prior(
    child: &Position,
    depth: u32,
    tablebase: &dyn Tablebase,
    root_side: Color,
    config: &MctsConfig,
) -> Option<Prior> {
    let wdl = tablebase.probe_outcome(child)?;
    let score = if child.side_to_move() == root_side {
        wdl.score()
    } else {
        -wdl.score()
    };
    Some(Prior::with_mean(
        config.prior_visits,
        to_node_perspective(score, depth) * config.tablebase_prior_scale,
    ))
}

/// Expand the frontier node `leaf` and return the node to simulate from.
pub fn expand(
    store: &mut NodeStore,
    leaf: NodeId,
    config: &MctsConfig,
    tablebase: Option<&dyn Tablebase>,
    root_side: Color,
) -> Expansion {
    let node = store.get(leaf);
    if node.is_terminal() {
        return Expansion::unchanged(store, leaf);
    }

    let untried = node.untried_moves();
    if untried.is_empty() {
        return Expansion::unchanged(store, leaf);
    }

    let position = node.position.clone();
    let depth = node.depth + 1;

    let mates: Vec<(Move, Position)> = untried
        .iter()
        .map(|&mv| (mv, position.apply(mv)))
        .filter(|(_, child)| child.is_checkmate())
        .collect();

    if let Some((first_mv, _)) = mates.first() {
        let first_uci = position.move_to_uci(*first_mv);
        let mates_created = mates.len();
        let prior = Prior::with_mean(config.mate_prior_visits, config.mate_value);

        let mut target = leaf;
        for (i, (mv, child)) in mates.into_iter().enumerate() {
            let id = store.add_child(leaf, mv, child, Some(prior));
            if i == 0 {
                target = id;
            }
        }

        return Expansion {
            target,
            created: true,
            mv: Some(first_uci),
            prior_mean: Some(config.mate_value),
            mates_created,
            depth,
        };
    }

    let mut best = untried[0];
    let mut best_score = move_priority(&position, best);
    for &mv in &untried[1..] {
        let score = move_priority(&position, mv);
        if score > best_score {
            best = mv;
            best_score = score;
        }
    }

    let child = position.apply(best);
    let prior = tablebase
        .and_then(|tb| tablebase_prior(&child, depth, tb, root_side, config))
        .or_else(|| {
            child
                .is_check()
                .then(|| Prior::with_mean(config.prior_visits, config.check_prior_value))
        });

    let target = store.add_child(leaf, best, child, prior);
    Expansion {
        target,
        created: true,
        mv: Some(position.move_to_uci(best)),
        prior_mean: prior.and_then(|p| p.mean()),
        mates_created: 0,
        depth,
    }
}

#[cfg(test)]
#[path = "expand_tests.rs"]
mod expand_tests;
