//! Selection: walk from the root to the next frontier node.

use serde::Serialize;

use crate::config::MctsConfig;
use crate::tree::{NodeId, NodeStore, SearchNode};

/// Selection priority of a forced-mate child before its depth adjustment.
pub const MATE_PRIORITY: f64 = 1e12;

/// One step of a selection walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathStep {
    pub node: NodeId,
    /// Priority that picked this node; None for the root.
    pub priority: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub leaf: NodeId,
    pub path: Vec<PathStep>,
}

/// Small, bounded, monotonically increasing penalty on deep nodes.
#[inline]
pub fn depth_penalty(depth: u32, scale: f64) -> f64 {
    let d = f64::from(depth);
    scale * d / (d + 1.0)
}

/// Modified UCT priority of `child` under a parent with `parent_visits`
/// (prior-inclusive) visits.
pub fn child_priority(child: &SearchNode, parent_visits: u32, config: &MctsConfig) -> f64 {
    let n = child.total_visits();
    if n == 0 {
        return f64::INFINITY;
    }
    if child.is_forced_mate {
        return MATE_PRIORITY - f64::from(child.depth);
    }

    let q = child.mean_value().unwrap_or(0.0);
    let explore = (f64::from(parent_visits + 1).ln() / f64::from(n)).sqrt();
    q + config.exploration * explore - depth_penalty(child.depth, config.depth_penalty)
}

/// Shallowest forced-mate child of `id`, first created on ties.
pub fn shallowest_mate(store: &NodeStore, id: NodeId) -> Option<NodeId> {
    store
        .children(id)
        .filter(|&c| store.get(c).is_forced_mate)
        .min_by_key(|&c| store.get(c).depth)
}

/// Highest-priority child of `id` with its priority. The first child wins ties.
pub fn best_child(store: &NodeStore, id: NodeId, config: &MctsConfig) -> Option<(NodeId, f64)> {
    let parent_visits = store.get(id).total_visits();
    let mut best: Option<(NodeId, f64)> = None;
    for child in store.children(id) {
        let priority = child_priority(store.get(child), parent_visits, config);
        match best {
            Some((_, p)) if priority <= p => {}
            _ => best = Some((child, priority)),
        }
    }
    best
}

/// Walk from the root to a frontier node.
///
/// Stops at a terminal node, a node without children, or a node that still
/// has untried moves. A node owning a forced-mate child descends straight
/// into its shallowest one.
pub fn select(store: &NodeStore, config: &MctsConfig) -> Selection {
    let mut current = store.root();
    let mut path = vec![PathStep {
        node: current,
        priority: None,
    }];

    loop {
        let node = store.get(current);
        if node.is_terminal() || node.is_leaf() {
            break;
        }

        let next = if let Some(mate) = shallowest_mate(store, current) {
            Some((mate, child_priority(store.get(mate), node.total_visits(), config)))
        } else if !node.is_fully_expanded() {
            None
        } else {
            best_child(store, current, config)
        };

        let Some((child, priority)) = next else {
            break;
        };
        path.push(PathStep {
            node: child,
            priority: Some(priority),
        });
        current = child;
    }

    Selection {
        leaf: current,
        path,
    }
}

#[cfg(test)]
#[path = "select_tests.rs"]
mod select_tests;
