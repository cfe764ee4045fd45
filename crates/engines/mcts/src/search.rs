//! MCTS driver.
//!
//! Each iteration runs the four classic steps:
//! 1. Selection: walk the tree to a frontier node
//! 2. Expansion: add a child (or every mating child) to it
//! 3. Simulation: heuristic rollout from the new child
//! 4. Backpropagation: update statistics from the child up to the root
//!
//! The loop runs until the wall-clock budget is spent. The clock is only
//! checked between iterations.

use std::time::Duration;

use endgame_core::{Color, Move, Position, Tablebase, TimeControl};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace, warn};

use crate::config::MctsConfig;
use crate::expand::expand;
use crate::rollout::rollout;
use crate::select::select;
use crate::stats::{ChildStats, SearchStats};
use crate::trace::{IterationTrace, SearchObserver};
use crate::tree::{to_node_perspective, NodeId, NodeStore};

/// Everything a search call may be given besides the position and budget.
#[derive(Default)]
pub struct SearchOptions<'a> {
    pub config: MctsConfig,
    /// Rollout RNG seed; entropy when absent.
    pub seed: Option<u64>,
    pub tablebase: Option<&'a dyn Tablebase>,
    pub observer: Option<&'a mut dyn SearchObserver>,
}

impl<'a> SearchOptions<'a> {
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

    pub fn with_tablebase(mut self, tablebase: &'a dyn Tablebase) -> Self {
        self.tablebase = Some(tablebase);
        self
    }

    pub fn with_observer(mut self, observer: &'a mut dyn SearchObserver) -> Self {
        self.observer = Some(observer);
        self
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// None when the position has no legal moves or nothing was searched.
    pub best_move: Option<Move>,
    pub stats: SearchStats,
}

/// Search `position` for at most `budget` (subject to the configured floor).
pub fn search(position: &Position, budget: Duration, options: SearchOptions<'_>) -> SearchOutcome {
    MctsSearch::new(position, options).run(budget)
}

/// First legal move that checkmates, in adapter order.
pub fn find_immediate_mate(position: &Position) -> Option<Move> {
    position
        .legal_moves()
        .into_iter()
        .find(|&mv| position.apply(mv).is_checkmate())
}

/// Apply one simulation result to `leaf` and all its ancestors.
pub fn backpropagate(store: &mut NodeStore, leaf: NodeId, root_value: f64) {
    let path: Vec<NodeId> = store.ancestors(leaf).collect();
    for id in path {
        let depth = store.get(id).depth;
        store.update(id, to_node_perspective(root_value, depth));
    }
}

/// MCTS search state for a single call.
pub struct MctsSearch<'a> {
    store: NodeStore,
    config: MctsConfig,
    tablebase: Option<&'a dyn Tablebase>,
    observer: Option<&'a mut dyn SearchObserver>,
    rng: StdRng,
    root_side: Color,
    iterations: u64,
}

impl<'a> MctsSearch<'a> {
    pub fn new(position: &Position, options: SearchOptions<'a>) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store: NodeStore::create_root(position.clone()),
            config: options.config,
            tablebase: options.tablebase,
            observer: options.observer,
            rng,
            root_side: position.side_to_move(),
            iterations: 0,
        }
    }

    /// The tree built so far.
    pub fn tree(&self) -> &NodeStore {
        &self.store
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Run the search until the budget is spent and pick a move.
    pub fn run(&mut self, budget: Duration) -> SearchOutcome {
        let mut clock = TimeControl::new(self.config.effective_budget(budget));
        clock.start();

        let root = self.store.root();
        let root_node = self.store.get(root);
        if root_node.is_terminal() {
            debug!(fen = %root_node.position, "root is terminal, no move");
            return SearchOutcome {
                best_move: None,
                stats: SearchStats::empty(self.store.len(), clock.elapsed().as_millis() as u64),
            };
        }

        if self.config.presearch_mate_scan {
            if let Some(mv) = find_immediate_mate(&root_node.position) {
                let mut stats = SearchStats::empty(self.store.len(), clock.elapsed().as_millis() as u64);
                stats.mate_found = true;
                stats.best_move = Some(root_node.position.move_to_uci(mv));
                debug!(best = ?stats.best_move, "mate in one found before search");
                return SearchOutcome {
                    best_move: Some(mv),
                    stats,
                };
            }
        }

        while !clock.is_expired() {
            self.iterate();
            if self.iterations >= self.config.min_iterations_for_mate_exit
                && self.forced_mate_child().is_some()
            {
                debug!(iterations = self.iterations, "forced mate at root, stopping early");
                break;
            }
        }

        let outcome = self.finish(clock.elapsed());
        debug!(
            iterations = outcome.stats.iterations,
            nodes = outcome.stats.nodes,
            elapsed_ms = outcome.stats.elapsed_ms,
            best = ?outcome.stats.best_move,
            mate = outcome.stats.mate_found,
            "search finished"
        );
        outcome
    }

    /// One select / expand / simulate / backpropagate cycle.
    pub fn iterate(&mut self) {
        let selection = select(&self.store, &self.config);
        let expansion = expand(
            &mut self.store,
            selection.leaf,
            &self.config,
            self.tablebase,
            self.root_side,
        );
        let target = expansion.target;

        let result = rollout(
            &self.store.get(target).position,
            &self.config,
            self.tablebase,
            self.root_side,
            &mut self.rng,
        );
        let value = result.outcome.root_value(self.root_side);
        backpropagate(&mut self.store, target, value);
        self.iterations += 1;

        trace!(
            iteration = self.iterations,
            depth = expansion.depth,
            created = expansion.created,
            outcome = result.outcome.label(),
            value,
            "iteration"
        );

        if let Some(observer) = self.observer.as_deref_mut() {
            let node = self.store.get(target);
            let record = IterationTrace {
                iteration: self.iterations,
                path: selection.path,
                expansion,
                outcome: result.outcome.label(),
                value,
                rollout_plies: result.plies,
                backprop_from: target,
                backprop_visits: node.visits,
                backprop_mean: node.mean_value(),
            };
            if let Err(err) = observer.on_iteration(&record) {
                warn!(iteration = self.iterations, error = %err, "search observer failed");
            }
        }
    }

    /// Visited forced-mate child of the root: shallowest, then most visited.
    fn forced_mate_child(&self) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for id in self.store.children(self.store.root()) {
            let node = self.store.get(id);
            if !node.is_forced_mate || node.total_visits() == 0 {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => {
                    let current = self.store.get(b);
                    node.depth < current.depth
                        || (node.depth == current.depth
                            && node.total_visits() > current.total_visits())
                }
            };
            if better {
                best = Some(id);
            }
        }
        best
    }

    /// Final selection score: visits, plus a value bonus for children with a
    /// meaningful share of the root's visits.
    fn selection_score(&self, id: NodeId, root_visits: f64) -> f64 {
        let node = self.store.get(id);
        let visits = f64::from(node.total_visits());
        if visits > self.config.value_bonus_share * root_visits {
            visits + node.mean_value().unwrap_or(0.0) * self.config.value_bonus_weight
        } else {
            visits
        }
    }

    fn finish(&self, elapsed: Duration) -> SearchOutcome {
        let root = self.store.root();
        let root_node = self.store.get(root);
        let root_visits = f64::from(root_node.total_visits());

        let children: Vec<ChildStats> = root_node
            .children
            .iter()
            .map(|&(mv, id)| {
                let node = self.store.get(id);
                ChildStats {
                    uci: root_node.position.move_to_uci(mv),
                    visits: node.visits,
                    prior_visits: node.prior.visits,
                    mean_value: node.mean_value(),
                    value_sum: node.value_sum + node.prior.value_sum,
                    is_forced_mate: node.is_forced_mate,
                    selection_score: self.selection_score(id, root_visits),
                }
            })
            .collect();

        let chosen = self.forced_mate_child().or_else(|| {
            let mut best: Option<(NodeId, f64)> = None;
            for id in self.store.children(root) {
                let score = self.selection_score(id, root_visits);
                match best {
                    Some((_, s)) if score <= s => {}
                    _ => best = Some((id, score)),
                }
            }
            best.map(|(id, _)| id)
        });

        let mut stats = SearchStats {
            iterations: self.iterations,
            root_visits: root_node.visits,
            nodes: self.store.len(),
            elapsed_ms: elapsed.as_millis() as u64,
            mate_found: false,
            best_move: None,
            best_visits: 0,
            best_mean: None,
            children,
        };

        let best_move = chosen.and_then(|id| {
            let node = self.store.get(id);
            stats.mate_found = node.is_forced_mate;
            stats.best_visits = node.visits;
            stats.best_mean = node.mean_value();
            let mv = node.incoming_move?;
            stats.best_move = Some(root_node.position.move_to_uci(mv));
            Some(mv)
        });

        SearchOutcome { best_move, stats }
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
