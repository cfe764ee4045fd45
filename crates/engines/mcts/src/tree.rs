//! Search node store with arena allocation.
//!
//! Nodes live in a contiguous Vec and are referenced by [`NodeId`] indices.
//! Parent links are plain ids, so the tree has no shared or cyclic
//! ownership. Nodes are never removed; the whole store is dropped at the end
//! of a search.

use endgame_core::{Move, Position};
use serde::Serialize;

/// Stable index of a node in a [`NodeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Converts a root-relative value into the perspective of a node at
/// `depth`: the player who made the node's incoming move. Odd depths were
/// reached by a move of the root side.
#[inline]
pub fn to_node_perspective(root_value: f64, depth: u32) -> f64 {
    if depth % 2 == 1 {
        root_value
    } else {
        -root_value
    }
}

/// Statistics seeded into a freshly created child to bias early selection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Prior {
    pub visits: u32,
    pub value_sum: f64,
}

impl Prior {
    /// A prior of `visits` whose mean is `mean`.
    pub fn with_mean(visits: u32, mean: f64) -> Self {
        Self {
            visits,
            value_sum: mean * f64::from(visits),
        }
    }

    pub fn mean(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.value_sum / f64::from(self.visits))
    }
}

#[derive(Debug, Clone)]
pub struct SearchNode {
    pub position: Position,
    pub parent: Option<NodeId>,
    pub incoming_move: Option<Move>,
    /// Children in creation order; moves are unique.
    pub children: Vec<(Move, NodeId)>,
    /// Simulations that passed through this node.
    pub visits: u32,
    pub value_sum: f64,
    pub prior: Prior,
    pub depth: u32,
    pub is_forced_mate: bool,
    /// Legal moves of `position`, in adapter order.
    legal_moves: Vec<Move>,
    terminal: bool,
}

impl SearchNode {
    fn new(
        position: Position,
        parent: Option<NodeId>,
        incoming_move: Option<Move>,
        depth: u32,
        prior: Prior,
    ) -> Self {
        let legal_moves = position.legal_moves();
        let terminal = legal_moves.is_empty()
            || position.is_insufficient_material()
            || position.is_fifty_move_draw();
        let is_forced_mate = incoming_move.is_some() && legal_moves.is_empty() && position.is_check();
        Self {
            position,
            parent,
            incoming_move,
            children: Vec::new(),
            visits: 0,
            value_sum: 0.0,
            prior,
            depth,
            is_forced_mate,
            legal_moves,
            terminal,
        }
    }

    /// Simulation visits plus prior visits.
    #[inline]
    pub fn total_visits(&self) -> u32 {
        self.visits + self.prior.visits
    }

    /// Prior-inclusive mean value, from the perspective of the player who
    /// made `incoming_move`. None while unvisited.
    pub fn mean_value(&self) -> Option<f64> {
        let n = self.total_visits();
        (n > 0).then(|| (self.value_sum + self.prior.value_sum) / f64::from(n))
    }

    /// Checkmate, stalemate, insufficient material or fifty-move exhaustion.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn legal_moves(&self) -> &[Move] {
        &self.legal_moves
    }

    pub fn child(&self, mv: Move) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|(_, id)| *id)
    }

    /// Legal moves without a child yet, in adapter order.
    pub fn untried_moves(&self) -> Vec<Move> {
        self.legal_moves
            .iter()
            .copied()
            .filter(|&mv| self.child(mv).is_none())
            .collect()
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.children.len() >= self.legal_moves.len()
    }
}

/// Arena owning every node explored by one search call.
#[derive(Debug)]
pub struct NodeStore {
    nodes: Vec<SearchNode>,
}

impl NodeStore {
    /// Create a store seeded with a root wrapping `position`.
    pub fn create_root(position: Position) -> Self {
        Self {
            nodes: vec![SearchNode::new(position, None, None, 0, Prior::default())],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true: the root is created with the store.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a child for `mv` under `parent`. A move that already has a child
    /// returns the existing id.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        mv: Move,
        position: Position,
        prior: Option<Prior>,
    ) -> NodeId {
        if let Some(existing) = self.get(parent).child(mv) {
            debug_assert!(false, "move {mv} already expanded under {parent:?}");
            return existing;
        }

        let depth = self.get(parent).depth + 1;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SearchNode::new(
            position,
            Some(parent),
            Some(mv),
            depth,
            prior.unwrap_or_default(),
        ));
        self.get_mut(parent).children.push((mv, id));
        id
    }

    pub fn child(&self, parent: NodeId, mv: Move) -> Option<NodeId> {
        self.get(parent).child(mv)
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(parent).children.iter().map(|(_, id)| *id)
    }

    pub fn untried_moves(&self, id: NodeId) -> Vec<Move> {
        self.get(id).untried_moves()
    }

    pub fn is_fully_expanded(&self, id: NodeId) -> bool {
        self.get(id).is_fully_expanded()
    }

    /// Ids from `id` up to and including the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            store: self,
            next: Some(id),
        }
    }

    /// Record one simulation through `id` with an already signed value.
    pub fn update(&mut self, id: NodeId, value: f64) {
        let node = self.get_mut(id);
        node.visits += 1;
        node.value_sum += value;
    }
}

/// Iterator returned by [`NodeStore::ancestors`].
pub struct Ancestors<'a> {
    store: &'a NodeStore,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.store.get(current).parent;
        Some(current)
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tree_tests;
