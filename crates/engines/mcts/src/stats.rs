use serde::Serialize;

/// Per-root-move breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildStats {
    #[serde(rename = "move")]
    pub uci: String,
    /// Simulations through this child.
    pub visits: u32,
    pub prior_visits: u32,
    /// Prior-inclusive mean value for the root side.
    pub mean_value: Option<f64>,
    /// Accumulated value including the prior.
    pub value_sum: f64,
    pub is_forced_mate: bool,
    /// Score used by final move selection.
    pub selection_score: f64,
}

/// Diagnostics of one search call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStats {
    pub iterations: u64,
    pub root_visits: u32,
    pub nodes: usize,
    pub elapsed_ms: u64,
    pub mate_found: bool,
    pub best_move: Option<String>,
    pub best_visits: u32,
    pub best_mean: Option<f64>,
    pub children: Vec<ChildStats>,
}

impl SearchStats {
    /// Statistics of a search that never ran an iteration.
    pub fn empty(nodes: usize, elapsed_ms: u64) -> Self {
        Self {
            iterations: 0,
            root_visits: 0,
            nodes,
            elapsed_ms,
            mate_found: false,
            best_move: None,
            best_visits: 0,
            best_mean: None,
            children: Vec::new(),
        }
    }

    /// Sum of simulation visits over the root's children.
    pub fn children_visits(&self) -> u64 {
        self.children.iter().map(|c| u64::from(c.visits)).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
