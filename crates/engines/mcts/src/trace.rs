//! Per-iteration diagnostics.
//!
//! A [`SearchObserver`] is handed one [`IterationTrace`] per completed
//! iteration, synchronously and inside the timed loop. Observer errors are
//! logged and otherwise ignored; they never abort a search.

use serde::Serialize;

use crate::expand::Expansion;
use crate::select::PathStep;
use crate::tree::NodeId;

#[derive(Debug, Clone, Serialize)]
pub struct IterationTrace {
    /// 1-based iteration number.
    pub iteration: u64,
    pub path: Vec<PathStep>,
    pub expansion: Expansion,
    /// Outcome kind, e.g. "heuristic" or "checkmate".
    pub outcome: &'static str,
    /// Root-relative value that was backpropagated.
    pub value: f64,
    pub rollout_plies: u32,
    /// Node the backpropagation started from.
    pub backprop_from: NodeId,
    pub backprop_visits: u32,
    pub backprop_mean: Option<f64>,
}

pub trait SearchObserver {
    fn on_iteration(&mut self, trace: &IterationTrace) -> anyhow::Result<()>;
}

/// Observer that keeps every trace in memory.
#[derive(Debug, Default)]
pub struct TraceCollector {
    pub traces: Vec<IterationTrace>,
}

impl TraceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// One JSON object per line.
    pub fn to_json_lines(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for trace in &self.traces {
            out.push_str(&serde_json::to_string(trace)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl SearchObserver for TraceCollector {
    fn on_iteration(&mut self, trace: &IterationTrace) -> anyhow::Result<()> {
        self.traces.push(trace.clone());
        Ok(())
    }
}
