//! Time control and search limits for the endgame engine.
//!
//! Searches are anytime: they keep improving their estimate until a wall-clock
//! budget runs out. The clock is only consulted between iterations, so a
//! search may overrun its budget by at most one iteration.

use std::time::{Duration, Instant};

/// Search limits handed to an [`Engine`](crate::Engine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Wall-clock budget for this move
    pub move_time: Duration,
}

impl SearchLimits {
    /// Create limits with a time budget.
    pub fn time(move_time: Duration) -> Self {
        Self { move_time }
    }

    /// Convenience constructor for budgets given in milliseconds.
    pub fn millis(ms: u64) -> Self {
        Self::time(Duration::from_millis(ms))
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::time(Duration::from_secs(1))
    }
}

/// Wall-clock deadline for a single search call.
///
/// There is no external stop signal: a caller that wants a shorter search
/// passes a shorter budget.
#[derive(Debug, Clone)]
pub struct TimeControl {
    /// Start time of the search (None until started)
    start_time: Option<Instant>,
    /// Time limit for this search
    time_limit: Duration,
}

impl TimeControl {
    pub fn new(time_limit: Duration) -> Self {
        Self {
            start_time: None,
            time_limit,
        }
    }

    /// Start the clock. Should be called when search begins.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    /// True once the budget is spent. A clock that was never started is
    /// treated as started now.
    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.time_limit
    }

    /// Get elapsed time since search started.
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|s| s.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// Get remaining time (zero once expired).
    pub fn remaining(&self) -> Duration {
        self.time_limit.saturating_sub(self.elapsed())
    }
}

#[cfg(test)]
#[path = "time_control_tests.rs"]
mod time_control_tests;
