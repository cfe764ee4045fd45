pub mod position;
pub mod tablebase;
pub mod time_control;
pub mod types;
pub mod uci;

// Re-export the game-facing API (not search-specific)
pub use position::*;
pub use tablebase::*;
pub use time_control::*;
pub use types::*;
pub use uci::*;

// =============================================================================
// Engine trait: implemented by every endgame engine
// =============================================================================

/// Result of a search operation
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The best move found (None if no legal moves or no time to search)
    pub best_move: Option<Move>,
    /// Estimated value in [-1, 1] for the side to move
    pub value: f64,
    /// Number of completed search iterations
    pub iterations: u64,
    /// Number of tree nodes allocated
    pub nodes: u64,
    /// Whether a forced mate was found among the root moves
    pub mate_found: bool,
}

/// Trait that all endgame engines implement.
///
/// The UCI front end only talks to this trait, so alternative search
/// strategies can be plugged in without touching the protocol layer.
pub trait Engine: Send {
    /// Search the position within the given limits.
    ///
    /// # Arguments
    /// * `pos` - The current position to analyze
    /// * `limits` - Wall-clock budget for this move
    fn search(&mut self, pos: &Position, limits: SearchLimits) -> SearchResult;

    /// Returns the engine's name for UCI identification
    fn name(&self) -> &str;

    /// Returns the engine's author for UCI identification
    fn author(&self) -> &str {
        "ML-chess"
    }

    /// Reset internal state for a new game
    fn new_game(&mut self) {}

    /// Optional: Set a UCI option. Returns true if the option was recognized.
    fn set_option(&mut self, _name: &str, _value: &str) -> bool {
        false
    }
}
