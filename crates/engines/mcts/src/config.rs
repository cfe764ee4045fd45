//! Search tuning parameters.
//!
//! Every constant that shapes the search lives here and is threaded through
//! the search call by value, so two searches with different tunings never
//! interfere with each other.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for the endgame Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Exploration constant of the UCT term.
    /// Typical range: 1.4 - 2.5
    pub exploration: f64,

    /// Scale of the depth penalty `scale * d / (d + 1)` subtracted during
    /// selection. Discourages runaway exploration of deep, repetitive lines.
    pub depth_penalty: f64,

    /// Maximum plies played by a single rollout before falling back to the
    /// static endgame evaluation.
    pub rollout_max_plies: u32,

    /// Rollout moves scoring within this distance of the best score are
    /// considered equally good and picked uniformly at random.
    pub rollout_tolerance: f64,

    /// Visit count seeded into check and tablebase priors.
    pub prior_visits: u32,

    /// Visit count seeded into forced-mate children.
    pub mate_prior_visits: u32,

    /// Mean value seeded into forced-mate children. Several orders of
    /// magnitude above the [-1, 1] outcome range.
    pub mate_value: f64,

    /// Mean value seeded into children whose position is a check.
    pub check_prior_value: f64,

    /// Mean seeded into children the tablebase knows: the score (-1/0/1)
    /// times this scale, held over `prior_visits` virtual visits.
    pub tablebase_prior_scale: f64,

    /// Iterations to run before a forced mate at the root may end the
    /// search early.
    pub min_iterations_for_mate_exit: u64,

    /// Share of root visits a child needs before its mean value counts
    /// towards final move selection.
    pub value_bonus_share: f64,

    /// Weight of the mean value in final move selection.
    pub value_bonus_weight: f64,

    /// Floor applied to every time budget, in milliseconds. Zero disables it.
    pub min_budget_ms: u64,

    /// Scan the root for mate in one before building a tree.
    pub presearch_mate_scan: bool,

    /// Static evaluation when the rollout side is behind in material.
    pub behind_value: f64,

    /// Static evaluation when material is level.
    pub marginal_edge: f64,

    /// Upper bound of the static evaluation; below a real win.
    pub decisive_cap: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: 2.5,
            depth_penalty: 0.1,
            rollout_max_plies: 30,
            rollout_tolerance: 5.0,
            prior_visits: 10,
            mate_prior_visits: 50,
            mate_value: 1000.0,
            check_prior_value: 0.5,
            tablebase_prior_scale: 3.0,
            min_iterations_for_mate_exit: 64,
            value_bonus_share: 0.05,
            value_bonus_weight: 100.0,
            min_budget_ms: 50,
            presearch_mate_scan: true,
            behind_value: -0.5,
            marginal_edge: 0.05,
            decisive_cap: 0.9,
        }
    }
}

impl MctsConfig {
    /// Create a config for tests: short rollouts, no budget floor.
    pub fn for_testing() -> Self {
        Self {
            rollout_max_plies: 12,
            min_budget_ms: 0,
            ..Self::default()
        }
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: set the rollout ply limit.
    pub fn with_rollout_plies(mut self, plies: u32) -> Self {
        self.rollout_max_plies = plies;
        self
    }

    /// Builder pattern: set the budget floor.
    pub fn with_min_budget(mut self, min_budget: Duration) -> Self {
        self.min_budget_ms = min_budget.as_millis() as u64;
        self
    }

    /// Builder pattern: toggle the pre-search mate scan.
    pub fn with_presearch_mate_scan(mut self, enabled: bool) -> Self {
        self.presearch_mate_scan = enabled;
        self
    }

    pub fn min_budget(&self) -> Duration {
        Duration::from_millis(self.min_budget_ms)
    }

    /// The budget actually granted to a search asked to run for `budget`.
    pub fn effective_budget(&self, budget: Duration) -> Duration {
        budget.max(self.min_budget())
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: MctsConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "loaded search config");
        Ok(config)
    }

    /// Rejects values that would make the search misbehave (NaN scores,
    /// negative exploration, empty rollouts).
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn finite(field: &'static str, v: f64) -> Result<(), ConfigError> {
            if v.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("{v} is not a finite number"),
                })
            }
        }

        for (field, v) in [
            ("exploration", self.exploration),
            ("depth_penalty", self.depth_penalty),
            ("rollout_tolerance", self.rollout_tolerance),
            ("mate_value", self.mate_value),
            ("check_prior_value", self.check_prior_value),
            ("tablebase_prior_scale", self.tablebase_prior_scale),
            ("value_bonus_share", self.value_bonus_share),
            ("value_bonus_weight", self.value_bonus_weight),
            ("behind_value", self.behind_value),
            ("marginal_edge", self.marginal_edge),
            ("decisive_cap", self.decisive_cap),
        ] {
            finite(field, v)?;
        }

        if self.exploration < 0.0 {
            return Err(ConfigError::Invalid {
                field: "exploration",
                reason: "must not be negative".into(),
            });
        }
        if self.depth_penalty < 0.0 {
            return Err(ConfigError::Invalid {
                field: "depth_penalty",
                reason: "must not be negative".into(),
            });
        }
        if self.rollout_tolerance < 0.0 {
            return Err(ConfigError::Invalid {
                field: "rollout_tolerance",
                reason: "must not be negative".into(),
            });
        }
        if self.mate_prior_visits == 0 {
            return Err(ConfigError::Invalid {
                field: "mate_prior_visits",
                reason: "forced-mate children need a non-zero prior".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.value_bonus_share) {
            return Err(ConfigError::Invalid {
                field: "value_bonus_share",
                reason: format!("{} is outside [0, 1]", self.value_bonus_share),
            });
        }
        if !(0.0..1.0).contains(&self.decisive_cap) {
            return Err(ConfigError::Invalid {
                field: "decisive_cap",
                reason: format!("{} is outside [0, 1)", self.decisive_cap),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
