use super::budget::BudgetMode;
use serde::Deserialize;

/// Iterations assumed per second when a time allowance has to be turned into an iteration count
pub const DEFAULT_ITERATIONS_PER_SECOND: u64 = 1000;
/// Moves a random play out may make before it is scored as it stands
pub const DEFAULT_PLAY_OUT_MOVE_CAP: usize = 200;

///
/// Agent configuration, fixed at construction.
///
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub budget_mode: BudgetMode,
    /// Explicit iteration budget. When absent it comes from the call's limits.
    pub iteration_budget: Option<u64>,
    pub iterations_per_second: u64,
    pub play_out_move_cap: Option<usize>,
    /// Seed for the search's random source; fresh entropy per search when absent
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            budget_mode: BudgetMode::FixedIteration,
            iteration_budget: None,
            iterations_per_second: DEFAULT_ITERATIONS_PER_SECOND,
            play_out_move_cap: Some(DEFAULT_PLAY_OUT_MOVE_CAP),
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn fixed_iteration(iteration_budget: u64) -> Self {
        SearchConfig {
            budget_mode: BudgetMode::FixedIteration,
            iteration_budget: Some(iteration_budget),
            ..Default::default()
        }
    }

    pub fn time_based() -> Self {
        SearchConfig {
            budget_mode: BudgetMode::TimeBased,
            ..Default::default()
        }
    }

    pub fn anytime(stop_mode: super::budget::AnytimeStopMode) -> Self {
        SearchConfig {
            budget_mode: BudgetMode::Anytime { stop_mode },
            ..Default::default()
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        SearchConfig {
            seed: Some(seed),
            ..self
        }
    }

    pub fn with_iteration_budget(self, iteration_budget: u64) -> Self {
        SearchConfig {
            iteration_budget: Some(iteration_budget),
            ..self
        }
    }
}

///
/// Limits handed over with each request for an action.
///
/// Zero or negative values count as absent.
///
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchLimits {
    pub max_seconds: Option<f64>,
    pub max_iterations: Option<u64>,
    /// Overrides the configured play out move cap
    pub max_depth: Option<usize>,
}

impl SearchLimits {
    pub fn seconds(max_seconds: f64) -> Self {
        SearchLimits {
            max_seconds: Some(max_seconds),
            ..Default::default()
        }
    }

    pub fn iterations(max_iterations: u64) -> Self {
        SearchLimits {
            max_iterations: Some(max_iterations),
            ..Default::default()
        }
    }

    pub fn max_seconds(&self) -> Option<f64> {
        self.max_seconds.filter(|&s| s > 0.0)
    }

    pub fn max_iterations(&self) -> Option<u64> {
        self.max_iterations.filter(|&i| i > 0)
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth.filter(|&d| d > 0)
    }
}
