//! Sequential Halving applied to trees (SHUCT).
//!
//! Spreads a search budget over the root actions in rounds, throwing away the worse half of
//! the candidates after each round, and runs plain UCT below every candidate.
pub mod agent;
pub mod budget;
pub mod config;
pub mod error;
pub mod game;
pub mod halving;
pub mod node;
pub mod tie_break;
pub mod tree;

pub use agent::{ArmStats, SearchOutcome, SequentialHalvingUct};
pub use budget::{AnytimeStopMode, BudgetMode};
pub use config::{SearchConfig, SearchLimits};
pub use error::SearchError;

use std::sync::atomic::AtomicBool;

pub type Reward = f64;

///
/// Picks an action for `state` without any way to interrupt the search.
///
pub fn calculate_best_turn<StateType: game::State>(
    config: SearchConfig,
    limits: SearchLimits,
    state: StateType,
) -> Result<StateType::ActionType, SearchError> {
    let interrupt = AtomicBool::new(false);
    Ok(SequentialHalvingUct::new(config)
        .search(state, limits, &interrupt)?
        .action)
}
