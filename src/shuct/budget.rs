use super::config::{SearchConfig, SearchLimits};
use super::error::SearchError;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// What ends an anytime search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AnytimeStopMode {
    IterationCount,
    WallClock,
}

///
/// How the search budget is governed.
///
/// All three share the same halving scheduler; they differ in what stops the search and how
/// round quotas are sized.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum BudgetMode {
    /// Stops after a fixed number of iterations
    FixedIteration,
    /// Stops at a wall-clock deadline
    TimeBased,
    /// Keeps halving and resetting the candidates until stopped
    Anytime { stop_mode: AnytimeStopMode },
}

impl BudgetMode {
    pub fn friendly_name(&self) -> &'static str {
        match self {
            BudgetMode::FixedIteration => "SHUCT",
            BudgetMode::TimeBased => "SHUCTTime",
            BudgetMode::Anytime { .. } => "SHUCTAnyTime",
        }
    }
}

/// Stop condition of an anytime search
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnytimeStop {
    Iterations(u64),
    Deadline(Instant),
}

/// A budget mode resolved against a particular request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Budget {
    FixedIteration {
        budget: u64,
    },
    TimeBased {
        deadline: Instant,
        /// Only used to size round quotas
        nominal_iterations: u64,
    },
    Anytime {
        stop: AnytimeStop,
    },
}

impl Budget {
    ///
    /// Works out the budget for one search started at `start`.
    ///
    /// The iteration count comes from the configured budget, then the request's iteration
    /// limit, then the request's seconds times the iterations-per-second multiplier.
    ///
    pub fn resolve(
        config: &SearchConfig,
        limits: &SearchLimits,
        start: Instant,
    ) -> Result<Budget, SearchError> {
        let seconds = limits.max_seconds();
        let iterations = config
            .iteration_budget
            .filter(|&i| i > 0)
            .or(limits.max_iterations())
            .or_else(|| {
                seconds
                    .map(|s| (s * config.iterations_per_second as f64).floor())
                    .filter(|&i| i.is_finite() && i < u64::MAX as f64)
                    .map(|i| i as u64)
            })
            .map(|i| i.max(1));
        // Only looked at by the modes that stop on the clock
        let deadline = || match seconds {
            Some(s) => Duration::try_from_secs_f64(s)
                .ok()
                .and_then(|allowance| start.checked_add(allowance))
                .map(Some)
                .ok_or_else(|| {
                    SearchError::NoBudget(format!("time limit of {} seconds is out of range", s))
                }),
            None => Ok(None),
        };

        match config.budget_mode {
            BudgetMode::FixedIteration => iterations
                .map(|budget| Budget::FixedIteration { budget })
                .ok_or_else(|| {
                    SearchError::NoBudget(
                        "fixed-iteration search needs an iteration budget or a time limit".into(),
                    )
                }),
            BudgetMode::TimeBased => match (deadline()?, iterations) {
                (Some(deadline), Some(nominal_iterations)) => Ok(Budget::TimeBased {
                    deadline,
                    nominal_iterations,
                }),
                _ => Err(SearchError::NoBudget(
                    "time-based search needs a time limit".into(),
                )),
            },
            BudgetMode::Anytime {
                stop_mode: AnytimeStopMode::IterationCount,
            } => iterations
                .map(|n| Budget::Anytime {
                    stop: AnytimeStop::Iterations(n),
                })
                .ok_or_else(|| {
                    SearchError::NoBudget(
                        "anytime search in iteration mode needs an iteration budget".into(),
                    )
                }),
            BudgetMode::Anytime {
                stop_mode: AnytimeStopMode::WallClock,
            } => deadline()?
                .map(|deadline| Budget::Anytime {
                    stop: AnytimeStop::Deadline(deadline),
                })
                .ok_or_else(|| {
                    SearchError::NoBudget(
                        "anytime search in wall-clock mode needs a time limit".into(),
                    )
                }),
        }
    }

    /// Iterations used to size the first halving round
    pub fn nominal_iterations(&self) -> Option<u64> {
        match self {
            Budget::FixedIteration { budget } => Some(*budget),
            Budget::TimeBased {
                nominal_iterations, ..
            } => Some(*nominal_iterations),
            Budget::Anytime { .. } => None,
        }
    }
}

///
/// Counters for a single search. Created when the search starts and dropped with it.
///
#[derive(Debug, Clone)]
pub struct BudgetState {
    budget: Budget,
    total_iterations: u64,
    iterations_in_round: u64,
    round_target: u64,
}

impl BudgetState {
    pub fn new(budget: Budget) -> BudgetState {
        BudgetState {
            budget,
            total_iterations: 0,
            iterations_in_round: 0,
            round_target: 0,
        }
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    pub fn total_iterations(&self) -> u64 {
        self.total_iterations
    }

    pub fn iterations_in_round(&self) -> u64 {
        self.iterations_in_round
    }

    pub fn round_target(&self) -> u64 {
        self.round_target
    }

    pub fn record_iteration(&mut self) {
        self.total_iterations += 1;
        self.iterations_in_round += 1;
    }

    pub fn start_round(&mut self, target: u64) {
        self.iterations_in_round = 0;
        self.round_target = target;
    }

    pub fn round_complete(&self) -> bool {
        self.iterations_in_round >= self.round_target
    }

    /// Whether the stop condition of the budget has been reached
    pub fn exhausted(&self) -> bool {
        match self.budget {
            Budget::FixedIteration { budget } => self.total_iterations >= budget,
            Budget::TimeBased { deadline, .. } => Instant::now() >= deadline,
            Budget::Anytime {
                stop: AnytimeStop::Iterations(n),
            } => self.total_iterations >= n,
            Budget::Anytime {
                stop: AnytimeStop::Deadline(deadline),
            } => Instant::now() >= deadline,
        }
    }
}
