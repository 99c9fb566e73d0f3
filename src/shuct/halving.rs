use super::budget::{Budget, BudgetState};
use super::game::State;
use super::node::NodeId;
use super::tree::Tree;
use log::debug;

/// Round quotas never shrink below this
pub const MIN_ROUND_QUOTA: u64 = 2;
/// Halving never leaves fewer candidates than this
pub const MIN_SURVIVORS: usize = 2;

///
/// Keeps the better half of `arms` by `exploit`.
///
/// With more than two arms, the best `max(2, ceil(n / 2))` survive. Arms with equal values are
/// ranked in their current order. Survivors keep their relative order from `arms`. Two or fewer
/// arms are returned unchanged.
///
pub fn halve(arms: &[NodeId], exploit: impl Fn(NodeId) -> f64) -> Vec<NodeId> {
    if arms.len() <= MIN_SURVIVORS {
        return arms.to_vec();
    }
    let mut ranked: Vec<(NodeId, f64)> = arms.iter().map(|&arm| (arm, exploit(arm))).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    let keep = arms.len().div_ceil(2).max(MIN_SURVIVORS);
    let survivors: Vec<NodeId> = ranked[..keep].iter().map(|(arm, _)| *arm).collect();
    arms.iter()
        .copied()
        .filter(|arm| survivors.contains(arm))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Strategy {
    /// Fixed-iteration and time-based: rounds with a shrinking quota; halved arms leave the tree
    Rounds { first_quota: u64 },
    /// Anytime: halve after every full pass over the live arms, restart from all arms at two
    Cycles,
}

///
/// Sequential halving over the root's children.
///
/// Decides which root child each iteration starts from, and when the candidates are cut.
///
#[derive(Debug, Clone)]
pub struct Scheduler {
    strategy: Strategy,
    root_mover: usize,
    /// Every root child, as it was when halving started
    arms: Vec<NodeId>,
    live: Vec<NodeId>,
    cursor: usize,
    started: bool,
    halvings: u32,
    resets: u32,
}

impl Scheduler {
    pub fn new(budget: &Budget, root_mover: usize) -> Scheduler {
        let strategy = match budget.nominal_iterations() {
            Some(iterations) => Strategy::Rounds {
                first_quota: iterations.div_ceil(2).max(1),
            },
            None => Strategy::Cycles,
        };
        Scheduler {
            strategy,
            root_mover,
            arms: Vec::new(),
            live: Vec::new(),
            cursor: 0,
            started: false,
            halvings: 0,
            resets: 0,
        }
    }

    pub fn arms(&self) -> &[NodeId] {
        &self.arms
    }

    /// Candidate arms still being searched, in root child order
    pub fn live(&self) -> &[NodeId] {
        &self.live
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn halvings(&self) -> u32 {
        self.halvings
    }

    pub fn resets(&self) -> u32 {
        self.resets
    }

    ///
    /// Begins halving once every root action has a child.
    ///
    /// Every arm starts live. The anytime strategy makes a full pass over them before its first
    /// halving.
    ///
    pub fn start<StateType: State>(
        &mut self,
        tree: &mut Tree<StateType>,
        budget_state: &mut BudgetState,
    ) {
        self.arms = tree.root().children().to_vec();
        self.live = self.arms.clone();
        self.cursor = 0;
        self.started = true;
        debug!(
            "Root expanded into {} arms after {} iterations",
            self.live.len(),
            budget_state.total_iterations()
        );
        if let Strategy::Rounds { first_quota } = self.strategy {
            debug!("Round 1: {} iterations", first_quota);
            budget_state.start_round(first_quota);
        }
    }

    /// The arm the next iteration starts from
    pub fn next_arm(&mut self) -> Option<NodeId> {
        if self.live.is_empty() {
            return None;
        }
        if self.cursor >= self.live.len() {
            self.cursor = 0;
        }
        let arm = self.live[self.cursor];
        self.cursor += 1;
        Some(arm)
    }

    /// Bookkeeping after an iteration from the arm given by `next_arm`
    pub fn after_visit<StateType: State>(
        &mut self,
        tree: &mut Tree<StateType>,
        budget_state: &mut BudgetState,
    ) {
        match self.strategy {
            Strategy::Rounds { .. } => {
                if budget_state.round_complete() {
                    self.complete_round(tree, budget_state);
                }
            }
            Strategy::Cycles => {
                if self.cursor >= self.live.len() {
                    self.complete_cycle(tree);
                }
            }
        }
    }

    fn complete_round<StateType: State>(
        &mut self,
        tree: &mut Tree<StateType>,
        budget_state: &mut BudgetState,
    ) {
        let survivors = self.halve_live(tree);
        for &arm in self.live.iter().filter(|arm| !survivors.contains(*arm)) {
            tree.detach_child(Tree::<StateType>::ROOT, arm);
        }
        self.live = survivors;
        self.cursor = 0;

        let quota = budget_state
            .round_target()
            .div_ceil(2)
            .max(MIN_ROUND_QUOTA);
        debug!(
            "Next round: {} iterations over {} arms ({} so far)",
            quota,
            self.live.len(),
            budget_state.total_iterations()
        );
        budget_state.start_round(quota);
    }

    fn complete_cycle<StateType: State>(&mut self, tree: &Tree<StateType>) {
        self.cursor = 0;
        if self.live.len() <= MIN_SURVIVORS {
            self.live = self.arms.clone();
            self.resets += 1;
            debug!("Reset to all {} arms", self.live.len());
        } else {
            self.live = self.halve_live(tree);
        }
    }

    fn halve_live<StateType: State>(&mut self, tree: &Tree<StateType>) -> Vec<NodeId> {
        let survivors = halve(&self.live, |arm| tree.exploit(arm, self.root_mover));
        if survivors.len() < self.live.len() {
            self.halvings += 1;
            debug!(
                "Halved {} arms to {}: {:?}",
                self.live.len(),
                survivors.len(),
                survivors
                    .iter()
                    .map(|&arm| (
                        tree.node(arm).incoming_action(),
                        tree.exploit(arm, self.root_mover)
                    ))
                    .collect::<Vec<_>>()
            );
        }
        survivors
    }
}
