use super::budget::{Budget, BudgetState};
use super::config::{SearchConfig, SearchLimits};
use super::error::SearchError;
use super::game::State;
use super::halving::Scheduler;
use super::tie_break::best_with_random_ties;
use super::tree::Tree;
use crate::game::Game;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Statistics for one root action at the end of a search
#[derive(Debug, Clone, PartialEq)]
pub struct ArmStats<ActionType> {
    pub action: ActionType,
    pub visit_count: u32,
    pub exploit: f64,
    /// Not halved away; the final choice is made among these
    pub root_child: bool,
    /// Still being searched when the search stopped
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<ActionType> {
    pub action: ActionType,
    pub iterations: u64,
    pub halvings: u32,
    /// Anytime searches only: times the candidates went back to every root action
    pub resets: u32,
    pub interrupted: bool,
    /// In root child order
    pub arms: Vec<ArmStats<ActionType>>,
}

impl<ActionType> SearchOutcome<ActionType> {
    pub fn live_arms(&self) -> impl Iterator<Item = &ArmStats<ActionType>> {
        self.arms.iter().filter(|arm| arm.live)
    }
}

///
/// Sequential Halving on top of UCT.
///
/// Holds configuration only; every search builds and drops its own tree, random source and
/// counters.
///
#[derive(Debug, Clone)]
pub struct SequentialHalvingUct {
    config: SearchConfig,
}

impl SequentialHalvingUct {
    pub fn new(config: SearchConfig) -> SequentialHalvingUct {
        SequentialHalvingUct { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn friendly_name(&self) -> &'static str {
        self.config.budget_mode.friendly_name()
    }

    /// Only deterministic, alternating-move games can be searched
    pub fn supports_game<G: Game>(&self, game: &G) -> bool {
        !game.is_stochastic() && game.is_alternating_move()
    }

    ///
    /// Chooses an action for the player to act at `state`.
    ///
    /// Setting `interrupt` stops the search early; the best action found so far is returned.
    ///
    pub fn select_action<G: Game>(
        &self,
        game: &G,
        state: &G::StateType,
        limits: SearchLimits,
        interrupt: &AtomicBool,
    ) -> Result<G::ActionType, SearchError> {
        if !self.supports_game(game) {
            return Err(SearchError::UnsupportedGame(
                self.friendly_name().to_string(),
            ));
        }
        Ok(self.search(state.clone(), limits, interrupt)?.action)
    }

    /// Runs a full search from `state` and reports what it found
    pub fn search<StateType: State>(
        &self,
        state: StateType,
        limits: SearchLimits,
        interrupt: &AtomicBool,
    ) -> Result<SearchOutcome<StateType::ActionType>, SearchError> {
        let start = Instant::now();
        if state.terminal() {
            return Err(SearchError::TerminalState);
        }
        if state.permitted_actions().is_empty() {
            return Err(SearchError::NoLegalActions);
        }
        let budget = Budget::resolve(&self.config, &limits, start)?;
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut tree = Tree::new(state, limits.max_depth().or(self.config.play_out_move_cap));
        let root_mover = tree.mover(Tree::<StateType>::ROOT)?;
        let mut budget_state = BudgetState::new(budget);
        let mut scheduler = Scheduler::new(&budget, root_mover);
        let mut interrupted = false;
        debug!("{} searching with {:?}", self.friendly_name(), budget);

        loop {
            // At least one iteration always runs, so there is something to choose from
            if budget_state.total_iterations() > 0 {
                if interrupt.load(Ordering::Relaxed) {
                    interrupted = true;
                    break;
                }
                if budget_state.exhausted() {
                    break;
                }
            }

            if !scheduler.started() {
                tree.iterate(Tree::<StateType>::ROOT, &mut rng)?;
                budget_state.record_iteration();
                if tree.root().fully_expanded() {
                    scheduler.start(&mut tree, &mut budget_state);
                }
                continue;
            }

            let arm = scheduler.next_arm().ok_or(SearchError::NoCandidates)?;
            tree.iterate(arm, &mut rng)?;
            budget_state.record_iteration();
            scheduler.after_visit(&mut tree, &mut budget_state);
        }

        // Halved arms have been detached, so these are the candidates left
        let root_children = tree.root().children().to_vec();
        let best = best_with_random_ties(
            root_children
                .iter()
                .map(|&arm| (arm, tree.exploit(arm, root_mover))),
            &mut rng,
        )
        .ok_or(SearchError::NoCandidates)?;
        let action = tree
            .node(best)
            .incoming_action()
            .ok_or(SearchError::NoCandidates)?;

        let (all_arms, live) = if scheduler.started() {
            (scheduler.arms(), scheduler.live())
        } else {
            (&root_children[..], &root_children[..])
        };
        let arms = all_arms
            .iter()
            .filter_map(|&arm| {
                let node = tree.node(arm);
                node.incoming_action().map(|action| ArmStats {
                    action,
                    visit_count: node.visit_count(),
                    exploit: node.exploit(root_mover),
                    root_child: root_children.contains(&arm),
                    live: live.contains(&arm),
                })
            })
            .collect();

        debug!(
            "{} chose {:?} after {} iterations ({} halvings, {} resets{}) in {:.3}s",
            self.friendly_name(),
            action,
            budget_state.total_iterations(),
            scheduler.halvings(),
            scheduler.resets(),
            if interrupted { ", interrupted" } else { "" },
            start.elapsed().as_secs_f64()
        );

        Ok(SearchOutcome {
            action,
            iterations: budget_state.total_iterations(),
            halvings: scheduler.halvings(),
            resets: scheduler.resets(),
            interrupted,
            arms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shuct::budget::AnytimeStopMode;
    use crate::shuct::game::Action;
    use crate::test::injectable_game::{TestGame, TestGameAction, TestGameState};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;
    use test_log::test;

    fn no_interrupt() -> AtomicBool {
        AtomicBool::new(false)
    }

    fn arm<'a>(
        outcome: &'a SearchOutcome<TestGameAction>,
        index: u8,
    ) -> &'a ArmStats<TestGameAction> {
        outcome
            .arms
            .iter()
            .find(|arm| arm.action == TestGameAction::Arm(index))
            .unwrap()
    }

    fn assert_best_arm_chosen(outcome: &SearchOutcome<TestGameAction>) {
        let best = outcome
            .arms
            .iter()
            .filter(|arm| arm.root_child)
            .map(|arm| arm.exploit)
            .fold(f64::NEG_INFINITY, f64::max);
        let chosen = outcome
            .arms
            .iter()
            .find(|arm| arm.action == outcome.action)
            .unwrap();
        assert!(chosen.root_child);
        assert_eq!(chosen.exploit, best);
    }

    #[test]
    fn test_fixed_budget_four_arms() {
        let agent = SequentialHalvingUct::new(SearchConfig::fixed_iteration(40).with_seed(1));
        let outcome = agent
            .search(
                TestGameState::with_arms(&[0.1, 0.2, 0.3, 0.4], 2),
                SearchLimits::default(),
                &no_interrupt(),
            )
            .unwrap();

        assert_eq!(outcome.iterations, 40);
        assert_eq!(outcome.halvings, 1);
        assert!(!outcome.interrupted);
        // 1 expansion + 5 in the first round
        assert_eq!(arm(&outcome, 0).visit_count, 6);
        assert_eq!(arm(&outcome, 1).visit_count, 6);
        assert!(!arm(&outcome, 0).live);
        assert!(!arm(&outcome, 1).live);
        // 6 + 5 in the second round, then 5 and 1 more shared out until the budget runs out
        let survivors = [arm(&outcome, 2), arm(&outcome, 3)];
        assert!(survivors.iter().all(|arm| arm.live));
        assert_eq!(survivors[0].visit_count + survivors[1].visit_count, 28);
        assert!(survivors.iter().all(|arm| arm.visit_count >= 13));
        assert_eq!(outcome.action, TestGameAction::Arm(3));
        assert_best_arm_chosen(&outcome);
    }

    #[test]
    fn test_fixed_budget_is_spent_exactly() {
        for budget in [1, 2, 3, 5, 10, 33, 100] {
            for arm_count in [1, 2, 3, 4, 7] {
                let rewards: Vec<f64> = (0..arm_count).map(|i| i as f64 / 10.0).collect();
                let agent =
                    SequentialHalvingUct::new(SearchConfig::fixed_iteration(budget).with_seed(5));
                let outcome = agent
                    .search(
                        TestGameState::with_arms(&rewards, 2),
                        SearchLimits::default(),
                        &no_interrupt(),
                    )
                    .unwrap();
                assert_eq!(outcome.iterations, budget);
                let visits: u64 = outcome.arms.iter().map(|arm| arm.visit_count as u64).sum();
                assert_eq!(visits, budget, "budget {} arms {}", budget, arm_count);
            }
        }
    }

    #[test]
    fn test_arms_visited_evenly_within_a_round() {
        let rewards = [0.3, -0.2, 0.1, 0.0, 0.5, -0.4, 0.2];
        // First round quota is ceil(B / 2), so these budgets stop before any halving
        for budget in 7..=13 {
            let agent =
                SequentialHalvingUct::new(SearchConfig::fixed_iteration(budget).with_seed(11));
            let outcome = agent
                .search(
                    TestGameState::with_arms(&rewards, 2),
                    SearchLimits::default(),
                    &no_interrupt(),
                )
                .unwrap();
            assert_eq!(outcome.halvings, 0);
            let most = outcome.arms.iter().map(|arm| arm.visit_count).max().unwrap();
            let least = outcome.arms.iter().map(|arm| arm.visit_count).min().unwrap();
            assert!(most - least <= 1, "budget {}: {:?}", budget, outcome.arms);
        }
    }

    #[test]
    fn test_anytime_iteration_mode_three_arms() {
        let search = |budget: u64| {
            SequentialHalvingUct::new(
                SearchConfig::anytime(AnytimeStopMode::IterationCount)
                    .with_iteration_budget(budget)
                    .with_seed(2),
            )
            .search(
                TestGameState::with_arms(&[0.1, 0.2, 0.3], 2),
                SearchLimits::default(),
                &no_interrupt(),
            )
            .unwrap()
        };

        // Expansion alone never halves: every arm has a single play out
        let expanded = search(3);
        assert_eq!(expanded.halvings, 0);
        assert_eq!(expanded.live_arms().count(), 3);
        assert!(expanded.arms.iter().all(|arm| arm.visit_count == 1));

        // Part way through the first full pass
        let mid_pass = search(5);
        assert_eq!(mid_pass.halvings, 0);
        assert_eq!(mid_pass.live_arms().count(), 3);

        // 3 expanding, a pass of 3, then halve to 2
        let outcome = search(6);
        assert_eq!(outcome.iterations, 6);
        assert_eq!(outcome.halvings, 1);
        assert_eq!(outcome.resets, 0);
        assert!(outcome.arms.iter().all(|arm| arm.visit_count == 2));
        assert!(!arm(&outcome, 0).live);
        assert!(arm(&outcome, 1).live);
        assert!(arm(&outcome, 2).live);
        assert_eq!(outcome.action, TestGameAction::Arm(2));
        assert_best_arm_chosen(&outcome);
    }

    #[test]
    fn test_two_arms_never_halve() {
        let configs = [
            SearchConfig::fixed_iteration(50),
            SearchConfig::anytime(AnytimeStopMode::IterationCount).with_iteration_budget(50),
        ];
        for config in configs {
            let agent = SequentialHalvingUct::new(config.with_seed(3));
            let outcome = agent
                .search(
                    TestGameState::with_arms(&[0.2, 0.6], 2),
                    SearchLimits::default(),
                    &no_interrupt(),
                )
                .unwrap();
            assert_eq!(outcome.halvings, 0);
            assert_eq!(outcome.live_arms().count(), 2);
            assert_eq!(outcome.action, TestGameAction::Arm(1));
        }
    }

    #[test]
    fn test_picks_best_arm_in_every_mode() {
        let rewards = [0.1, 0.9, 0.5, -0.3, 0.0, 0.45];
        let configs = [
            SearchConfig::fixed_iteration(200),
            SearchConfig::anytime(AnytimeStopMode::IterationCount).with_iteration_budget(200),
        ];
        for config in configs {
            let agent = SequentialHalvingUct::new(config.with_seed(4));
            let outcome = agent
                .search(
                    TestGameState::with_arms(&rewards, 2),
                    SearchLimits::default(),
                    &no_interrupt(),
                )
                .unwrap();
            assert_eq!(outcome.action, TestGameAction::Arm(1));
            assert_best_arm_chosen(&outcome);
        }
    }

    #[test]
    fn test_same_seed_same_search() {
        let agent = SequentialHalvingUct::new(SearchConfig::fixed_iteration(300).with_seed(8));
        let root = TestGameState {
            injected_reward: vec![0.0, 0.0],
            injected_terminal: false,
            injected_permitted_actions: vec![
                TestGameAction::NextTurnInjectActionCount(3),
                TestGameAction::WinInXTurns(1),
                TestGameAction::WinInXTurns(2),
                TestGameAction::NextTurnInjectActionCount(2),
            ],
            arm_rewards: vec![],
            injected_chance: false,
            player_count: 2,
            next_player_id: 0,
        };
        let first = agent
            .search(root.clone(), SearchLimits::default(), &no_interrupt())
            .unwrap();
        let second = agent
            .search(root, SearchLimits::default(), &no_interrupt())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_time_based_runs_until_deadline() {
        let agent = SequentialHalvingUct::new(SearchConfig::time_based().with_seed(6));
        let start = Instant::now();
        let outcome = agent
            .search(
                TestGameState::with_arms(&[0.1, 0.2, 0.3, 0.4, 0.5], 2),
                SearchLimits::seconds(0.05),
                &no_interrupt(),
            )
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(outcome.iterations > 5);
        assert_eq!(outcome.live_arms().count(), 2);
        assert_eq!(outcome.action, TestGameAction::Arm(4));
    }

    #[test]
    fn test_anytime_wall_clock() {
        let agent = SequentialHalvingUct::new(
            SearchConfig::anytime(AnytimeStopMode::WallClock).with_seed(6),
        );
        let start = Instant::now();
        let outcome = agent
            .search(
                TestGameState::with_arms(&[0.1, 0.2, 0.3, 0.4, 0.5], 2),
                SearchLimits::seconds(0.05),
                &no_interrupt(),
            )
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(outcome.resets > 0);
        assert_best_arm_chosen(&outcome);
    }

    #[test]
    fn test_interrupt_before_start_still_answers() {
        let agent = SequentialHalvingUct::new(SearchConfig::fixed_iteration(1000).with_seed(7));
        let outcome = agent
            .search(
                TestGameState::with_arms(&[0.1, 0.2, 0.3], 2),
                SearchLimits::default(),
                &AtomicBool::new(true),
            )
            .unwrap();
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.interrupted);
        assert_eq!(outcome.arms.len(), 1);
        assert_eq!(outcome.action, outcome.arms[0].action);
    }

    #[test]
    fn test_interrupt_from_another_thread() {
        let agent = SequentialHalvingUct::new(SearchConfig::time_based().with_seed(7));
        let interrupt = Arc::new(AtomicBool::new(false));
        let setter = {
            let interrupt = interrupt.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                interrupt.store(true, Ordering::Relaxed);
            })
        };
        let start = Instant::now();
        let outcome = agent
            .search(
                TestGameState::with_arms(&[0.1, 0.2, 0.3, 0.4], 2),
                SearchLimits::seconds(60.0),
                &interrupt,
            )
            .unwrap();
        setter.join().unwrap();
        assert!(outcome.interrupted);
        assert!(start.elapsed() < Duration::from_secs(30));
        assert_best_arm_chosen(&outcome);
    }

    #[test]
    fn test_select_action_checks_game() {
        let agent = SequentialHalvingUct::new(SearchConfig::fixed_iteration(20).with_seed(1));
        let mut game = TestGame::new(TestGameState::with_arms(&[0.4, 0.1], 2));
        let state = game.init_game();
        assert!(agent.supports_game(&game));
        assert_eq!(
            agent.select_action(&game, &state, SearchLimits::default(), &no_interrupt()),
            Ok(TestGameAction::Arm(0))
        );

        game.stochastic = true;
        assert!(!agent.supports_game(&game));
        assert_eq!(
            agent.select_action(&game, &state, SearchLimits::default(), &no_interrupt()),
            Err(SearchError::UnsupportedGame("SHUCT".to_string()))
        );

        game.stochastic = false;
        game.alternating = false;
        assert!(!agent.supports_game(&game));
    }

    #[test]
    fn test_degenerate_roots() {
        let agent = SequentialHalvingUct::new(SearchConfig::fixed_iteration(20));
        let terminal = TestGameAction::Arm(0).execute(&TestGameState::with_arms(&[0.4], 2));
        assert_eq!(
            agent.search(terminal, SearchLimits::default(), &no_interrupt()),
            Err(SearchError::TerminalState)
        );

        let stuck = TestGameState::with_arms(&[], 2);
        assert_eq!(
            agent.search(stuck, SearchLimits::default(), &no_interrupt()),
            Err(SearchError::NoLegalActions)
        );
    }

    #[test]
    fn test_missing_budget_is_reported() {
        let agent = SequentialHalvingUct::new(SearchConfig::time_based());
        assert!(matches!(
            agent.search(
                TestGameState::with_arms(&[0.4, 0.1], 2),
                SearchLimits::iterations(10),
                &no_interrupt()
            ),
            Err(SearchError::NoBudget(_))
        ));
    }

    #[test]
    fn test_unbounded_time_limit_is_rejected() {
        for (config, seconds) in [
            (SearchConfig::anytime(AnytimeStopMode::WallClock), f64::INFINITY),
            (SearchConfig::time_based(), 1e19),
        ] {
            let agent = SequentialHalvingUct::new(config);
            assert!(matches!(
                agent.search(
                    TestGameState::with_arms(&[0.4, 0.1], 2),
                    SearchLimits::seconds(seconds),
                    &no_interrupt()
                ),
                Err(SearchError::NoBudget(_))
            ));
        }
    }
}
