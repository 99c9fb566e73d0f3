use super::game::State;
use super::Reward;
use log::trace;

/// Index of a node in its tree's arena
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node<StateType: State> {
    /// Back reference, only used to walk up during propagation
    parent: Option<NodeId>,
    incoming_action: Option<StateType::ActionType>,
    state: StateType,
    visit_count: u32,
    /// Sum of rewards for every player, indexed by player id
    score_sums: Vec<Reward>,
    /// In creation order
    children: Vec<NodeId>,
    unexpanded_actions: Vec<StateType::ActionType>,
}

impl<StateType: State> Node<StateType> {
    pub fn new(
        parent: Option<NodeId>,
        incoming_action: Option<StateType::ActionType>,
        state: StateType,
        player_count: usize,
    ) -> Node<StateType> {
        let unexpanded_actions = if state.terminal() {
            Vec::new()
        } else {
            state.permitted_actions()
        };
        Node {
            parent,
            incoming_action,
            state,
            visit_count: 0,
            score_sums: vec![0.0; player_count],
            children: Vec::new(),
            unexpanded_actions,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn incoming_action(&self) -> Option<StateType::ActionType> {
        self.incoming_action
    }

    pub fn state(&self) -> &StateType {
        &self.state
    }

    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }

    pub fn score_sums(&self) -> &[Reward] {
        &self.score_sums
    }

    pub fn score_sum(&self, player: usize) -> Reward {
        self.score_sums.get(player).copied().unwrap_or(0.0)
    }

    /// Average reward for `player` over every visit.
    ///
    /// Only meaningful once the node has been visited.
    pub fn exploit(&self, player: usize) -> f64 {
        self.score_sum(player) / self.visit_count as f64
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn unexpanded_actions(&self) -> &[StateType::ActionType] {
        &self.unexpanded_actions
    }

    pub fn fully_expanded(&self) -> bool {
        self.unexpanded_actions.is_empty()
    }

    pub fn visit(&mut self, reward: &[Reward]) {
        self.visit_count += 1;
        for (sum, r) in self.score_sums.iter_mut().zip(reward.iter()) {
            *sum += r;
        }
        trace!(
            "Visited {:?}: {} visits, sums {:?}",
            self.incoming_action,
            self.visit_count,
            self.score_sums
        );
    }

    pub(super) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(super) fn remove_child(&mut self, child: NodeId) {
        self.children.retain(|&id| id != child);
    }

    pub(super) fn take_unexpanded_action(&mut self, index: usize) -> StateType::ActionType {
        self.unexpanded_actions.swap_remove(index)
    }
}
