use super::error::SearchError;
use super::game::{Action, Actor, State};
use super::node::{Node, NodeId};
use super::tie_break::best_with_random_ties;
use super::Reward;
use log::{trace, warn};
use rand::Rng;

///
/// Search tree for a single decision.
///
/// Nodes live in an arena and refer to each other by index. Children are owned through the
/// arena; the parent index is only used to walk back up to the root.
///
pub struct Tree<StateType: State> {
    nodes: Vec<Node<StateType>>,
    player_count: usize,
    play_out_cap: Option<usize>,
}

impl<StateType: State> Tree<StateType> {
    pub const ROOT: NodeId = 0;

    pub fn new(root_state: StateType, play_out_cap: Option<usize>) -> Tree<StateType> {
        let player_count = root_state.player_count();
        Tree {
            nodes: vec![Node::new(None, None, root_state, player_count)],
            player_count,
            play_out_cap,
        }
    }

    pub fn node(&self, id: NodeId) -> &Node<StateType> {
        &self.nodes[id]
    }

    pub fn root(&self) -> &Node<StateType> {
        &self.nodes[Self::ROOT]
    }

    /// Number of nodes ever created, including detached ones
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// The player to act at `id`
    pub fn mover(&self, id: NodeId) -> Result<usize, SearchError> {
        match self.nodes[id].state().next_actor() {
            Actor::Player(player_id) => Ok(player_id as usize),
            Actor::GameAction(_) => Err(SearchError::ChanceNode),
        }
    }

    pub fn exploit(&self, id: NodeId, player: usize) -> f64 {
        self.nodes[id].exploit(player)
    }

    pub fn create_child(
        &mut self,
        parent: NodeId,
        action: StateType::ActionType,
        state: StateType,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes
            .push(Node::new(Some(parent), Some(action), state, self.player_count));
        self.nodes[parent].push_child(id);
        id
    }

    /// Removes `child` from future search. The node itself stays in the arena until the tree is
    /// dropped.
    pub fn detach_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].remove_child(child);
    }

    ///
    /// One step down from `id`: expands a random unexpanded action if there is one, otherwise
    /// picks the child with the best UCB1 value for the player to act at `id`.
    ///
    pub fn select_child<R: Rng + ?Sized>(
        &mut self,
        id: NodeId,
        rng: &mut R,
    ) -> Result<NodeId, SearchError> {
        let mover = self.mover(id)?;

        let unexpanded = self.nodes[id].unexpanded_actions().len();
        if unexpanded > 0 {
            let action = self.nodes[id].take_unexpanded_action(rng.gen_range(0..unexpanded));
            let state = action.execute(self.nodes[id].state());
            return Ok(self.create_child(id, action, state));
        }

        let node = &self.nodes[id];
        let two_parent_log = 2.0 * f64::from(node.visit_count().max(1)).ln();
        let ucbs = node.children().iter().map(|&child_id| {
            let child = &self.nodes[child_id];
            let exploit = child.exploit(mover);
            let explore = (two_parent_log / child.visit_count() as f64).sqrt();
            trace!(
                "UCB action: {:?}, score_sum: {}, visit_count: {}, exploit: {}, explore: {}",
                child.incoming_action(),
                child.score_sum(mover),
                child.visit_count(),
                exploit,
                explore
            );
            (child_id, exploit + explore)
        });
        best_with_random_ties(ucbs, rng).ok_or(SearchError::NoLegalActions)
    }

    ///
    /// Descends from `from` until reaching a terminal state or a freshly expanded node
    ///
    pub fn selection<R: Rng + ?Sized>(
        &mut self,
        from: NodeId,
        rng: &mut R,
    ) -> Result<NodeId, SearchError> {
        let mut current = from;
        loop {
            if self.nodes[current].state().terminal() {
                break;
            }
            current = self.select_child(current, rng)?;
            if self.nodes[current].visit_count() == 0 {
                break;
            }
        }
        Ok(current)
    }

    pub fn play_out<R: Rng + ?Sized>(&self, id: NodeId, rng: &mut R) -> Vec<Reward> {
        let state = self.nodes[id].state();
        let reward = if state.terminal() {
            state.reward()
        } else {
            state.play_out(rng, self.play_out_cap).reward()
        };
        if reward.len() < self.player_count {
            warn!(
                "Reward {:?} is shorter than the player count {}; missing players get 0",
                reward, self.player_count
            );
        }
        trace!("Reward is {:?}", reward);
        reward
    }

    /// Adds `reward` to every node from `from` up to and including the root
    pub fn propagate_reward(&mut self, from: NodeId, reward: &[Reward]) {
        let mut current = Some(from);
        while let Some(id) = current {
            self.nodes[id].visit(reward);
            current = self.nodes[id].parent();
        }
    }

    ///
    /// A full MCTS iteration starting at `from`: select, expand, play out, propagate.
    ///
    /// Returns the node the play out ran from.
    ///
    pub fn iterate<R: Rng + ?Sized>(
        &mut self,
        from: NodeId,
        rng: &mut R,
    ) -> Result<NodeId, SearchError> {
        let leaf = self.selection(from, rng)?;
        let reward = self.play_out(leaf, rng);
        self.propagate_reward(leaf, &reward);
        Ok(leaf)
    }
}
