use super::Reward;
use rand::Rng;
use std::fmt::Debug;

pub trait Action: Debug + Clone + Copy + Eq + std::hash::Hash {
    type StateType: State<ActionType = Self>;
    fn execute(&self, state: &Self::StateType) -> Self::StateType;
}

///
/// An actor is either a player or a game action.
///
/// A player is just an identifier, a number between 0 and n-1.
///
/// A game action is an action that the game takes (such as rolling a dice), rather than a player.
/// The search only supports deterministic games, so it refuses to search through these.
#[derive(Debug)]
pub enum Actor<ActionType> {
    Player(u8),
    GameAction(Vec<ActionType>),
}

pub trait State: Clone {
    type ActionType: Action<StateType = Self>;
    fn permitted_actions(&self) -> Vec<Self::ActionType>;
    fn next_actor(&self) -> Actor<Self::ActionType>;
    fn terminal(&self) -> bool;
    /// One reward per player, conventionally in [-1, 1].
    ///
    /// Called on terminal states, and on states where a play out hit its move cap.
    fn reward(&self) -> Vec<Reward>;
    fn player_count(&self) -> usize;

    ///
    /// Random play out from this state until it is terminal or `max_moves` moves have been made.
    ///
    /// Works on its own copy; `self` is never touched.
    fn play_out<R: Rng + ?Sized>(&self, rng: &mut R, max_moves: Option<usize>) -> Self {
        let mut cur_state = self.clone();
        let mut moves = 0;
        while !cur_state.terminal() && max_moves.map_or(true, |cap| moves < cap) {
            let permitted_actions = cur_state.permitted_actions();
            if permitted_actions.is_empty() {
                break;
            }
            let action = permitted_actions[rng.gen_range(0..permitted_actions.len())];
            cur_state = action.execute(&cur_state);
            moves += 1;
        }
        cur_state
    }
}
