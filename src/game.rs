use crate::shuct::game::{Action, State};

///
/// Describes a whole game rather than a single position: how to start it, how to show it,
/// and which kinds of search can be used on it.
///
pub trait Game {
    type StateType: State<ActionType = Self::ActionType>;
    type ActionType: Action<StateType = Self::StateType>;
    fn visualise_state(&self, state: &Self::StateType);
    fn get_human_turn(&self, state: &Self::StateType) -> Self::ActionType;
    fn init_game(&self) -> Self::StateType;
    fn player_count(&self) -> u8;

    /// Whether the game has chance events (dice, card draws and the like)
    fn is_stochastic(&self) -> bool {
        false
    }

    /// Whether exactly one player moves per turn
    fn is_alternating_move(&self) -> bool {
        true
    }
}
