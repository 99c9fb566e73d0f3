/// Reasons a search can refuse to run, or fail to produce an action
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SearchError {
    /// The game is stochastic or not alternating-move
    #[error("{0} only supports deterministic, alternating-move games")]
    UnsupportedGame(String),

    #[error("Cannot select an action from a terminal state")]
    TerminalState,

    /// A non-terminal state offered no legal actions
    #[error("No legal actions available from a non-terminal state")]
    NoLegalActions,

    /// The search reached a state where the game, not a player, acts next
    #[error("Reached a chance node; only deterministic games can be searched")]
    ChanceNode,

    #[error("No budget: {0}")]
    NoBudget(String),

    /// The root had no children to choose from once the search stopped
    #[error("Search finished without any candidate actions")]
    NoCandidates,
}
