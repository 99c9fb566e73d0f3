use std::io;

use crate::game::Game;
use crate::shuct::game::{Action, Actor, State};

/// Heaps at the start of a game
pub const DEFAULT_HEAPS: [u8; 3] = [3, 4, 5];

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum NimAction {
    /// Take `count` objects from heap `heap`
    Take { heap: u8, count: u8 },
}

impl Action for NimAction {
    type StateType = NimState;
    fn execute(&self, state: &NimState) -> NimState {
        let NimAction::Take { heap, count } = *self;
        let mut heaps = state.heaps.clone();
        if let Some(objects) = heaps.get_mut(heap as usize) {
            *objects = objects.saturating_sub(count);
        }
        let winner = if heaps.iter().all(|&objects| objects == 0) {
            Some(state.next_player)
        } else {
            None
        };
        NimState {
            heaps,
            next_player: (state.next_player + 1) % state.player_count,
            player_count: state.player_count,
            winner,
        }
    }
}

///
/// Normal play Nim: whoever takes the last object wins.
///
#[derive(Clone, Debug, PartialEq)]
pub struct NimState {
    heaps: Vec<u8>,
    next_player: u8,
    player_count: u8,
    winner: Option<u8>,
}

impl NimState {
    pub fn new(heaps: &[u8], player_count: u8) -> NimState {
        NimState {
            heaps: heaps.to_vec(),
            next_player: 0,
            player_count,
            winner: None,
        }
    }

    pub fn heaps(&self) -> &[u8] {
        &self.heaps
    }

    /// XOR of the heap sizes; the player to move is losing a two player game when this is 0
    pub fn nim_sum(&self) -> u8 {
        self.heaps.iter().fold(0, |sum, &objects| sum ^ objects)
    }
}

impl State for NimState {
    type ActionType = NimAction;
    fn permitted_actions(&self) -> Vec<Self::ActionType> {
        self.heaps
            .iter()
            .enumerate()
            .flat_map(|(heap, &objects)| {
                (1..=objects).map(move |count| NimAction::Take {
                    heap: heap as u8,
                    count,
                })
            })
            .collect()
    }
    fn next_actor(&self) -> Actor<NimAction> {
        Actor::Player(self.next_player)
    }
    fn terminal(&self) -> bool {
        self.winner.is_some()
    }
    fn reward(&self) -> Vec<f64> {
        // Zero sum: the winner gets 1, the rest share -1
        let losers = (self.player_count as f64 - 1.0).max(1.0);
        (0..self.player_count)
            .map(|player| match self.winner {
                Some(winner) if winner == player => 1.0,
                Some(_) => -1.0 / losers,
                None => 0.0,
            })
            .collect()
    }
    fn player_count(&self) -> usize {
        self.player_count as usize
    }
}

pub struct Nim {
    pub heaps: Vec<u8>,
    pub player_count: u8,
}

impl Default for Nim {
    fn default() -> Self {
        Nim {
            heaps: DEFAULT_HEAPS.to_vec(),
            player_count: 2,
        }
    }
}

impl Game for Nim {
    type StateType = NimState;
    type ActionType = NimAction;

    fn visualise_state(&self, state: &Self::StateType) {
        for (heap, &objects) in state.heaps.iter().enumerate() {
            println!("{}: {}", heap, "|".repeat(objects as usize));
        }
        if let Some(winner) = state.winner {
            println!("Player {} wins", winner);
        }
    }

    fn get_human_turn(&self, state: &Self::StateType) -> Self::ActionType {
        let permitted_actions = state.permitted_actions();
        loop {
            println!("Heap and count?");
            let mut input = String::new();
            if io::stdin().read_line(&mut input).is_err() {
                continue;
            }
            let numbers: Vec<u8> = input
                .split_whitespace()
                .filter_map(|part| part.parse().ok())
                .collect();
            if let [heap, count] = numbers[..] {
                let action = NimAction::Take { heap, count };
                if permitted_actions.contains(&action) {
                    return action;
                }
            }
            println!("Can't take that");
        }
    }

    fn init_game(&self) -> Self::StateType {
        NimState::new(&self.heaps, self.player_count)
    }

    fn player_count(&self) -> u8 {
        self.player_count
    }
}
