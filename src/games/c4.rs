use std::io;

use crate::game::Game;
use crate::shuct::game::{Action, Actor, State};

pub const BOARD_WIDTH: usize = 7;
pub const BOARD_HEIGHT: usize = 6;
const WIN_LENGTH: usize = 4;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum C4Action {
    Drop(u8),
}

impl Action for C4Action {
    type StateType = C4State;
    fn execute(&self, state: &C4State) -> C4State {
        let mut board = state.board.clone();
        let C4Action::Drop(column) = *self;
        let column = column as usize;
        if let Some(row) = (0..BOARD_HEIGHT)
            .rev()
            .find(|&row| board[row * BOARD_WIDTH + column] == C4Cell::Empty)
        {
            board[row * BOARD_WIDTH + column] = C4Cell::Filled(state.next_player);
        }
        let (terminal, reward) = match check_for_win(&board) {
            CheckForWinResult::Winner(0) => (true, vec![1.0, -1.0]),
            CheckForWinResult::Winner(_) => (true, vec![-1.0, 1.0]),
            CheckForWinResult::Stalemate => (true, vec![0.0, 0.0]),
            CheckForWinResult::Ongoing => (false, vec![0.0, 0.0]),
        };
        C4State {
            board,
            next_player: (state.next_player + 1) % 2,
            terminal,
            reward,
        }
    }
}

#[derive(PartialEq, Debug)]
enum CheckForWinResult {
    Winner(u8),
    Stalemate,
    Ongoing,
}

fn check_for_win(board: &[C4Cell]) -> CheckForWinResult {
    // Right, down, down-right, up-right
    const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];
    for row in 0..BOARD_HEIGHT as isize {
        for column in 0..BOARD_WIDTH as isize {
            let C4Cell::Filled(player) = board[row as usize * BOARD_WIDTH + column as usize] else {
                continue;
            };
            for (dx, dy) in DIRECTIONS {
                let in_line = (1..WIN_LENGTH as isize).all(|step| {
                    let x = column + dx * step;
                    let y = row + dy * step;
                    (0..BOARD_WIDTH as isize).contains(&x)
                        && (0..BOARD_HEIGHT as isize).contains(&y)
                        && board[y as usize * BOARD_WIDTH + x as usize] == C4Cell::Filled(player)
                });
                if in_line {
                    return CheckForWinResult::Winner(player);
                }
            }
        }
    }

    if board.iter().all(|&cell| cell != C4Cell::Empty) {
        CheckForWinResult::Stalemate
    } else {
        CheckForWinResult::Ongoing
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
enum C4Cell {
    Empty,
    Filled(u8),
}

#[derive(Clone, Debug)]
pub struct C4State {
    board: Vec<C4Cell>,
    next_player: u8,
    terminal: bool,
    reward: Vec<f64>,
}

impl State for C4State {
    type ActionType = C4Action;
    fn permitted_actions(&self) -> Vec<Self::ActionType> {
        if self.terminal {
            return vec![];
        }
        (0..BOARD_WIDTH)
            .filter(|&i| self.board[i] == C4Cell::Empty)
            .map(|i| C4Action::Drop(i as u8))
            .collect()
    }
    fn next_actor(&self) -> Actor<C4Action> {
        Actor::Player(self.next_player)
    }
    fn terminal(&self) -> bool {
        self.terminal
    }
    fn reward(&self) -> Vec<f64> {
        self.reward.clone()
    }
    fn player_count(&self) -> usize {
        2
    }
}

pub struct C4;

impl Game for C4 {
    type StateType = C4State;
    type ActionType = C4Action;
    fn visualise_state(&self, state: &Self::StateType) {
        for x in 0..BOARD_WIDTH {
            print!("{}", x);
        }
        println!();
        for y in 0..BOARD_HEIGHT {
            for x in 0..BOARD_WIDTH {
                print!(
                    "{}",
                    match state.board[y * BOARD_WIDTH + x] {
                        C4Cell::Empty => "◦",
                        C4Cell::Filled(0) => "●",
                        C4Cell::Filled(_) => "◯",
                    }
                )
            }
            println!();
        }
    }

    fn get_human_turn(&self, state: &Self::StateType) -> Self::ActionType {
        let permitted_actions = state.permitted_actions();
        loop {
            println!("Column?");
            let mut input = String::new();
            if io::stdin().read_line(&mut input).is_err() {
                continue;
            }
            match input.trim().parse::<u8>() {
                Ok(column) if permitted_actions.contains(&C4Action::Drop(column)) => {
                    return C4Action::Drop(column)
                }
                _ => println!("Can't drop there"),
            }
        }
    }

    fn init_game(&self) -> Self::StateType {
        C4State {
            board: vec![C4Cell::Empty; BOARD_HEIGHT * BOARD_WIDTH],
            next_player: 0,
            terminal: false,
            reward: vec![0.0, 0.0],
        }
    }

    fn player_count(&self) -> u8 {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn play(columns: &[u8]) -> C4State {
        columns
            .iter()
            .fold(C4.init_game(), |state, &column| {
                C4Action::Drop(column).execute(&state)
            })
    }

    #[test]
    fn test_vertical_win() {
        let state = play(&[3, 1, 3, 1, 3, 1, 3]);
        assert!(state.terminal());
        assert_eq!(state.reward(), vec![1.0, -1.0]);
        assert!(state.permitted_actions().is_empty());
    }

    #[test]
    fn test_diagonal_win_for_second_player() {
        // Player 1 builds / from (0, bottom) to (3, bottom - 3)
        let state = play(&[6, 0, 1, 1, 2, 2, 3, 2, 3, 3, 6, 3]);
        assert!(state.terminal());
        assert_eq!(state.reward(), vec![-1.0, 1.0]);
    }

    #[test]
    fn test_full_column_not_permitted() {
        let state = play(&[0, 0, 0, 0, 0, 0]);
        assert!(!state.terminal());
        assert!(!state.permitted_actions().contains(&C4Action::Drop(0)));
        assert_eq!(state.permitted_actions().len(), BOARD_WIDTH - 1);
    }
}
