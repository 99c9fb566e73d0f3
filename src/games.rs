mod c4;
mod nim;

pub use c4::{C4Action, C4State, C4};
pub use nim::{Nim, NimAction, NimState};

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Games {
    C4,
    Nim,
}
