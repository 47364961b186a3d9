mod cell;
mod field;
mod game;
mod player;
mod saboteur;

pub use game::MinesweeperGame;
pub use saboteur::{RelocatingSaboteur, Saboteur, TurnContext};
