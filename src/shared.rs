use std::sync::Arc;

use tokio::sync::Mutex;

use crate::logic::MinesweeperGame;

/// A game that several input sources may drive. Each action runs to
/// completion, events included, while the lock is held.
pub type SharedGame = Arc<Mutex<MinesweeperGame>>;

pub fn share(game: MinesweeperGame) -> SharedGame {
    Arc::new(Mutex::new(game))
}
