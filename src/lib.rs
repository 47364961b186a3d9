//! Minesweeper engine with player lives and a saboteur that moves mines
//! while the game is running.
//!
//! [`MinesweeperGame`] drives a turn: it opens cells on the [`MineField`],
//! takes lives, lets the configured [`Saboteur`] act and reports every
//! change as a [`GameEvent`] to its subscribers.
//!
//! ```rust,no_run
//! use sapper::{CellPosition, GameParams, MinesweeperGame, RelocatingSaboteur};
//!
//! let mut game = MinesweeperGame::new(
//!     GameParams::new(9, 9, 10, 3),
//!     Some(Box::new(RelocatingSaboteur::new())),
//! )?;
//! let (_, mut events) = game.subscribe_channel();
//!
//! game.start_game();
//! game.open_cell(CellPosition::new(4, 4));
//!
//! while let Ok(event) = events.try_recv() {
//!     println!("{:?}", event);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod data;
pub mod events;
pub mod logic;
pub mod shared;

pub use data::{MINE_SENTINEL, MineCell, MineField, Player};
pub use events::{EventBus, GameListener};
pub use logic::{MinesweeperGame, RelocatingSaboteur, Saboteur, TurnContext};
pub use shared::{SharedGame, share};

// Re-export common types for convenience
pub use sapper_common::{models::*, protocol::*};
