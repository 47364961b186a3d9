use serde::{Deserialize, Serialize};

use crate::models::CellPosition;

/// What a view may show for a single cell.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum CellView {
    #[serde(rename = "hidden")]
    Hidden,
    #[serde(rename = "flagged")]
    Flagged,
    #[serde(rename = "revealed")]
    Revealed { adjacent: u8 },
    #[serde(rename = "mine")]
    Mine,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    #[default]
    NotStarted,
    Playing,
    Won,
    Lost,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    GameStarted,
    CellUpdated,
    FieldUpdated,
    LivesChanged,
    SaboteurAction,
    GameOverWon,
    GameOverLost,
}

/// A notification from the game to its views.
///
/// Only `CellUpdated` carries a position.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GameEvent {
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position: Option<CellPosition>,
}

impl GameEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            position: None,
        }
    }

    pub fn at(kind: EventKind, position: CellPosition) -> Self {
        Self {
            kind,
            position: Some(position),
        }
    }
}

/// Full view of a game, suitable for (re)drawing a board from scratch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub rows: usize,
    pub columns: usize,
    /// Live mine counter; decreases when a mine is detonated.
    pub mines_remaining: usize,
    pub lives: u32,
    pub state: GameState,
    pub field: Vec<Vec<CellView>>,
}
