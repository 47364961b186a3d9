use sapper_common::models::{Bounds, CellPosition};

/// Adjacent count stored on mined cells.
pub const MINE_SENTINEL: i8 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MineCell {
    pub(crate) position: CellPosition,
    pub(crate) mine: bool,
    pub(crate) open: bool,
    pub(crate) flagged: bool,
    pub(crate) adjacent: i8,
}

#[derive(Debug, Clone)]
pub struct MineField {
    pub(crate) rows: usize,
    pub(crate) columns: usize,
    pub(crate) bounds: Bounds,
    /// Live "mines remaining" counter, decremented on every detonation.
    pub(crate) mine_count: usize,
    /// Row-major.
    pub(crate) cells: Vec<MineCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub(crate) lives: u32,
    pub(crate) initial_lives: u32,
}
