use std::fmt;

use sapper_common::{models::CellPosition, protocol::CellView};

use crate::data::MineCell;

impl MineCell {
    /// A closed, unmined, unflagged cell with no adjacent mines.
    pub fn new(position: CellPosition) -> Self {
        Self {
            position,
            mine: false,
            open: false,
            flagged: false,
            adjacent: 0,
        }
    }

    pub fn position(&self) -> CellPosition {
        self.position
    }

    pub fn is_mine(&self) -> bool {
        self.mine
    }

    pub fn set_mine(&mut self, mine: bool) {
        self.mine = mine;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opening a cell always drops its flag.
    pub fn set_open(&mut self, open: bool) {
        self.open = open;
        if open {
            self.flagged = false;
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub fn toggle_flag(&mut self) {
        if !self.open {
            self.flagged = !self.flagged;
        }
    }

    /// Flags can only be placed on closed cells, but can always be cleared.
    pub fn set_flagged(&mut self, flagged: bool) {
        if !self.open || !flagged {
            self.flagged = flagged;
        }
    }

    /// Number of mined neighbours, or [`MINE_SENTINEL`](crate::data::MINE_SENTINEL) for a mined cell.
    pub fn adjacent_mines(&self) -> i8 {
        self.adjacent
    }

    pub fn set_adjacent_mines(&mut self, count: i8) {
        self.adjacent = count;
    }

    pub fn reset(&mut self) {
        self.mine = false;
        self.open = false;
        self.flagged = false;
        self.adjacent = 0;
    }
}

impl fmt::Display for MineCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flagged {
            write!(f, "F")
        } else if !self.open {
            write!(f, "#")
        } else if self.mine {
            write!(f, "*")
        } else if self.adjacent > 0 {
            write!(f, "{}", self.adjacent)
        } else {
            write!(f, " ")
        }
    }
}

impl From<&MineCell> for CellView {
    fn from(value: &MineCell) -> Self {
        match (value.open, value.flagged) {
            (false, true) => Self::Flagged,
            (false, false) => Self::Hidden,
            (true, _) if value.mine => Self::Mine,
            (true, _) => Self::Revealed {
                adjacent: value.adjacent.max(0) as u8,
            },
        }
    }
}
