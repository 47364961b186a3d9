use std::fmt;

use anyhow::{Result, ensure};
use rand::Rng;
use sapper_common::{
    models::{Bounds, CellPosition},
    protocol::CellView,
};
use tracing::{debug, trace, warn};

use crate::data::{MINE_SENTINEL, MineCell, MineField};

impl MineField {
    /// Creates a closed field without mines. Call
    /// [`place_mines_on_new_field`](Self::place_mines_on_new_field) to arm it.
    pub fn new(rows: usize, columns: usize, mine_count: usize) -> Result<Self> {
        validate_dimensions(rows, columns, mine_count)?;
        Ok(Self::blank(rows, columns, mine_count))
    }

    /// Dimensions must already be validated.
    pub(crate) fn blank(rows: usize, columns: usize, mine_count: usize) -> Self {
        let bounds = Bounds::for_grid(rows as i32, columns as i32);
        Self {
            rows,
            columns,
            bounds,
            mine_count,
            cells: bounds.positions().map(MineCell::new).collect(),
        }
    }

    fn index(&self, pos: CellPosition) -> Option<usize> {
        self.bounds
            .contains(pos)
            .then(|| pos.row as usize * self.columns + pos.column as usize)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn is_valid_position(&self, pos: CellPosition) -> bool {
        pos.is_valid(&self.bounds)
    }

    pub fn cell(&self, pos: CellPosition) -> Option<&MineCell> {
        self.index(pos).map(|index| &self.cells[index])
    }

    pub fn cell_at(&self, row: i32, column: i32) -> Option<&MineCell> {
        self.cell(CellPosition::new(row, column))
    }

    pub fn cell_mut(&mut self, pos: CellPosition) -> Option<&mut MineCell> {
        self.index(pos).map(|index| &mut self.cells[index])
    }

    pub fn cells(&self) -> impl Iterator<Item = &MineCell> {
        self.cells.iter()
    }

    /// Arms or disarms a single cell without touching any counts; follow up
    /// with [`calculate_all_adjacent_mines`](Self::calculate_all_adjacent_mines).
    pub fn set_mine(&mut self, pos: CellPosition, mine: bool) -> bool {
        match self.cell_mut(pos) {
            Some(cell) => {
                cell.set_mine(mine);
                true
            }
            None => false,
        }
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn increment_mine_count(&mut self) {
        self.mine_count += 1;
    }

    pub fn decrement_mine_count(&mut self) {
        self.mine_count = self.mine_count.saturating_sub(1);
    }

    /// Scatters `mine_count` mines uniformly over the field, then recomputes
    /// every adjacent count. If fewer cells are free than requested, the mine
    /// counter shrinks to the number actually placed.
    pub fn place_mines_on_new_field<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let target = self.mine_count;
        let mut remaining = target;
        let mut available: Vec<CellPosition> = self.bounds.positions().collect();

        while remaining > 0 && !available.is_empty() {
            let pos = available.swap_remove(rng.random_range(0..available.len()));
            if let Some(cell) = self.cell_mut(pos)
                && !cell.is_mine()
            {
                cell.set_mine(true);
                remaining -= 1;
            }
        }

        if remaining > 0 {
            warn!(
                "Only {} of {} mines fit on a {}x{} field",
                target - remaining,
                target,
                self.rows,
                self.columns
            );
            self.mine_count = target - remaining;
        }

        debug!(
            "Placed {} mines on a {}x{} field",
            self.mine_count, self.rows, self.columns
        );
        self.calculate_all_adjacent_mines();
    }

    fn count_adjacent_mines(&self, pos: CellPosition) -> i8 {
        pos.neighbors()
            .filter_map(|neighbor| self.cell(neighbor))
            .filter(|cell| cell.is_mine())
            .count() as i8
    }

    fn recalculate_cell(&mut self, pos: CellPosition) {
        let Some(index) = self.index(pos) else {
            return;
        };
        let count = if self.cells[index].is_mine() {
            MINE_SENTINEL
        } else {
            self.count_adjacent_mines(pos)
        };
        self.cells[index].set_adjacent_mines(count);
    }

    pub fn calculate_all_adjacent_mines(&mut self) {
        let counts: Vec<i8> = self
            .cells
            .iter()
            .map(|cell| {
                if cell.is_mine() {
                    MINE_SENTINEL
                } else {
                    self.count_adjacent_mines(cell.position())
                }
            })
            .collect();

        for (cell, count) in self.cells.iter_mut().zip(counts) {
            cell.set_adjacent_mines(count);
        }
    }

    /// Recomputes `pos` and its in-bounds neighbours only.
    pub fn recalculate_adjacent_mines_around(&mut self, pos: CellPosition) {
        if !self.is_valid_position(pos) {
            return;
        }
        self.recalculate_cell(pos);
        for neighbor in pos.neighbors() {
            self.recalculate_cell(neighbor);
        }
    }

    /// Opens `pos`, cascading through zero-count cells. Returns `true` only
    /// when the opened cell itself is a mine.
    ///
    /// Invalid, open and flagged cells are left alone. A cascade never
    /// opens a mine, since it only spreads from cells with no mined
    /// neighbours.
    pub fn open_cell_recursive(&mut self, pos: CellPosition) -> bool {
        let Some(cell) = self.cell_mut(pos) else {
            return false;
        };
        if cell.is_open() || cell.is_flagged() {
            return false;
        }

        cell.set_open(true);
        if cell.is_mine() {
            debug!("Mine detonated at {}", pos);
            return true;
        }
        if cell.adjacent_mines() != 0 {
            return false;
        }

        let mut pending = vec![pos];
        while let Some(current) = pending.pop() {
            for neighbor in current.neighbors() {
                let Some(cell) = self.cell_mut(neighbor) else {
                    continue;
                };
                if cell.is_open() || cell.is_flagged() {
                    continue;
                }
                cell.set_open(true);
                if !cell.is_mine() && cell.adjacent_mines() == 0 {
                    pending.push(neighbor);
                }
            }
        }

        trace!("Flood fill from {} finished", pos);
        false
    }

    /// Moves the mine at `from` onto `to`. Requires `from` to be mined and
    /// `to` to be unmined and closed; otherwise nothing changes.
    pub fn relocate_mine(&mut self, from: CellPosition, to: CellPosition) -> bool {
        let (Some(from_index), Some(to_index)) = (self.index(from), self.index(to)) else {
            return false;
        };
        let (source, target) = (&self.cells[from_index], &self.cells[to_index]);
        if !source.is_mine() || target.is_mine() || target.is_open() {
            return false;
        }

        let source = &mut self.cells[from_index];
        source.set_mine(false);
        source.set_open(false);
        source.set_flagged(false);
        self.cells[to_index].set_mine(true);

        self.recalculate_adjacent_mines_around(from);
        self.recalculate_adjacent_mines_around(to);
        true
    }

    /// Mines that have not been opened yet.
    pub fn active_mines(&self) -> Vec<CellPosition> {
        self.cells
            .iter()
            .filter(|cell| cell.is_mine() && !cell.is_open())
            .map(MineCell::position)
            .collect()
    }

    /// Closed, unmined cells touching the opened region.
    pub fn boundary_cells_for_relocation(&self) -> Vec<CellPosition> {
        self.cells
            .iter()
            .filter(|cell| !cell.is_open() && !cell.is_mine())
            .filter(|cell| {
                cell.position()
                    .neighbors()
                    .any(|neighbor| self.cell(neighbor).is_some_and(MineCell::is_open))
            })
            .map(MineCell::position)
            .collect()
    }

    pub fn number_of_opened_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_open()).count()
    }

    pub fn number_of_flagged_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_flagged()).count()
    }

    /// Tally of mined cells, independent of the live mine counter.
    pub fn actual_mine_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_mine()).count()
    }

    /// Opens every closed mine and returns how many were opened.
    pub fn reveal_all_mines(&mut self) -> usize {
        let mut revealed = 0;
        for cell in self.cells.iter_mut() {
            if cell.is_mine() && !cell.is_open() {
                cell.set_open(true);
                revealed += 1;
            }
        }
        revealed
    }

    pub fn snapshot_cells(&self) -> Vec<Vec<CellView>> {
        self.cells
            .iter()
            .map(|cell| cell.into())
            .collect::<Vec<CellView>>()
            .chunks(self.columns)
            .map(|chunk| chunk.to_vec())
            .collect()
    }
}

/// Largest number of cells a field may hold.
pub(crate) const MAX_CELLS: usize = i32::MAX as usize;

pub(crate) fn validate_dimensions(rows: usize, columns: usize, mine_count: usize) -> Result<()> {
    ensure!(
        rows > 0 && columns > 0,
        "field dimensions must be positive, got {rows}x{columns}"
    );
    ensure!(
        i32::try_from(rows).is_ok() && i32::try_from(columns).is_ok(),
        "field dimensions {rows}x{columns} are too large"
    );
    let total = rows
        .checked_mul(columns)
        .filter(|&total| total <= MAX_CELLS)
        .ok_or_else(|| anyhow::anyhow!("field dimensions {rows}x{columns} are too large"))?;
    ensure!(
        mine_count <= total,
        "mine count {mine_count} does not fit on a {rows}x{columns} field"
    );
    Ok(())
}

impl fmt::Display for MineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.cells.chunks(self.columns).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for cell in chunk {
                write!(f, "{cell}")?;
            }
        }
        Ok(())
    }
}
