use std::fmt;

use serde::{Deserialize, Serialize};

/// Offsets of the eight Moore neighbours, as `(row, column)` deltas.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A `(row, column)` coordinate on the board.
///
/// Positions are plain values: they may point outside any board, and only a
/// [`Bounds`] decides whether they are valid.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellPosition {
    pub row: i32,
    pub column: i32,
}

impl CellPosition {
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    pub fn row(&self) -> i32 {
        self.row
    }

    pub fn column(&self) -> i32 {
        self.column
    }

    /// Saturates at the `i32` limits, which no board reaches.
    pub fn offset(&self, d_row: i32, d_column: i32) -> Self {
        Self::new(
            self.row.saturating_add(d_row),
            self.column.saturating_add(d_column),
        )
    }

    /// The eight surrounding positions, not clipped to any bounds.
    pub fn neighbors(&self) -> impl Iterator<Item = CellPosition> + use<> {
        let origin = *self;
        NEIGHBOR_OFFSETS
            .into_iter()
            .map(move |(d_row, d_column)| origin.offset(d_row, d_column))
    }

    pub fn is_valid(&self, bounds: &Bounds) -> bool {
        bounds.contains(*self)
    }
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// An inclusive range of coordinates.
///
/// Construction never fails: a negative minimum is raised to zero and a
/// maximum below the minimum is raised to the minimum.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    min: i32,
    max: i32,
}

impl CellRange {
    pub fn new(min: i32, max: i32) -> Self {
        let min = min.max(0);
        let max = max.max(min);
        Self { min, max }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn length(&self) -> i64 {
        i64::from(self.max) - i64::from(self.min) + 1
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", self.min, self.max)
    }
}

/// Row and column ranges a position must fall into to be on the board.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub vertical: CellRange,
    pub horizontal: CellRange,
}

impl Bounds {
    pub fn new(vertical: CellRange, horizontal: CellRange) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// Zero-based bounds of a `rows` x `columns` grid. Both must be positive.
    pub fn for_grid(rows: i32, columns: i32) -> Self {
        Self::new(CellRange::new(0, rows - 1), CellRange::new(0, columns - 1))
    }

    pub fn rows(&self) -> i64 {
        self.vertical.length()
    }

    pub fn columns(&self) -> i64 {
        self.horizontal.length()
    }

    pub fn contains(&self, pos: CellPosition) -> bool {
        self.vertical.contains(pos.row) && self.horizontal.contains(pos.column)
    }

    /// Every position inside the bounds, row by row.
    pub fn positions(&self) -> impl Iterator<Item = CellPosition> + use<> {
        let horizontal = self.horizontal;
        (self.vertical.min()..=self.vertical.max()).flat_map(move |row| {
            (horizontal.min()..=horizontal.max()).map(move |column| CellPosition::new(row, column))
        })
    }
}

/// Settings a game is constructed from and restarted with.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameParams {
    pub rows: usize,
    pub columns: usize,
    pub mines: usize,
    pub lives: u32,
    /// Seed for mine placement; fresh entropy when absent.
    pub seed: Option<u64>,
}

impl GameParams {
    pub fn new(rows: usize, columns: usize, mines: usize, lives: u32) -> Self {
        Self {
            rows,
            columns,
            mines,
            lives,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn total_cells(&self) -> usize {
        self.rows * self.columns
    }
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            rows: 9,
            columns: 9,
            mines: 10,
            lives: 3,
            seed: None,
        }
    }
}
