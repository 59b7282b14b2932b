use serde::{Deserialize, Serialize};

/// Width and height of the square playing grid.
pub const GRID_SIZE: usize = 8;

/// A cell coordinate on the grid.
///
/// Rows grow downwards (row 0 is the top of the board) and columns grow to
/// the right. A `Position` is always inside the grid; constructors return
/// `None` for out-of-range coordinates.
///
/// # Example
///
/// ```
/// use sweet_galaxy_engine::Position;
///
/// let pos = Position::new(3, 4).unwrap();
/// assert!(pos.is_adjacent(pos.right().unwrap()));
/// assert!(Position::new(8, 0).is_none());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("({row}, {col})")]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn new(row: usize, col: usize) -> Option<Self> {
        if row < GRID_SIZE && col < GRID_SIZE {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.row as usize
    }

    #[must_use]
    pub const fn col(self) -> usize {
        self.col as usize
    }

    /// Iterates over every cell in row-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).filter_map(move |col| Self::new(row, col)))
    }

    #[must_use]
    pub fn up(self) -> Option<Self> {
        Self::new(self.row().checked_sub(1)?, self.col())
    }

    #[must_use]
    pub fn down(self) -> Option<Self> {
        Self::new(self.row() + 1, self.col())
    }

    #[must_use]
    pub fn left(self) -> Option<Self> {
        Self::new(self.row(), self.col().checked_sub(1)?)
    }

    #[must_use]
    pub fn right(self) -> Option<Self> {
        Self::new(self.row(), self.col() + 1)
    }

    /// Returns `true` if `other` shares an edge with `self`.
    #[must_use]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.row().abs_diff(other.row()) + self.col().abs_diff(other.col()) == 1
    }

    /// The 3×3 block centred on this cell, clipped at the board edges.
    ///
    /// Includes the cell itself.
    pub fn area(self) -> impl Iterator<Item = Self> {
        let rows = self.row().saturating_sub(1)..=usize::min(self.row() + 1, GRID_SIZE - 1);
        rows.flat_map(move |row| {
            let cols = self.col().saturating_sub(1)..=usize::min(self.col() + 1, GRID_SIZE - 1);
            cols.filter_map(move |col| Self::new(row, col))
        })
    }
}
