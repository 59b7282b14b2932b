//! Creation of special pieces from long or crossing runs.
//!
//! Precedence, highest first:
//!
//! 1. A run of five or more becomes an area-clear at its middle cell
//!    (lower middle for even lengths).
//! 2. A cell shared by a horizontal and a vertical run of exactly four
//!    becomes an area-clear. Both runs are then used up.
//! 3. Any other run of exactly four becomes a row-clear (horizontal) or a
//!    column-clear (vertical) at its first cell not already claimed.
//!
//! Runs of three create nothing. The cell that receives a special keeps its
//! piece (unmarked, with the new kind); the rest of the run stays marked.

use crate::core::{Board, GRID_SIZE, PieceKind, Position};

use super::match_detector::MIN_RUN_LENGTH;

const AREA_RUN_LENGTH: usize = 5;
const LINE_RUN_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A maximal line of marked pieces of one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    start: Position,
    len: usize,
    orientation: Orientation,
}

impl Run {
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Returns the `index`-th cell of the run.
    #[must_use]
    pub fn cell(&self, index: usize) -> Position {
        debug_assert!(index < self.len);
        let (row, col) = match self.orientation {
            Orientation::Horizontal => (self.start.row(), self.start.col() + index),
            Orientation::Vertical => (self.start.row() + index, self.start.col()),
        };
        Position::new(row, col).expect("run cells lie on the board")
    }

    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.len).map(|i| self.cell(i))
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.cells().any(|p| p == pos)
    }
}

/// A special piece placed by [`synthesize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedSpecial {
    pub position: Position,
    pub kind: PieceKind,
}

/// Result of [`synthesize`].
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub board: Board,
    pub created: Vec<CreatedSpecial>,
}

/// Finds maximal runs of marked, same-colored pieces.
///
/// Horizontal runs come first (row-major), then vertical runs (column-major).
#[must_use]
pub fn find_runs(board: &Board) -> Vec<Run> {
    let mut runs = Vec::new();
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        for major in 0..GRID_SIZE {
            let at = |minor: usize| match orientation {
                Orientation::Horizontal => Position::new(major, minor),
                Orientation::Vertical => Position::new(minor, major),
            };
            let mut minor = 0;
            while minor < GRID_SIZE {
                let Some(piece) = at(minor).and_then(|pos| board.get(pos)) else {
                    minor += 1;
                    continue;
                };
                if !piece.is_marked() {
                    minor += 1;
                    continue;
                }
                let color = piece.color();
                let len = (minor..GRID_SIZE)
                    .map_while(|m| at(m).and_then(|pos| board.get(pos)))
                    .take_while(|p| p.is_marked() && p.color() == color)
                    .count();
                if len >= MIN_RUN_LENGTH {
                    runs.push(Run {
                        start: piece.position(),
                        len,
                        orientation,
                    });
                }
                minor += len;
            }
        }
    }
    runs
}

/// Turns qualifying runs on a marked board into special pieces.
#[must_use]
pub fn synthesize(board: &Board) -> Synthesis {
    let runs = find_runs(board);
    let mut created: Vec<CreatedSpecial> = Vec::new();
    let is_claimed =
        |created: &[CreatedSpecial], pos: Position| created.iter().any(|c| c.position == pos);

    for run in runs.iter().filter(|run| run.len >= AREA_RUN_LENGTH) {
        let position = run.cell((run.len - 1) / 2);
        if !is_claimed(&created, position) {
            created.push(CreatedSpecial {
                position,
                kind: PieceKind::AreaClear,
            });
        }
    }

    let fours: Vec<&Run> = runs.iter().filter(|run| run.len == LINE_RUN_LENGTH).collect();
    let mut used = vec![false; fours.len()];
    for (i, horizontal) in fours.iter().enumerate() {
        if horizontal.orientation != Orientation::Horizontal {
            continue;
        }
        for (j, vertical) in fours.iter().enumerate() {
            if vertical.orientation != Orientation::Vertical {
                continue;
            }
            let Some(position) = horizontal.cells().find(|pos| vertical.contains(*pos)) else {
                continue;
            };
            used[i] = true;
            used[j] = true;
            if !is_claimed(&created, position) {
                created.push(CreatedSpecial {
                    position,
                    kind: PieceKind::AreaClear,
                });
            }
        }
    }

    for (run, _) in fours.iter().zip(&used).filter(|(_, used)| !**used) {
        let kind = match run.orientation {
            Orientation::Horizontal => PieceKind::RowClear,
            Orientation::Vertical => PieceKind::ColumnClear,
        };
        if let Some(position) = run.cells().find(|pos| !is_claimed(&created, *pos)) {
            created.push(CreatedSpecial { position, kind });
        }
    }

    let mut board = board.clone();
    for special in &created {
        if let Some(piece) = board.get_mut(special.position) {
            piece.set_kind(special.kind);
            piece.set_marked(false);
        }
    }

    Synthesis { board, created }
}
