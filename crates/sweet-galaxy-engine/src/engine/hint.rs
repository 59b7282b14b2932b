use serde::{Deserialize, Serialize};

use crate::core::{Board, Position, Topology};

use super::match_detector;

/// A swap of two adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{from} <-> {to}")]
pub struct SwapMove {
    pub from: Position,
    pub to: Position,
}

impl SwapMove {
    #[must_use]
    pub const fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }
}

/// Finds the first swap that creates a match.
///
/// Cells are scanned in row-major order; at each cell the swap with the
/// right neighbour is tried before the one with the cell below. Both cells
/// must hold a piece and be swappable. The board is not modified.
#[must_use]
pub fn find_hint(board: &Board, topology: &Topology) -> Option<SwapMove> {
    let mut scratch = board.clone();
    Position::all()
        .flat_map(|pos| {
            [pos.right(), pos.down()]
                .into_iter()
                .flatten()
                .map(move |next| SwapMove::new(pos, next))
        })
        .find(|mv| {
            if !is_candidate(board, topology, *mv) {
                return false;
            }
            scratch.swap(mv.from, mv.to);
            let found = match_detector::has_matches(&scratch);
            scratch.swap(mv.from, mv.to);
            found
        })
}

/// Returns `true` if no swap on the board creates a match.
#[must_use]
pub fn is_deadlocked(board: &Board, topology: &Topology) -> bool {
    find_hint(board, topology).is_none()
}

fn is_candidate(board: &Board, topology: &Topology, mv: SwapMove) -> bool {
    [mv.from, mv.to]
        .into_iter()
        .all(|pos| board.get(pos).is_some() && topology.get(pos).is_swappable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CellKind, GRID_SIZE, Piece, PieceColor, PieceId};

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    /// Board where equal colors are at least three cells apart along every
    /// row and column, so no single swap can line up three.
    fn deadlocked_board() -> Board {
        let mut board = Board::EMPTY;
        let mut id = 0;
        for p in Position::all() {
            let color = PieceColor::ALL[(2 * p.row() + p.col()) % PieceColor::LEN];
            board.place(p, Piece::new(PieceId::new(id), color, p));
            id += 1;
        }
        board
    }

    #[test]
    fn test_deadlocked_board() {
        let board = deadlocked_board();
        assert!(!match_detector::has_matches(&board));
        assert_eq!(find_hint(&board, &Topology::PLAYABLE), None);
        assert!(is_deadlocked(&board, &Topology::PLAYABLE));
    }

    #[test]
    fn test_horizontal_neighbour_first() {
        // swapping (0,2)<->(0,3) completes RRR in row 0;
        // swapping (0,2)<->(1,2) would do so too
        let board = Board::from_rows([
            "RRGR....", "BYRB....", "........", "........", "........", "........", "........",
            "........",
        ]);
        assert_eq!(
            find_hint(&board, &Topology::PLAYABLE),
            Some(SwapMove::new(pos(0, 2), pos(0, 3)))
        );
    }

    #[test]
    fn test_vertical_hint() {
        let board = Board::from_rows([
            "R.......", "R.......", "G.......", "R.......", "........", "........", "........",
            "........",
        ]);
        assert_eq!(
            find_hint(&board, &Topology::PLAYABLE),
            Some(SwapMove::new(pos(2, 0), pos(3, 0)))
        );
    }

    #[test]
    fn test_locked_cells_are_skipped() {
        let board = Board::from_rows([
            "RRGR....", "BYOB....", "........", "........", "........", "........", "........",
            "........",
        ]);
        let mut topology = Topology::PLAYABLE;
        assert!(find_hint(&board, &topology).is_some());
        topology.set(pos(0, 3), CellKind::Locked);
        assert_eq!(find_hint(&board, &topology), None);
    }

    #[test]
    fn test_hint_leaves_board_untouched() {
        let board = deadlocked_board();
        let before = board.clone();
        let _ = find_hint(&board, &Topology::PLAYABLE);
        assert_eq!(board, before);
        assert_eq!(board.pieces().count(), GRID_SIZE * GRID_SIZE);
    }
}
