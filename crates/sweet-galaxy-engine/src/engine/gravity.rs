use crate::core::{Board, GRID_SIZE, Piece, Topology};

use super::board_generator::PieceGenerator;

/// Removes marked pieces, lets survivors fall and refills the gaps.
///
/// Columns are handled independently. Only cells that hold pieces take
/// part; voids and obstructions are skipped over, so a piece may fall past
/// them. Survivors keep their top-to-bottom order and settle into the
/// lowest cells of the column. Cells left over at the top get fresh plain
/// pieces from `generator`; new runs formed by the refill are left for the
/// next cascade iteration.
#[must_use]
pub fn apply(board: &Board, topology: &Topology, generator: &mut PieceGenerator) -> Board {
    let mut next = Board::EMPTY;
    for col in 0..GRID_SIZE {
        let cells: Vec<_> = topology.piece_cells_in_column(col).collect();
        let survivors: Vec<Piece> = cells
            .iter()
            .filter_map(|pos| board.get(*pos))
            .filter(|piece| !piece.is_marked())
            .copied()
            .collect();

        let empty = cells.len() - survivors.len();
        for (pos, piece) in cells[empty..].iter().zip(survivors) {
            next.place(*pos, piece);
        }
        for pos in &cells[..empty] {
            next.place(*pos, generator.next_piece(*pos));
        }
    }
    next
}
