use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use super::{
    piece::{Piece, PieceColor, PieceId},
    position::{GRID_SIZE, Position},
    topology::Topology,
};

/// The grid of pieces.
///
/// Each cell holds at most one [`Piece`]. Whenever a piece is stored the
/// board rewrites its position, so [`Piece::position`] always agrees with
/// the cell that holds it.
///
/// Boards are plain values: the pipeline stages of the engine take a board
/// by reference and return a new one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<Piece>; GRID_SIZE]; GRID_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('\n')?;
        for row in &self.cells {
            for cell in row {
                let c = match cell {
                    None => '.',
                    Some(piece) if piece.is_marked() => piece.color().as_char().to_ascii_lowercase(),
                    Some(piece) => piece.color().as_char(),
                };
                f.write_char(c)?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

impl Board {
    pub const EMPTY: Self = Self {
        cells: [[None; GRID_SIZE]; GRID_SIZE],
    };

    #[must_use]
    pub fn get(&self, pos: Position) -> Option<&Piece> {
        self.cells[pos.row()][pos.col()].as_ref()
    }

    pub(crate) fn get_mut(&mut self, pos: Position) -> Option<&mut Piece> {
        self.cells[pos.row()][pos.col()].as_mut()
    }

    /// Stores `piece` at `pos`, updating the piece's position.
    ///
    /// Returns the piece previously stored there.
    pub fn place(&mut self, pos: Position, mut piece: Piece) -> Option<Piece> {
        piece.set_position(pos);
        self.cells[pos.row()][pos.col()].replace(piece)
    }

    /// Removes and returns the piece at `pos`.
    pub fn take(&mut self, pos: Position) -> Option<Piece> {
        self.cells[pos.row()][pos.col()].take()
    }

    /// Exchanges the contents of two cells.
    pub fn swap(&mut self, a: Position, b: Position) {
        let piece_a = self.take(a);
        let piece_b = self.take(b);
        if let Some(piece) = piece_b {
            self.place(a, piece);
        }
        if let Some(piece) = piece_a {
            self.place(b, piece);
        }
    }

    /// Returns the color at `pos`, if a piece is there.
    #[must_use]
    pub fn color_at(&self, pos: Position) -> Option<PieceColor> {
        self.get(pos).map(Piece::color)
    }

    /// Iterates over all pieces in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.cells.iter().flatten().flatten()
    }

    /// Returns an iterator over the rows of the board, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Piece>; GRID_SIZE]> {
        self.cells.iter()
    }

    /// Iterates over pieces flagged for removal.
    pub fn marked_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces().filter(|piece| piece.is_marked())
    }

    #[must_use]
    pub fn has_marked(&self) -> bool {
        self.pieces().any(Piece::is_marked)
    }

    #[must_use]
    pub fn position_of(&self, id: PieceId) -> Option<Position> {
        self.pieces()
            .find(|piece| piece.id() == id)
            .map(Piece::position)
    }

    pub(crate) fn pieces_mut(&mut self) -> impl Iterator<Item = &mut Piece> {
        self.cells.iter_mut().flatten().flatten()
    }

    pub(crate) fn mark(&mut self, pos: Position) {
        if let Some(piece) = self.get_mut(pos) {
            piece.set_marked(true);
        }
    }

    pub(crate) fn clear_marks(&mut self) {
        for piece in self.pieces_mut() {
            piece.set_marked(false);
        }
    }

    /// Returns `true` if every cell agrees with `topology`: cells that
    /// cannot hold a piece are empty and every stored piece knows its cell.
    #[must_use]
    pub fn is_consistent_with(&self, topology: &Topology) -> bool {
        Position::all().all(|pos| match self.get(pos) {
            Some(piece) => topology.get(pos).holds_piece() && piece.position() == pos,
            None => true,
        })
    }

    /// Parses a board from one string per row.
    ///
    /// Each character is a color letter (see [`PieceColor::as_char`]) or `.`
    /// for an empty cell. Pieces get consecutive ids in row-major order.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: [&str; GRID_SIZE]) -> Self {
        let mut board = Self::EMPTY;
        let mut next_id = 0;
        for (row, line) in rows.iter().enumerate() {
            assert_eq!(line.len(), GRID_SIZE, "row {row} has wrong width");
            for (col, c) in line.chars().enumerate() {
                let Some(color) = PieceColor::from_char(c) else {
                    continue;
                };
                let pos = Position::new(row, col).unwrap();
                board.place(pos, Piece::new(PieceId::new(next_id), color, pos));
                next_id += 1;
            }
        }
        board
    }
}
