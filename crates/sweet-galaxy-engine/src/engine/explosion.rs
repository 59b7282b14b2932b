//! Blast expansion of special pieces and swap-time combinations.

use arrayvec::ArrayVec;

use crate::core::{Board, GRID_SIZE, Piece, PieceColor, PieceId, PieceKind, Position};

/// Maximum number of pieces on a board.
pub const MAX_PIECES: usize = GRID_SIZE * GRID_SIZE;

/// Specials caught in a blast without activating in the same iteration.
pub type PrimedSpecials = ArrayVec<PieceId, MAX_PIECES>;

/// Result of [`resolve`].
#[derive(Debug, Clone)]
pub struct Explosion {
    /// The input with every blasted piece marked.
    pub board: Board,
    /// Specials hit by a blast that stay on the board until the next
    /// iteration, where they activate.
    pub primed: PrimedSpecials,
}

/// Expands the removal set with the blast of every marked special.
///
/// Only specials already marked on the input activate. A special that gets
/// hit by one of those blasts is left unmarked and reported as primed
/// instead, so chain reactions unfold one cascade iteration at a time.
#[must_use]
pub fn resolve(board: &Board) -> Explosion {
    let triggers: Vec<Piece> = board
        .marked_pieces()
        .filter(|piece| piece.is_special())
        .copied()
        .collect();

    let mut exploded = board.clone();
    for trigger in &triggers {
        for pos in blast_area(board, trigger) {
            exploded.mark(pos);
        }
    }

    let mut primed = PrimedSpecials::new();
    for pos in Position::all() {
        let Some(piece) = exploded.get_mut(pos) else {
            continue;
        };
        let was_marked = board.get(pos).is_some_and(Piece::is_marked);
        if piece.is_marked() && piece.is_special() && !was_marked {
            piece.set_marked(false);
            primed.push(piece.id());
        }
    }

    if !triggers.is_empty() {
        log::debug!(
            "{} special(s) exploded, {} primed",
            triggers.len(),
            primed.len()
        );
    }

    Explosion {
        board: exploded,
        primed,
    }
}

/// Cells hit when `piece` goes off.
fn blast_area(board: &Board, piece: &Piece) -> Vec<Position> {
    let origin = piece.position();
    match piece.kind() {
        PieceKind::Plain => vec![origin],
        PieceKind::RowClear => (0..GRID_SIZE)
            .filter_map(|col| Position::new(origin.row(), col))
            .collect(),
        PieceKind::ColumnClear => (0..GRID_SIZE)
            .filter_map(|row| Position::new(row, origin.col()))
            .collect(),
        PieceKind::AreaClear => origin.area().collect(),
        PieceKind::ColorClear { target } => {
            let color = target.unwrap_or_else(|| most_frequent_color(board));
            let mut cells: Vec<Position> = board
                .pieces()
                .filter(|p| p.color() == color)
                .map(Piece::position)
                .collect();
            cells.push(origin);
            cells
        }
    }
}

/// Most common color among pieces that are not color-clears.
///
/// Ties go to the color that comes first in palette order.
#[must_use]
pub fn most_frequent_color(board: &Board) -> PieceColor {
    let mut counts = [0_usize; PieceColor::LEN];
    for piece in board.pieces().filter(|p| !p.kind().is_color_clear()) {
        counts[piece.color().index()] += 1;
    }
    let mut best = PieceColor::ALL[0];
    for color in PieceColor::ALL {
        if counts[color.index()] > counts[best.index()] {
            best = color;
        }
    }
    best
}

/// Applies the swap-time combination of the pieces at `from` and `to`.
///
/// A combination happens when at least one of the two is a color-clear, or
/// when both are specials. The pieces stay in their cells and both become
/// color-clears:
///
/// * color-clear with a non-color-clear piece: both target the color of the
///   non-color-clear piece,
/// * any other pair: both target the color of the piece at `from`.
///
/// Returns `None` (and leaves the board alone) when the pair does not
/// combine.
pub fn combine(board: &mut Board, from: Position, to: Position) -> Option<[PieceId; 2]> {
    let a = *board.get(from)?;
    let b = *board.get(to)?;

    let target = match (a.kind().is_color_clear(), b.kind().is_color_clear()) {
        (true, false) => b.color(),
        (false, true) => a.color(),
        (true, true) => a.color(),
        (false, false) if a.is_special() && b.is_special() => a.color(),
        (false, false) => return None,
    };

    for pos in [from, to] {
        if let Some(piece) = board.get_mut(pos) {
            piece.set_kind(PieceKind::ColorClear {
                target: Some(target),
            });
        }
    }
    log::debug!("combined specials at {from} and {to}, target {target}");
    Some([a.id(), b.id()])
}
