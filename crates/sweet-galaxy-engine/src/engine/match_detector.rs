//! Detection of runs of three or more same-colored pieces.

use crate::core::{Board, GRID_SIZE, Position};

/// Minimum number of same-colored pieces in a line that form a match.
pub const MIN_RUN_LENGTH: usize = 3;

/// Result of [`detect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Whether at least one run was found.
    pub has_matches: bool,
    /// Copy of the input where exactly the pieces in runs are marked.
    pub board: Board,
}

/// Marks every piece that belongs to a horizontal or vertical run.
///
/// Rows are scanned first, then columns. A piece in both a horizontal and a
/// vertical run is simply marked once. Marks already present on the input
/// are discarded, so the output only reflects the runs on the board.
#[must_use]
pub fn detect(board: &Board) -> Detection {
    let mut marked = board.clone();
    marked.clear_marks();

    let mut has_matches = false;
    for line in lines() {
        for run in runs_in_line(board, &line) {
            has_matches = true;
            for &pos in run {
                marked.mark(pos);
            }
        }
    }

    Detection {
        has_matches,
        board: marked,
    }
}

/// Returns `true` if the board has any run, without building a marked copy.
#[must_use]
pub fn has_matches(board: &Board) -> bool {
    lines().any(|line| runs_in_line(board, &line).next().is_some())
}

/// All rows, then all columns, each as an ordered list of positions.
fn lines() -> impl Iterator<Item = [Position; GRID_SIZE]> {
    let rows = (0..GRID_SIZE).map(|row| {
        std::array::from_fn(|col| Position::new(row, col).expect("in range"))
    });
    let cols = (0..GRID_SIZE).map(|col| {
        std::array::from_fn(|row| Position::new(row, col).expect("in range"))
    });
    rows.chain(cols)
}

/// Maximal same-color runs of at least [`MIN_RUN_LENGTH`] along `line`.
fn runs_in_line<'a>(
    board: &'a Board,
    line: &'a [Position; GRID_SIZE],
) -> impl Iterator<Item = &'a [Position]> + 'a {
    let mut start = 0;
    std::iter::from_fn(move || {
        while start < line.len() {
            let Some(color) = board.color_at(line[start]) else {
                start += 1;
                continue;
            };
            let len = line[start..]
                .iter()
                .take_while(|pos| board.color_at(**pos) == Some(color))
                .count();
            let run = &line[start..start + len];
            start += len;
            if len >= MIN_RUN_LENGTH {
                return Some(run);
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    fn marked_positions(board: &Board) -> Vec<Position> {
        board.marked_pieces().map(|p| p.position()).collect()
    }

    #[test]
    fn test_no_matches() {
        let board = Board::from_rows([
            "RGBRGBRG", "GBRGBRGB", "BRGBRGBR", "RGBRGBRG", "GBRGBRGB", "BRGBRGBR", "RGBRGBRG",
            "GBRGBRGB",
        ]);
        let detection = detect(&board);
        assert!(!detection.has_matches);
        assert!(!detection.board.has_marked());
        assert!(!has_matches(&board));
    }

    #[test]
    fn test_horizontal_run() {
        let board = Board::from_rows([
            "RRRGB...", "........", "........", "........", "........", "........", "........",
            "........",
        ]);
        let detection = detect(&board);
        assert!(detection.has_matches);
        assert_eq!(
            marked_positions(&detection.board),
            vec![pos(0, 0), pos(0, 1), pos(0, 2)]
        );
    }

    #[test]
    fn test_vertical_run_of_four() {
        let board = Board::from_rows([
            "......Y.", "......Y.", "......Y.", "......Y.", "......B.", "........", "........",
            "........",
        ]);
        let detection = detect(&board);
        assert_eq!(marked_positions(&detection.board).len(), 4);
        assert!(detection.board.get(pos(4, 6)).is_some_and(|p| !p.is_marked()));
    }

    #[test]
    fn test_cross_marks_shared_piece_once() {
        let board = Board::from_rows([
            ".G......", ".G......", "GGG.....", "........", "........", "........", "........",
            "........",
        ]);
        let detection = detect(&board);
        assert_eq!(marked_positions(&detection.board).len(), 5);
    }

    #[test]
    fn test_gaps_break_runs() {
        let board = Board::from_rows([
            "RR.RR...", "P.......", "........", "P.......", "P.......", "........", "........",
            "........",
        ]);
        assert!(!detect(&board).has_matches);
    }

    #[test]
    fn test_stale_marks_are_cleared() {
        let mut board = Board::from_rows([
            "RGB.....", "........", "........", "........", "........", "........", "........",
            "........",
        ]);
        board.mark(pos(0, 0));
        let detection = detect(&board);
        assert!(!detection.board.has_marked());
    }

    #[test]
    fn test_detection_is_idempotent() {
        let board = Board::from_rows([
            "RRRB....", "BGGG....", "Y.......", "Y.......", "Y.......", "........", "........",
            "........",
        ]);
        let first = detect(&board);
        let second = detect(&first.board);
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_is_untouched() {
        let board = Board::from_rows([
            "OOO.....", "........", "........", "........", "........", "........", "........",
            "........",
        ]);
        let before = board.clone();
        let _ = detect(&board);
        assert_eq!(board, before);
    }
}
