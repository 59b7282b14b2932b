//! Step-driven resolution of a swap's chain of matches.
//!
//! A cascade alternates between two stages until the board settles:
//!
//! * **Matching** runs the pure pipeline on the current board
//!   ([`match_detector`] → [`special_synthesizer`] → [`explosion`]), scores
//!   the marked pieces and clears cell states around them. Marked pieces
//!   stay on the board so a front end can show them before they go.
//! * **Dropping** hands the marked board to [`gravity`], which removes the
//!   marked pieces and refills the holes.
//!
//! When a Matching stage finds nothing to remove the cascade is back to
//! [`CascadePhase::Idle`] and the combo counter resets.

use serde::{Deserialize, Serialize};

use crate::core::{Board, Piece, PieceId, Topology};

use super::{
    board_generator::PieceGenerator,
    explosion::{self, PrimedSpecials},
    goals::Collected,
    gravity, match_detector,
    scoring::ScoringRules,
    special_synthesizer::{self, CreatedSpecial},
};

/// Stage the cascade will run on the next [`Cascade::step`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum CascadePhase {
    /// Nothing in flight; swaps are accepted.
    #[default]
    Idle,
    /// Next step detects and resolves matches.
    Matching,
    /// Next step removes marked pieces and applies gravity.
    Dropping,
}

/// Summary of one resolved iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport {
    /// Combo index the iteration was scored at.
    pub combo: u32,
    /// Number of pieces removed.
    pub removed: usize,
    pub score_delta: u32,
    /// Removed pieces by color.
    pub collected: Collected,
    pub created: Vec<CreatedSpecial>,
    /// Specials that were hit and go off in the next iteration.
    pub primed: usize,
    /// Gel, obstruction and lock cells turned playable.
    pub cells_cleared: usize,
}

/// Outcome of [`Cascade::step`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum CascadeStep {
    /// Matches were resolved; the board now has marked pieces.
    Resolved(IterationReport),
    /// Marked pieces were removed and the board refilled.
    Dropped,
    /// Nothing left to resolve; the cascade is idle.
    Settled,
}

/// Board after the Matching stage, before gravity.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub board: Board,
    pub primed: PrimedSpecials,
    pub report: IterationReport,
}

/// Runs detection, synthesis and explosion on `board`.
///
/// Pieces listed in `primed` are marked on top of the detected runs, so
/// specials primed by the previous iteration go off now. Returns `None`
/// when nothing is marked.
#[must_use]
pub fn resolve_iteration(
    board: &Board,
    primed: &[PieceId],
    combo: u32,
    rules: &ScoringRules,
) -> Option<Resolution> {
    let detection = match_detector::detect(board);
    let synthesis = special_synthesizer::synthesize(&detection.board);

    let mut marked = synthesis.board;
    for id in primed {
        if let Some(pos) = marked.position_of(*id) {
            marked.mark(pos);
        }
    }
    if !marked.has_marked() {
        return None;
    }

    let explosion = explosion::resolve(&marked);

    let mut collected = Collected::default();
    for piece in explosion.board.marked_pieces() {
        collected.add(piece.color(), 1);
    }
    let removed = explosion.board.marked_pieces().count();

    let report = IterationReport {
        combo,
        removed,
        score_delta: rules.score_for(removed, combo),
        collected,
        created: synthesis.created,
        primed: explosion.primed.len(),
        cells_cleared: 0,
    };
    Some(Resolution {
        board: explosion.board,
        primed: explosion.primed,
        report,
    })
}

/// State of an in-flight cascade.
#[derive(Debug, Clone, Default)]
pub struct Cascade {
    phase: CascadePhase,
    combo: u32,
    primed: PrimedSpecials,
}

impl Cascade {
    #[must_use]
    pub fn phase(&self) -> CascadePhase {
        self.phase
    }

    /// Combo index of the next Matching stage.
    #[must_use]
    pub fn combo(&self) -> u32 {
        self.combo
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.phase.is_idle()
    }

    /// Starts a cascade; `primed` pieces go off in the first iteration.
    pub fn begin(&mut self, primed: &[PieceId]) {
        self.phase = CascadePhase::Matching;
        self.combo = 0;
        self.primed.clear();
        self.primed.extend(primed.iter().copied());
    }

    /// Runs the next stage.
    ///
    /// Mutates `board` and `topology` in place; score and collection
    /// counters are returned in the [`IterationReport`] for the caller to
    /// apply.
    pub fn step(
        &mut self,
        board: &mut Board,
        topology: &mut Topology,
        generator: &mut PieceGenerator,
        rules: &ScoringRules,
    ) -> CascadeStep {
        match self.phase {
            CascadePhase::Idle => CascadeStep::Settled,
            CascadePhase::Matching => {
                let primed = std::mem::take(&mut self.primed);
                let Some(resolution) = resolve_iteration(board, &primed, self.combo, rules) else {
                    log::trace!("cascade settled after {} iteration(s)", self.combo);
                    self.phase = CascadePhase::Idle;
                    self.combo = 0;
                    return CascadeStep::Settled;
                };

                let mut report = resolution.report;
                report.cells_cleared =
                    topology.clear_around(resolution.board.marked_pieces().map(Piece::position));
                log::debug!(
                    "combo {}: removed {}, +{} points, {} special(s) created, {} cell(s) cleared",
                    report.combo,
                    report.removed,
                    report.score_delta,
                    report.created.len(),
                    report.cells_cleared
                );

                *board = resolution.board;
                self.primed = resolution.primed;
                self.combo += 1;
                self.phase = CascadePhase::Dropping;
                CascadeStep::Resolved(report)
            }
            CascadePhase::Dropping => {
                *board = gravity::apply(board, topology, generator);
                self.phase = CascadePhase::Matching;
                CascadeStep::Dropped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{CellKind, GRID_SIZE, PieceColor, PieceKind, Position},
        engine::BoardSeed,
    };

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    // rows shifted by one, so no run anywhere
    const QUIET: [&str; GRID_SIZE] = [
        "RGBYPORG", "GBYPORGB", "BYPORGBY", "YPORGBYP", "PORGBYPO", "ORGBYPOR", "RGBYPORG",
        "GBYPORGB",
    ];

    fn board_with(changes: &[(Position, PieceColor)]) -> Board {
        let mut board = Board::from_rows(QUIET);
        for (p, color) in changes {
            board.get_mut(*p).unwrap().set_color(*color);
        }
        board
    }

    fn run_to_idle(
        cascade: &mut Cascade,
        board: &mut Board,
        topology: &mut Topology,
    ) -> Vec<IterationReport> {
        let mut generator = PieceGenerator::continuing(BoardSeed::from_u128(3), board);
        let rules = ScoringRules::default();
        let mut reports = vec![];
        loop {
            match cascade.step(board, topology, &mut generator, &rules) {
                CascadeStep::Resolved(report) => reports.push(report),
                CascadeStep::Dropped => {}
                CascadeStep::Settled => return reports,
            }
        }
    }

    #[test]
    fn test_quiet_board_settles_immediately() {
        let mut board = Board::from_rows(QUIET);
        let mut topology = Topology::PLAYABLE;
        let mut cascade = Cascade::default();
        cascade.begin(&[]);
        let reports = run_to_idle(&mut cascade, &mut board, &mut topology);
        assert!(reports.is_empty());
        assert!(cascade.phase().is_idle());
        assert_eq!(board, Board::from_rows(QUIET));
    }

    #[test]
    fn test_combo_scaling() {
        // two separate runs of three
        let board = board_with(&[
            (pos(0, 1), PieceColor::Red),
            (pos(0, 2), PieceColor::Red),
            (pos(5, 5), PieceColor::Orange),
            (pos(5, 7), PieceColor::Orange),
        ]);
        let rules = ScoringRules::default();
        let first = resolve_iteration(&board, &[], 0, &rules).unwrap().report;
        let second = resolve_iteration(&board, &[], 1, &rules).unwrap().report;
        assert_eq!(first.removed, 6);
        assert_eq!(first.score_delta, 90);
        assert_eq!(second.score_delta * 2, first.score_delta * 3);
        assert_eq!(first.collected[PieceColor::Red], 3);
        assert_eq!(first.collected[PieceColor::Orange], 3);
    }

    #[test]
    fn test_single_run_iteration() {
        let mut board = board_with(&[(pos(0, 1), PieceColor::Red), (pos(0, 2), PieceColor::Red)]);
        let mut topology = Topology::PLAYABLE;
        let mut generator = PieceGenerator::continuing(BoardSeed::from_u128(3), &board);
        let rules = ScoringRules::default();
        let mut cascade = Cascade::default();
        cascade.begin(&[]);

        let CascadeStep::Resolved(report) =
            cascade.step(&mut board, &mut topology, &mut generator, &rules)
        else {
            panic!("expected a resolved iteration");
        };
        assert_eq!(report.removed, 3);
        assert_eq!(report.score_delta, 45);
        assert_eq!(board.marked_pieces().count(), 3);
        assert!(cascade.phase().is_dropping());
        assert_eq!(cascade.combo(), 1);

        let step = cascade.step(&mut board, &mut topology, &mut generator, &rules);
        assert!(step.is_dropped());
        assert!(!board.has_marked());
        assert!(cascade.phase().is_matching());
        assert_eq!(board.pieces().count(), GRID_SIZE * GRID_SIZE);

        let _ = run_to_idle(&mut cascade, &mut board, &mut topology);
        assert_eq!(cascade.combo(), 0);
        assert!(!match_detector::has_matches(&board));
    }

    #[test]
    fn test_primed_special_goes_off_next_iteration() {
        let mut board = board_with(&[(pos(0, 1), PieceColor::Red), (pos(0, 2), PieceColor::Red)]);
        board.get_mut(pos(0, 1)).unwrap().set_kind(PieceKind::RowClear);
        board.get_mut(pos(0, 6)).unwrap().set_kind(PieceKind::ColumnClear);
        let column_clear = board.get(pos(0, 6)).unwrap().id();
        let mut topology = Topology::PLAYABLE;
        let mut cascade = Cascade::default();
        cascade.begin(&[]);

        let reports = run_to_idle(&mut cascade, &mut board, &mut topology);

        assert!(reports.len() >= 2);
        assert_eq!(reports[0].removed, GRID_SIZE - 1);
        assert_eq!(reports[0].primed, 1);
        assert!(reports[1].removed > 0);
        assert!(board.position_of(column_clear).is_none());
    }

    #[test]
    fn test_begin_with_primed_pieces() {
        let mut board = Board::from_rows(QUIET);
        board.get_mut(pos(3, 3)).unwrap().set_kind(PieceKind::AreaClear);
        let id = board.get(pos(3, 3)).unwrap().id();
        let rules = ScoringRules::default();

        let resolution = resolve_iteration(&board, &[id], 0, &rules).unwrap();
        assert_eq!(resolution.report.removed, 9);
        assert!(resolve_iteration(&board, &[], 0, &rules).is_none());
    }

    #[test]
    fn test_layout_cleared_around_removed_pieces() {
        let mut board = board_with(&[(pos(0, 1), PieceColor::Red), (pos(0, 2), PieceColor::Red)]);
        let mut topology = Topology::PLAYABLE;
        topology.set(pos(1, 1), CellKind::Gel);
        topology.set(pos(1, 3), CellKind::Locked);
        topology.set(pos(2, 1), CellKind::Gel);
        let mut cascade = Cascade::default();
        cascade.begin(&[]);

        let reports = run_to_idle(&mut cascade, &mut board, &mut topology);

        assert!(reports[0].cells_cleared >= 2);
        assert_eq!(topology.get(pos(1, 1)), CellKind::Playable);
        assert_eq!(topology.get(pos(1, 3)), CellKind::Playable);
    }
}
