use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::{
    ShuffleError, SwapError,
    core::{Board, CellKind, Position, Topology},
};

use super::{
    board_generator::{BoardSeed, PieceGenerator},
    cascade::{Cascade, CascadePhase, CascadeStep, IterationReport},
    explosion,
    goals::{self, Collected, GoalInputs, GoalProgress, SessionStatus},
    hint::{self, SwapMove},
    level::LevelSpec,
    match_detector,
    scoring::ScoringRules,
};

/// Boards generated before accepting one without a legal move.
const MAX_GENERATION_ATTEMPTS: usize = 32;

/// How an accepted swap was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SwapOutcome {
    /// The swap formed a match and a cascade is running.
    Matched,
    /// Two specials were combined in place and a cascade is running.
    Combined,
    /// Nothing matched. The swap is shown until [`GameSession::revert_swap`].
    NoMatch,
}

/// Serializable view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub level: u32,
    pub score: u32,
    pub moves_left: u32,
    pub collected: Collected,
    pub goals: Vec<GoalProgress>,
    pub topology: Topology,
    pub board: Board,
    pub status: SessionStatus,
    pub phase: CascadePhase,
}

/// One play-through of a level.
///
/// The session owns the board, the layout and every counter, and is the
/// only thing that changes them. Swaps start a cascade which is advanced
/// with [`step`](Self::step) (one stage at a time, for front ends that
/// animate) or [`run_cascade`](Self::run_cascade) (to completion). Goals are
/// evaluated whenever the cascade settles.
///
/// # Example
///
/// ```
/// use sweet_galaxy_engine::{BoardSeed, GameSession};
///
/// let mut session = GameSession::start_level(1, BoardSeed::from_u128(42));
/// assert_eq!(session.moves_left(), 20);
///
/// let hint = session.find_hint().unwrap();
/// session.play_swap(hint.from, hint.to).unwrap();
/// assert_eq!(session.moves_left(), 19);
/// assert!(session.score() > 0);
/// assert!(!session.is_processing());
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    spec: LevelSpec,
    rules: ScoringRules,
    seed: BoardSeed,
    generator: PieceGenerator,
    board: Board,
    topology: Topology,
    score: u32,
    bonus: u32,
    moves_left: u32,
    collected: Collected,
    cascade: Cascade,
    status: SessionStatus,
    pending_revert: Option<SwapMove>,
}

impl GameSession {
    /// Starts `level` with the default scoring rules.
    ///
    /// # Panics
    ///
    /// Panics if `level` is not in `1..=MAX_LEVEL`.
    #[must_use]
    pub fn start_level(level: u32, seed: BoardSeed) -> Self {
        Self::with_rules(LevelSpec::new(level), seed, ScoringRules::default())
    }

    /// Starts a level with a freshly generated board.
    #[must_use]
    pub fn with_rules(spec: LevelSpec, seed: BoardSeed, rules: ScoringRules) -> Self {
        let mut generator = PieceGenerator::with_seed(seed);
        let board = generate_playable(&mut generator, spec.topology());
        log::info!("level {} started (seed {seed})", spec.level());
        Self::assemble(spec, rules, seed, generator, board)
    }

    /// Starts a level on a prepared board.
    ///
    /// Refills draw from `seed`; piece ids continue after those on `board`.
    ///
    /// # Panics
    ///
    /// Panics if `board` has pieces in cells the level layout keeps empty.
    #[must_use]
    pub fn from_parts(spec: LevelSpec, board: Board, seed: BoardSeed, rules: ScoringRules) -> Self {
        assert!(
            board.is_consistent_with(spec.topology()),
            "board does not fit the layout of level {}",
            spec.level()
        );
        let generator = PieceGenerator::continuing(seed, &board);
        Self::assemble(spec, rules, seed, generator, board)
    }

    fn assemble(
        spec: LevelSpec,
        rules: ScoringRules,
        seed: BoardSeed,
        generator: PieceGenerator,
        board: Board,
    ) -> Self {
        let mut this = Self {
            topology: spec.topology().clone(),
            moves_left: spec.moves(),
            spec,
            rules,
            seed,
            generator,
            board,
            score: 0,
            bonus: 0,
            collected: Collected::default(),
            cascade: Cascade::default(),
            status: SessionStatus::Playing,
            pending_revert: None,
        };
        this.evaluate_goals();
        this
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.spec.level()
    }

    #[must_use]
    pub fn spec(&self) -> &LevelSpec {
        &self.spec
    }

    #[must_use]
    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    #[must_use]
    pub fn seed(&self) -> BoardSeed {
        self.seed
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Score so far, including the completion bonus once awarded.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Bonus awarded for unused moves, 0 until the level is completed.
    #[must_use]
    pub fn bonus(&self) -> u32 {
        self.bonus
    }

    #[must_use]
    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    #[must_use]
    pub fn moves_used(&self) -> u32 {
        self.spec.moves().saturating_sub(self.moves_left)
    }

    #[must_use]
    pub fn collected(&self) -> &Collected {
        &self.collected
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn phase(&self) -> CascadePhase {
        self.cascade.phase()
    }

    /// Combo index the next resolved iteration will be scored at.
    #[must_use]
    pub fn combo(&self) -> u32 {
        self.cascade.combo()
    }

    /// Returns `true` while a cascade is in flight.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.cascade.is_running()
    }

    /// The unmatched swap currently shown, if any.
    #[must_use]
    pub fn pending_revert(&self) -> Option<SwapMove> {
        self.pending_revert
    }

    #[must_use]
    pub fn goal_progress(&self) -> Vec<GoalProgress> {
        self.spec
            .goals()
            .iter()
            .map(|goal| goal.progress(self.goal_inputs()))
            .collect()
    }

    /// Star rating, once the level is completed.
    #[must_use]
    pub fn stars(&self) -> Option<u8> {
        self.status
            .is_completed()
            .then(|| self.spec.stars(self.score))
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            level: self.level(),
            score: self.score,
            moves_left: self.moves_left,
            collected: self.collected,
            goals: self.goal_progress(),
            topology: self.topology.clone(),
            board: self.board.clone(),
            status: self.status,
            phase: self.phase(),
        }
    }

    /// Swaps the pieces at `from` and `to`.
    ///
    /// A pending unmatched swap is reverted first. If the pair combines
    /// (see [`explosion::combine`]) or the swap forms a match, a move is
    /// consumed and a cascade starts. Otherwise the swap stays on the board
    /// as a pending revert and no move is consumed.
    pub fn try_swap(&mut self, from: Position, to: Position) -> Result<SwapOutcome, SwapError> {
        if self.cascade.is_running() {
            return Err(SwapError::Processing);
        }
        self.revert_swap();
        if self.status.is_terminal() {
            return Err(SwapError::Terminal);
        }
        if self.moves_left == 0 {
            return Err(SwapError::OutOfMoves);
        }
        if !from.is_adjacent(to) {
            return Err(SwapError::NotAdjacent { from, to });
        }
        for pos in [from, to] {
            let kind = self.topology.get(pos);
            if kind == CellKind::Locked {
                return Err(SwapError::Locked { pos });
            }
            if !kind.is_swappable() || self.board.get(pos).is_none() {
                return Err(SwapError::EmptyCell { pos });
            }
        }

        let mv = SwapMove::new(from, to);
        if let Some(ids) = explosion::combine(&mut self.board, from, to) {
            self.moves_left -= 1;
            self.cascade.begin(&ids);
            log::debug!("swap {mv}: combined specials");
            return Ok(SwapOutcome::Combined);
        }

        self.board.swap(from, to);
        if match_detector::has_matches(&self.board) {
            self.moves_left -= 1;
            self.cascade.begin(&[]);
            log::debug!("swap {mv}: matched, {} move(s) left", self.moves_left);
            Ok(SwapOutcome::Matched)
        } else {
            self.pending_revert = Some(mv);
            log::debug!("swap {mv}: no match");
            Ok(SwapOutcome::NoMatch)
        }
    }

    /// Undoes a pending unmatched swap.
    ///
    /// Returns the swap that was undone.
    pub fn revert_swap(&mut self) -> Option<SwapMove> {
        let mv = self.pending_revert.take()?;
        self.board.swap(mv.from, mv.to);
        Some(mv)
    }

    /// Advances the cascade by one stage.
    ///
    /// Does nothing but re-evaluate goals when no cascade is running.
    pub fn step(&mut self) -> CascadeStep {
        let step = self.cascade.step(
            &mut self.board,
            &mut self.topology,
            &mut self.generator,
            &self.rules,
        );
        match &step {
            CascadeStep::Resolved(report) => {
                self.score = self.score.saturating_add(report.score_delta);
                self.collected.merge(&report.collected);
            }
            CascadeStep::Dropped => {}
            CascadeStep::Settled => self.evaluate_goals(),
        }
        step
    }

    /// Runs the cascade until the board settles.
    pub fn run_cascade(&mut self) -> Vec<IterationReport> {
        let mut reports = vec![];
        loop {
            match self.step() {
                CascadeStep::Resolved(report) => reports.push(report),
                CascadeStep::Dropped => {}
                CascadeStep::Settled => return reports,
            }
        }
    }

    /// Swaps and resolves synchronously.
    ///
    /// An unmatched swap is reverted at once; an accepted one is cascaded
    /// to completion.
    pub fn play_swap(&mut self, from: Position, to: Position) -> Result<SwapOutcome, SwapError> {
        let outcome = self.try_swap(from, to)?;
        if outcome.is_no_match() {
            self.revert_swap();
        } else {
            self.run_cascade();
        }
        Ok(outcome)
    }

    /// Regenerates every piece in place without consuming a move.
    ///
    /// Only a deadlocked board may be shuffled.
    pub fn try_shuffle(&mut self) -> Result<(), ShuffleError> {
        if self.cascade.is_running() {
            return Err(ShuffleError::Processing);
        }
        if self.status.is_terminal() {
            return Err(ShuffleError::Terminal);
        }
        if !self.is_deadlocked() {
            return Err(ShuffleError::NotDeadlocked);
        }
        self.pending_revert = None;
        self.board = generate_playable(&mut self.generator, &self.topology);
        log::info!("board shuffled");
        Ok(())
    }

    /// First swap that would form a match, on the settled board.
    ///
    /// Returns `None` while a cascade is running.
    #[must_use]
    pub fn find_hint(&self) -> Option<SwapMove> {
        if self.cascade.is_running() {
            return None;
        }
        hint::find_hint(&self.settled_board(), &self.topology)
    }

    /// Returns `true` if the settled board has no legal move.
    #[must_use]
    pub fn is_deadlocked(&self) -> bool {
        !self.cascade.is_running() && hint::is_deadlocked(&self.settled_board(), &self.topology)
    }

    fn settled_board(&self) -> Cow<'_, Board> {
        match self.pending_revert {
            None => Cow::Borrowed(&self.board),
            Some(mv) => {
                let mut board = self.board.clone();
                board.swap(mv.from, mv.to);
                Cow::Owned(board)
            }
        }
    }

    fn goal_inputs(&self) -> GoalInputs<'_> {
        GoalInputs {
            score: self.score,
            collected: &self.collected,
            moves_used: self.moves_used(),
        }
    }

    fn evaluate_goals(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = goals::evaluate(self.spec.goals(), self.goal_inputs(), self.moves_left);
        match self.status {
            SessionStatus::Playing => {}
            SessionStatus::Completed => {
                self.bonus = self.rules.move_bonus(self.moves_left);
                self.score = self.score.saturating_add(self.bonus);
                log::info!(
                    "level {} completed: score {} (bonus {})",
                    self.level(),
                    self.score,
                    self.bonus
                );
            }
            SessionStatus::Failed => {
                log::info!("level {} failed: score {}", self.level(), self.score);
            }
        }
    }
}

/// Generates boards until one has a legal move, up to a bounded number of
/// attempts.
fn generate_playable(generator: &mut PieceGenerator, topology: &Topology) -> Board {
    let mut board = generator.generate(topology);
    for attempt in 1..MAX_GENERATION_ATTEMPTS {
        if hint::find_hint(&board, topology).is_some() {
            return board;
        }
        log::debug!("generated board has no legal move, retrying ({attempt})");
        board = generator.generate(topology);
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{GRID_SIZE, Piece, PieceColor, PieceId, PieceKind},
        engine::{Goal, MAX_LEVEL},
    };

    const SEED: BoardSeed = BoardSeed::from_u128(0xface);

    // rows shifted by one, so no run anywhere
    const QUIET: [&str; GRID_SIZE] = [
        "RGBYPORG", "GBYPORGB", "BYPORGBY", "YPORGBYP", "PORGBYPO", "ORGBYPOR", "RGBYPORG",
        "GBYPORGB",
    ];

    // swapping (0,2) and (1,2) completes a single run of three reds in row 0
    const ONE_MOVE: [&str; GRID_SIZE] = [
        "RRBYPORG", "GBRPORGB", "BYPORGBY", "YPORGBYP", "PORGBYPO", "ORGBYPOR", "RGBYPORG",
        "GBYPORGB",
    ];

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    fn session_on(rows: [&str; GRID_SIZE], spec: LevelSpec, rules: ScoringRules) -> GameSession {
        GameSession::from_parts(spec, Board::from_rows(rows), SEED, rules)
    }

    #[test]
    fn test_start_level_is_deterministic() {
        let a = GameSession::start_level(1, SEED);
        let b = GameSession::start_level(1, SEED);
        assert_eq!(a.board(), b.board());
        assert_eq!(a.moves_left(), 20);
        assert_eq!(a.score(), 0);
        assert!(a.status().is_playing());
        assert!(a.phase().is_idle());
        assert!(!match_detector::has_matches(a.board()));
        assert!(a.find_hint().is_some());
    }

    #[test]
    fn test_start_level_respects_layout() {
        for level in [4, 6, 9, 12, 40, MAX_LEVEL] {
            let session = GameSession::start_level(level, SEED);
            assert!(session.board().is_consistent_with(session.topology()));
            assert_eq!(session.topology(), LevelSpec::new(level).topology());
        }
    }

    #[test]
    fn test_end_to_end_level_one() {
        let mut session = session_on(ONE_MOVE, LevelSpec::new(1), ScoringRules::default());
        assert!(session.status().is_playing());

        let outcome = session.try_swap(pos(0, 2), pos(1, 2)).unwrap();
        assert!(outcome.is_matched());
        assert_eq!(session.moves_left(), 19);
        assert!(session.is_processing());

        let CascadeStep::Resolved(report) = session.step() else {
            panic!("expected the swap to resolve");
        };
        assert_eq!(report.removed, 3);
        assert_eq!(report.combo, 0);
        assert_eq!(session.score(), 3 * 15);
        assert_eq!(session.collected()[PieceColor::Red], 3);

        session.run_cascade();
        assert!(!session.is_processing());
        assert!(session.score() >= 45);
        assert_eq!(session.combo(), 0);
        assert!(!match_detector::has_matches(session.board()));
    }

    #[test]
    fn test_unmatched_swap_is_reverted() {
        let mut session = session_on(QUIET, LevelSpec::new(1), ScoringRules::default());
        let original = session.board().clone();

        let outcome = session.try_swap(pos(0, 0), pos(0, 1)).unwrap();
        assert!(outcome.is_no_match());
        assert_eq!(session.moves_left(), 20);
        assert!(!session.is_processing());
        assert_ne!(session.board(), &original);
        assert_eq!(
            session.pending_revert(),
            Some(SwapMove::new(pos(0, 0), pos(0, 1)))
        );

        assert!(session.revert_swap().is_some());
        assert_eq!(session.board(), &original);
        assert_eq!(session.revert_swap(), None);

        assert!(session.play_swap(pos(0, 0), pos(0, 1)).unwrap().is_no_match());
        assert_eq!(session.board(), &original);
    }

    #[test]
    fn test_new_swap_settles_pending_revert() {
        let mut session = session_on(ONE_MOVE, LevelSpec::new(1), ScoringRules::default());
        let original = session.board().clone();
        let hint = Some(SwapMove::new(pos(0, 2), pos(1, 2)));
        assert_eq!(session.find_hint(), hint);

        let outcome = session.try_swap(pos(7, 0), pos(7, 1)).unwrap();
        assert!(outcome.is_no_match());
        // hint queries ignore the unmatched swap
        assert_eq!(session.find_hint(), hint);

        let err = session.try_swap(pos(0, 0), pos(5, 5)).unwrap_err();
        assert_eq!(
            err,
            SwapError::NotAdjacent {
                from: pos(0, 0),
                to: pos(5, 5)
            }
        );
        assert_eq!(session.board(), &original);
        assert_eq!(session.pending_revert(), None);
    }

    #[test]
    fn test_swap_rejections() {
        let mut session = session_on(ONE_MOVE, LevelSpec::new(1), ScoringRules::default());
        session.try_swap(pos(0, 2), pos(1, 2)).unwrap();
        assert_eq!(
            session.try_swap(pos(4, 4), pos(4, 5)),
            Err(SwapError::Processing)
        );
        assert_eq!(session.try_shuffle(), Err(ShuffleError::Processing));
        assert_eq!(session.find_hint(), None);
        assert!(!session.is_deadlocked());

        let mut session = GameSession::start_level(12, SEED);
        let locked = Position::all()
            .find(|p| session.topology().get(*p) == CellKind::Locked)
            .unwrap();
        let neighbour = locked.left().or(locked.right()).unwrap();
        assert_eq!(
            session.try_swap(locked, neighbour),
            Err(SwapError::Locked { pos: locked })
        );

        let void = Position::all()
            .find(|p| session.topology().get(*p) == CellKind::Void)
            .unwrap();
        let neighbour = void.up().or(void.down()).unwrap();
        assert_eq!(
            session.try_swap(void, neighbour),
            Err(SwapError::EmptyCell { pos: void })
        );
        assert_eq!(session.moves_left(), LevelSpec::new(12).moves());
    }

    #[test]
    fn test_goal_completion_awards_bonus_once() {
        let spec = LevelSpec::with_goals(
            1,
            vec![Goal::Score { target: 1000 }, Goal::Moves { limit: 20 }],
        );
        let rules = ScoringRules {
            points_per_piece: 400,
            ..ScoringRules::default()
        };
        let mut session = session_on(ONE_MOVE, spec, rules);

        session.play_swap(pos(0, 2), pos(1, 2)).unwrap();

        assert!(session.status().is_completed());
        assert_eq!(session.moves_left(), 19);
        assert_eq!(session.bonus(), 19 * 50);
        assert!(session.score() >= 1200 + 19 * 50);

        let score = session.score();
        session.run_cascade();
        session.step();
        assert_eq!(session.score(), score);
        assert_eq!(
            session.try_swap(pos(0, 0), pos(0, 1)),
            Err(SwapError::Terminal)
        );
        assert_eq!(session.try_shuffle(), Err(ShuffleError::Terminal));
        assert_eq!(session.stars(), Some(3));
    }

    #[test]
    fn test_running_out_of_moves_fails() {
        let spec = LevelSpec::with_goals(
            1,
            vec![Goal::Score { target: 1_000_000 }, Goal::Moves { limit: 1 }],
        );
        let mut session = session_on(ONE_MOVE, spec, ScoringRules::default());
        session.play_swap(pos(0, 2), pos(1, 2)).unwrap();
        assert!(session.status().is_failed());
        assert_eq!(session.moves_left(), 0);
        assert_eq!(session.bonus(), 0);
        assert_eq!(session.stars(), None);
    }

    #[test]
    fn test_empty_budget_fails_at_start() {
        let spec = LevelSpec::with_goals(
            1,
            vec![Goal::Score { target: 1000 }, Goal::Moves { limit: 0 }],
        );
        let mut session = session_on(ONE_MOVE, spec, ScoringRules::default());
        assert!(session.status().is_failed());
        assert_eq!(
            session.try_swap(pos(0, 2), pos(1, 2)),
            Err(SwapError::Terminal)
        );
    }

    #[test]
    fn test_combined_specials_clear_a_color() {
        let mut board = Board::from_rows(QUIET);
        board.get_mut(pos(3, 3)).unwrap().set_kind(PieceKind::RowClear);
        board.get_mut(pos(3, 4)).unwrap().set_kind(PieceKind::ColumnClear);
        let ids: Vec<PieceId> = [pos(3, 3), pos(3, 4)]
            .iter()
            .map(|p| board.get(*p).unwrap().id())
            .collect();
        let reds = board
            .pieces()
            .filter(|p| p.color() == PieceColor::Red)
            .count();
        let mut session = GameSession::from_parts(
            LevelSpec::new(1),
            board,
            SEED,
            ScoringRules::default(),
        );

        let outcome = session.try_swap(pos(3, 3), pos(3, 4)).unwrap();
        assert!(outcome.is_combined());
        assert_eq!(session.moves_left(), 19);
        // pieces stay where they were
        assert_eq!(session.board().get(pos(3, 3)).unwrap().id(), ids[0]);
        assert_eq!(session.board().get(pos(3, 4)).unwrap().id(), ids[1]);

        let CascadeStep::Resolved(report) = session.step() else {
            panic!("expected the combination to resolve");
        };
        // every red piece plus the green one swapped with the red special
        assert_eq!(report.removed, reds + 1);
        assert_eq!(report.collected[PieceColor::Red], 11);
        session.run_cascade();
        assert!(ids.iter().all(|id| session.board().position_of(*id).is_none()));
    }

    #[test]
    fn test_deadlocked_board_and_shuffle() {
        let mut board = Board::EMPTY;
        for (i, p) in Position::all().enumerate() {
            let color = PieceColor::ALL[(2 * p.row() + p.col()) % PieceColor::LEN];
            board.place(p, Piece::new(PieceId::new(i.try_into().unwrap()), color, p));
        }
        let mut session =
            GameSession::from_parts(LevelSpec::new(1), board, SEED, ScoringRules::default());
        assert!(session.is_deadlocked());
        assert_eq!(session.find_hint(), None);

        session.try_shuffle().unwrap();
        assert!(!session.is_deadlocked());
        assert_eq!(session.moves_left(), 20);
        assert!(!match_detector::has_matches(session.board()));

        let board = session.board().clone();
        assert_eq!(session.try_shuffle(), Err(ShuffleError::NotDeadlocked));
        assert_eq!(session.board(), &board);
    }

    #[test]
    fn test_shuffle_requires_deadlock() {
        let mut session = GameSession::start_level(1, SEED);
        assert!(session.find_hint().is_some());
        let board = session.board().clone();
        assert_eq!(session.try_shuffle(), Err(ShuffleError::NotDeadlocked));
        assert_eq!(session.board(), &board);
        assert_eq!(session.moves_left(), LevelSpec::new(1).moves());
    }

    #[test]
    fn test_snapshot_serialization() {
        let session = GameSession::start_level(2, SEED);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.level, 2);
        assert_eq!(snapshot.goals.len(), 3);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""status":"playing""#));
        let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
