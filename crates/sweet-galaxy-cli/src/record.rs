use std::{
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sweet_galaxy_engine::{
    BoardSeed, CascadeStep, GameSession, LevelSpec, MAX_LEVEL, Position, ScoringRules,
    SessionStatus, ShuffleError, SwapError, SwapMove, SwapOutcome,
};

use crate::util;

/// A player action that changes the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// A swap that was accepted (matched or combined).
    Swap(SwapMove),
    Shuffle,
}

/// Everything needed to replay a level from its seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    pub recorded_at: DateTime<Utc>,
    pub level: u32,
    pub seed: BoardSeed,
    pub rules: ScoringRules,
    pub actions: Vec<Action>,
    pub final_score: u32,
    pub status: SessionStatus,
}

impl Recording {
    /// Saves the recording as `level{N}_{YYYYMMDD_HHMMSS}.json` in
    /// `record_dir` and returns the path written.
    pub fn save(&self, record_dir: &Path) -> anyhow::Result<PathBuf> {
        let filename = format!(
            "level{}_{}.json",
            self.level,
            self.recorded_at.format("%Y%m%d_%H%M%S")
        );
        let path = record_dir.join(filename);
        util::write_json_file("recording", &path, self)?;
        Ok(path)
    }

    /// Plays the recorded actions on a fresh session.
    ///
    /// Fails if an action is rejected; the returned session can be compared
    /// with [`final_score`](Self::final_score) and [`status`](Self::status).
    pub fn replay(&self) -> anyhow::Result<GameSession> {
        anyhow::ensure!(
            (1..=MAX_LEVEL).contains(&self.level),
            "level {} is out of range 1..={MAX_LEVEL}",
            self.level
        );
        let mut session =
            GameSession::with_rules(LevelSpec::new(self.level), self.seed, self.rules);
        for (i, action) in self.actions.iter().enumerate() {
            match action {
                Action::Swap(mv) => {
                    let outcome = session
                        .play_swap(mv.from, mv.to)
                        .with_context(|| format!("action {i}: swap {mv} was rejected"))?;
                    anyhow::ensure!(
                        !outcome.is_no_match(),
                        "action {i}: swap {mv} did not match"
                    );
                }
                Action::Shuffle => session
                    .try_shuffle()
                    .with_context(|| format!("action {i}: shuffle was rejected"))?,
            }
        }
        Ok(session)
    }
}

/// A [`GameSession`] that records every action that changes the board.
///
/// Rejected and unmatched swaps leave no trace since replaying them would
/// change nothing.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    session: GameSession,
    actions: Vec<Action>,
}

/// Read-only access to the session.
///
/// Mutations go through the recording methods, so there is no `DerefMut`.
impl Deref for RecordingSession {
    type Target = GameSession;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl RecordingSession {
    pub fn new(level: u32, seed: BoardSeed, rules: ScoringRules) -> Self {
        Self {
            session: GameSession::with_rules(LevelSpec::new(level), seed, rules),
            actions: vec![],
        }
    }

    pub fn try_swap(&mut self, from: Position, to: Position) -> Result<SwapOutcome, SwapError> {
        let outcome = self.session.try_swap(from, to)?;
        if !outcome.is_no_match() {
            self.actions.push(Action::Swap(SwapMove::new(from, to)));
        }
        Ok(outcome)
    }

    pub fn play_swap(&mut self, from: Position, to: Position) -> Result<SwapOutcome, SwapError> {
        let outcome = self.session.play_swap(from, to)?;
        if !outcome.is_no_match() {
            self.actions.push(Action::Swap(SwapMove::new(from, to)));
        }
        Ok(outcome)
    }

    pub fn revert_swap(&mut self) -> Option<SwapMove> {
        self.session.revert_swap()
    }

    pub fn step(&mut self) -> CascadeStep {
        self.session.step()
    }

    pub fn try_shuffle(&mut self) -> Result<(), ShuffleError> {
        self.session.try_shuffle()?;
        self.actions.push(Action::Shuffle);
        Ok(())
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Captures the actions so far with the current score and status.
    pub fn recording(&self) -> Recording {
        Recording {
            recorded_at: Utc::now(),
            level: self.session.level(),
            seed: self.session.seed(),
            rules: *self.session.rules(),
            actions: self.actions.clone(),
            final_score: self.session.score(),
            status: self.session.status(),
        }
    }
}
