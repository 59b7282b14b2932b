use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::core::PieceColor;

/// A level objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Goal {
    /// Reach a cumulative score.
    #[display("score {target}")]
    Score { target: u32 },
    /// Remove a number of pieces of one color.
    #[display("collect {target} {color}")]
    Collect { color: PieceColor, target: u32 },
    /// Move budget of the level.
    ///
    /// Not satisfied on its own; running out of moves with other goals
    /// unmet fails the level.
    #[display("{limit} moves")]
    Moves { limit: u32 },
}

/// Per-color count of removed pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Collected([u32; PieceColor::LEN]);

impl Index<PieceColor> for Collected {
    type Output = u32;

    fn index(&self, color: PieceColor) -> &u32 {
        &self.0[color.index()]
    }
}

impl Collected {
    pub fn add(&mut self, color: PieceColor, count: u32) {
        self.0[color.index()] += count;
    }

    pub fn merge(&mut self, other: &Self) {
        for color in PieceColor::ALL {
            self.add(color, other[color]);
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// Progress towards a single goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal: Goal,
    /// Score reached, pieces collected, or moves used.
    pub current: u32,
    pub satisfied: bool,
}

/// Outcome of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Playing,
    Completed,
    Failed,
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_playing()
    }
}

/// Counters the goals are checked against.
#[derive(Debug, Clone, Copy)]
pub struct GoalInputs<'a> {
    pub score: u32,
    pub collected: &'a Collected,
    pub moves_used: u32,
}

impl Goal {
    /// Evaluates this goal. A [`Goal::Moves`] goal is never satisfied.
    #[must_use]
    pub fn progress(&self, inputs: GoalInputs<'_>) -> GoalProgress {
        let (current, satisfied) = match *self {
            Goal::Score { target } => (inputs.score, inputs.score >= target),
            Goal::Collect { color, target } => {
                let count = inputs.collected[color];
                (count, count >= target)
            }
            Goal::Moves { .. } => (inputs.moves_used, false),
        };
        GoalProgress {
            goal: *self,
            current,
            satisfied,
        }
    }

    #[must_use]
    pub fn is_move_budget(&self) -> bool {
        matches!(self, Goal::Moves { .. })
    }
}

/// Decides the session status from the goals and the remaining budget.
///
/// Completion is checked first, so meeting the last goal with the last
/// move completes the level.
#[must_use]
pub fn evaluate(goals: &[Goal], inputs: GoalInputs<'_>, moves_left: u32) -> SessionStatus {
    let all_met = goals
        .iter()
        .filter(|goal| !goal.is_move_budget())
        .all(|goal| goal.progress(inputs).satisfied);
    if all_met {
        SessionStatus::Completed
    } else if moves_left == 0 {
        SessionStatus::Failed
    } else {
        SessionStatus::Playing
    }
}
