use serde::{Deserialize, Serialize};

use crate::core::{PieceColor, Topology};

use super::goals::Goal;

/// Highest level number.
pub const MAX_LEVEL: u32 = 500;

const BASE_SCORE_TARGET: u32 = 1000;
const SCORE_TARGET_STEP: u32 = 750;

const BASE_MOVES: u32 = 20;
const MIN_MOVES: u32 = 15;

const COLLECT_FROM_LEVEL: u32 = 2;
const COLLECT_BASE: u32 = 8;
const COLLECT_PER_LEVEL: u32 = 2;
const MAX_COLLECT: u32 = 35;

/// Everything that is fixed about a level before play starts.
///
/// A pure function of the level number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpec {
    level: u32,
    goals: Vec<Goal>,
    topology: Topology,
}

impl LevelSpec {
    /// Builds the level.
    ///
    /// # Panics
    ///
    /// Panics if `level` is not in `1..=MAX_LEVEL`.
    #[must_use]
    pub fn new(level: u32) -> Self {
        assert!(
            (1..=MAX_LEVEL).contains(&level),
            "level {level} out of range 1..={MAX_LEVEL}"
        );

        let mut goals = vec![
            Goal::Score {
                target: score_target(level),
            },
            Goal::Moves {
                limit: move_budget(level),
            },
        ];
        if level >= COLLECT_FROM_LEVEL {
            let color = PieceColor::ALL[((level - COLLECT_FROM_LEVEL) as usize) % PieceColor::LEN];
            let target = u32::min(COLLECT_BASE + COLLECT_PER_LEVEL * level, MAX_COLLECT);
            goals.push(Goal::Collect { color, target });
        }

        Self {
            level,
            goals,
            topology: Topology::for_level(level),
        }
    }

    /// A level with hand-picked goals on top of the usual layout.
    #[must_use]
    pub fn with_goals(level: u32, goals: Vec<Goal>) -> Self {
        Self {
            goals,
            ..Self::new(level)
        }
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Move budget, or 0 if the level has no [`Goal::Moves`].
    #[must_use]
    pub fn moves(&self) -> u32 {
        self.goals
            .iter()
            .find_map(|goal| match goal {
                Goal::Moves { limit } => Some(*limit),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Target of the score goal, or 0 if there is none.
    #[must_use]
    pub fn score_target(&self) -> u32 {
        self.goals
            .iter()
            .find_map(|goal| match goal {
                Goal::Score { target } => Some(*target),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Star rating for a completed level: 1 for completion, 2 at 150% of
    /// the score target and 3 at 200%.
    #[must_use]
    pub fn stars(&self, score: u32) -> u8 {
        let score = u64::from(score);
        let target = u64::from(self.score_target());
        if score * 2 >= target * 4 {
            3
        } else if score * 2 >= target * 3 {
            2
        } else {
            1
        }
    }
}

fn score_target(level: u32) -> u32 {
    BASE_SCORE_TARGET + (level - 1) * SCORE_TARGET_STEP
}

fn move_budget(level: u32) -> u32 {
    u32::max(MIN_MOVES, BASE_MOVES.saturating_sub((level - 1) / 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one() {
        let spec = LevelSpec::new(1);
        assert_eq!(
            spec.goals(),
            &[Goal::Score { target: 1000 }, Goal::Moves { limit: 20 }]
        );
        assert_eq!(spec.moves(), 20);
        assert_eq!(spec.topology(), &Topology::PLAYABLE);
    }

    #[test]
    fn test_collect_goal_rotates_colors() {
        let spec = LevelSpec::new(2);
        assert!(spec.goals().contains(&Goal::Collect {
            color: PieceColor::Red,
            target: 12
        }));
        let spec = LevelSpec::new(9);
        assert!(spec.goals().contains(&Goal::Collect {
            color: PieceColor::Blue,
            target: 26
        }));
        let spec = LevelSpec::new(100);
        assert!(spec.goals().contains(&Goal::Collect {
            color: PieceColor::ALL[98 % 6],
            target: MAX_COLLECT
        }));
    }

    #[test]
    fn test_moves_floor() {
        assert_eq!(LevelSpec::new(3).moves(), 19);
        assert_eq!(LevelSpec::new(11).moves(), 15);
        assert_eq!(LevelSpec::new(MAX_LEVEL).moves(), MIN_MOVES);
    }

    #[test]
    fn test_score_target_grows() {
        assert_eq!(LevelSpec::new(2).score_target(), 1750);
        assert_eq!(LevelSpec::new(MAX_LEVEL).score_target(), 1000 + 499 * 750);
    }

    #[test]
    fn test_stars() {
        let spec = LevelSpec::new(1);
        assert_eq!(spec.stars(1000), 1);
        assert_eq!(spec.stars(1499), 1);
        assert_eq!(spec.stars(1500), 2);
        assert_eq!(spec.stars(2000), 3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_level_zero_panics() {
        let _ = LevelSpec::new(0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_level_above_max_panics() {
        let _ = LevelSpec::new(MAX_LEVEL + 1);
    }
}
