use serde::{Deserialize, Serialize};

/// Point values used while resolving cascades.
///
/// The defaults match the stock game. A different set can be loaded from
/// JSON; missing fields fall back to the defaults.
///
/// # Example
///
/// ```
/// use sweet_galaxy_engine::ScoringRules;
///
/// let rules = ScoringRules::default();
/// assert_eq!(rules.score_for(3, 0), 45);
/// assert_eq!(rules.score_for(4, 1), 90);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Points for each removed piece before the combo multiplier.
    pub points_per_piece: u32,
    /// Bonus for each move left when a level is completed.
    pub bonus_per_move: u32,
    /// Growth of the combo multiplier per cascade iteration, in halves.
    ///
    /// With the default of 1 the multiplier is `1 + 0.5 × combo`.
    pub combo_step_halves: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            points_per_piece: 15,
            bonus_per_move: 50,
            combo_step_halves: 1,
        }
    }
}

impl ScoringRules {
    /// Score for removing `removed` pieces at combo index `combo`.
    ///
    /// Fractional points are rounded down.
    #[must_use]
    pub fn score_for(&self, removed: usize, combo: u32) -> u32 {
        let base = u64::try_from(removed).unwrap_or(u64::MAX) * u64::from(self.points_per_piece);
        let multiplier_halves = 2 + u64::from(combo) * u64::from(self.combo_step_halves);
        u32::try_from(base.saturating_mul(multiplier_halves) / 2).unwrap_or(u32::MAX)
    }

    /// Bonus for completing a level with `moves_left` moves unused.
    #[must_use]
    pub fn move_bonus(&self, moves_left: u32) -> u32 {
        moves_left.saturating_mul(self.bonus_per_move)
    }
}
