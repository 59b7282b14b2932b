use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sweet_galaxy_engine::MAX_LEVEL;

use crate::util;

const PROGRESS_FILE_NAME: &str = "progress.json";

/// Persistent player progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    unlocked_level: u32,
    leaderboard: BTreeMap<u32, LeaderboardEntry>,
}

/// Best result on one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u32,
    pub stars: u8,
    pub achieved_at: DateTime<Utc>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            unlocked_level: 1,
            leaderboard: BTreeMap::new(),
        }
    }
}

impl Progress {
    /// Highest level the player may start.
    pub fn unlocked_level(&self) -> u32 {
        self.unlocked_level.clamp(1, MAX_LEVEL)
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        (1..=self.unlocked_level()).contains(&level)
    }

    pub fn best(&self, level: u32) -> Option<&LeaderboardEntry> {
        self.leaderboard.get(&level)
    }

    pub fn entries(&self) -> impl Iterator<Item = (u32, &LeaderboardEntry)> {
        self.leaderboard
            .iter()
            .filter(|(level, _)| (1..=MAX_LEVEL).contains(*level))
            .map(|(level, entry)| (*level, entry))
    }

    /// Records a completed level.
    ///
    /// The leaderboard entry is replaced only by a strictly higher score.
    /// Completing the highest unlocked level unlocks the next one. Returns
    /// `true` if the score is a new best.
    pub fn record_completion(
        &mut self,
        level: u32,
        score: u32,
        stars: u8,
        achieved_at: DateTime<Utc>,
    ) -> bool {
        if level == self.unlocked_level() && level < MAX_LEVEL {
            self.unlocked_level = level + 1;
            log::info!("level {} unlocked", self.unlocked_level);
        }

        let is_best = self.best(level).is_none_or(|entry| score > entry.score);
        if is_best {
            self.leaderboard.insert(
                level,
                LeaderboardEntry {
                    score,
                    stars,
                    achieved_at,
                },
            );
        }
        is_best
    }
}

/// Loads and saves [`Progress`] in the data directory.
///
/// Failures are logged and never abort play: a missing or unreadable file
/// reads as fresh progress, and a failed save only loses this run's result.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(PROGRESS_FILE_NAME),
        }
    }

    pub fn load(&self) -> Progress {
        if !self.path.exists() {
            log::debug!("no progress file at {}", self.path.display());
            return Progress::default();
        }
        util::read_json_file("progress", &self.path).unwrap_or_else(|err| {
            log::warn!("{err:#}; starting from fresh progress");
            Progress::default()
        })
    }

    pub fn save(&self, progress: &Progress) {
        if let Err(err) = util::write_json_file("progress", &self.path, progress) {
            log::warn!("{err:#}; progress not saved");
        }
    }
}
