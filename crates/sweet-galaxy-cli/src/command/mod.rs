use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rand::Rng as _;
use sweet_galaxy_engine::{BoardSeed, MAX_LEVEL, ScoringRules};

use crate::{
    command::play::PlayArg,
    storage::Progress,
    util::{self, LogTarget},
};

use self::{auto_play::AutoPlayArg, replay::ReplayArg};

mod auto_play;
mod play;
mod progress;
mod replay;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[clap(flatten)]
    global: GlobalArg,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play levels in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Let the hint bot play a level without a UI
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Re-run a saved recording and check its final score
    Replay(#[clap(flatten)] ReplayArg),
    /// Show unlocked levels and best scores
    Progress,
}

/// Options shared by every mode.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GlobalArg {
    /// Log level filter (overridden by `RUST_LOG`)
    #[clap(long, global = true, default_value = "info")]
    log_level: String,
    /// Directory holding progress, recordings and logs
    #[clap(long, global = true, default_value = "./data/")]
    data_dir: PathBuf,
    /// JSON file with scoring rules replacing the defaults
    #[clap(long, global = true)]
    rules: Option<PathBuf>,
}

impl GlobalArg {
    pub(crate) fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub(crate) fn load_rules(&self) -> anyhow::Result<ScoringRules> {
        match &self.rules {
            Some(path) => util::read_json_file("scoring rules", path),
            None => Ok(ScoringRules::default()),
        }
    }
}

/// Level and seed selection shared by the play modes.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct LevelArg {
    /// Level to play (defaults to the highest unlocked level)
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_LEVEL)))]
    level: Option<u32>,
    /// Board seed as up to 32 hex digits (random if omitted)
    #[clap(long)]
    seed: Option<BoardSeed>,
}

impl LevelArg {
    pub(crate) fn seed(&self) -> BoardSeed {
        self.seed.unwrap_or_else(|| rand::rng().random())
    }

    /// The requested level, or the highest unlocked one.
    pub(crate) fn level_or_unlocked(&self, progress: &Progress) -> anyhow::Result<u32> {
        let unlocked = progress.unlocked_level();
        let level = self.level.unwrap_or(unlocked);
        anyhow::ensure!(
            progress.is_unlocked(level),
            "level {level} is locked (highest unlocked level is {unlocked})"
        );
        Ok(level)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let global = &args.global;
    let mode = args.mode.unwrap_or(Mode::Play(PlayArg::default()));

    let target = match mode {
        Mode::Play(_) => LogTarget::File(global.data_dir()),
        _ => LogTarget::Stderr,
    };
    let _logger = util::init_logger(&global.log_level, target)?;

    match &mode {
        Mode::Play(arg) => play::run(global, arg)?,
        Mode::AutoPlay(arg) => auto_play::run(global, arg)?,
        Mode::Replay(arg) => replay::run(arg)?,
        Mode::Progress => progress::run(global)?,
    }
    Ok(())
}
