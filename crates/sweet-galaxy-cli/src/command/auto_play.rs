use sweet_galaxy_engine::{GoalProgress, MAX_LEVEL};

use crate::{
    command::{GlobalArg, LevelArg},
    record::RecordingSession,
};

/// Shuffles allowed in a row before the bot gives up on a board.
const MAX_CONSECUTIVE_SHUFFLES: usize = 16;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    #[clap(flatten)]
    level: LevelArg,
    /// Save the game recording when the level ends
    #[clap(long)]
    save_recording: bool,
}

pub(crate) fn run(global: &GlobalArg, arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        level,
        save_recording,
    } = arg;

    let rules = global.load_rules()?;
    let seed = level.seed();
    let level = level.level.unwrap_or(1);
    let mut session = RecordingSession::new(level, seed, rules);
    play(&mut session)?;

    println!("level:   {} / {MAX_LEVEL}", session.level());
    println!("seed:    {}", session.seed());
    println!("result:  {:?}", session.status());
    println!(
        "score:   {} (bonus {}, target {})",
        session.score(),
        session.bonus(),
        session.spec().score_target()
    );
    println!("moves:   {} used, {} left", session.moves_used(), session.moves_left());
    if let Some(stars) = session.stars() {
        println!("stars:   {stars}");
    }
    for progress in session.goal_progress() {
        println!("goal:    {}", format_goal(&progress));
    }

    if *save_recording {
        let record_dir = global.data_dir().join("recordings");
        let path = session.recording().save(&record_dir)?;
        println!("saved:   {}", path.display());
    }

    Ok(())
}

/// Plays the hint move until the level ends, shuffling on deadlock.
fn play(session: &mut RecordingSession) -> anyhow::Result<()> {
    let mut shuffles = 0;
    while !session.status().is_terminal() {
        let Some(hint) = session.find_hint() else {
            anyhow::ensure!(
                shuffles < MAX_CONSECUTIVE_SHUFFLES,
                "no legal move after {shuffles} shuffles"
            );
            session.try_shuffle()?;
            shuffles += 1;
            continue;
        };
        shuffles = 0;
        let outcome = session.play_swap(hint.from, hint.to)?;
        log::debug!(
            "played {hint} ({outcome:?}): score {}, {} move(s) left",
            session.score(),
            session.moves_left()
        );
    }
    Ok(())
}

pub(crate) fn format_goal(progress: &GoalProgress) -> String {
    let mark = if progress.satisfied { "done" } else { "open" };
    format!("{} [{}] {}", progress.goal, progress.current, mark)
}
