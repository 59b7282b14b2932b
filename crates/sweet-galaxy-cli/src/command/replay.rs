use std::path::PathBuf;

use crate::{
    command::auto_play::format_goal,
    record::Recording,
    util,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Path to the recording file (JSON format)
    recording_path: PathBuf,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg { recording_path } = arg;

    let recording: Recording = util::read_json_file("recording", recording_path)?;
    log::info!(
        "replaying level {} (seed {}, {} actions, recorded {})",
        recording.level,
        recording.seed,
        recording.actions.len(),
        recording.recorded_at
    );

    let session = recording.replay()?;
    println!("level:   {}", session.level());
    println!(
        "score:   {} (recorded {})",
        session.score(),
        recording.final_score
    );
    println!(
        "result:  {:?} (recorded {:?})",
        session.status(),
        recording.status
    );
    for progress in session.goal_progress() {
        println!("goal:    {}", format_goal(&progress));
    }

    anyhow::ensure!(
        session.score() == recording.final_score && session.status() == recording.status,
        "replay diverged from {}",
        recording_path.display()
    );
    println!("replay matches the recording");
    Ok(())
}
