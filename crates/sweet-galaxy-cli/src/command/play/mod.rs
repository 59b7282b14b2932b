use crate::{
    command::{GlobalArg, LevelArg},
    storage::ProgressStore,
    tui::Tui,
};

use self::app::PlayApp;

mod app;
mod screen;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    level: LevelArg,
    /// Save a recording of every finished level
    #[clap(long)]
    save_recording: bool,
}

pub(crate) fn run(global: &GlobalArg, arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        level,
        save_recording,
    } = arg;

    let rules = global.load_rules()?;
    let store = ProgressStore::new(global.data_dir());
    let progress = store.load();
    let start_level = level.level_or_unlocked(&progress)?;
    let record_dir = save_recording.then(|| global.data_dir().join("recordings"));

    let mut app = PlayApp::new(rules, store, progress, record_dir);
    app.start(start_level, level.seed());
    Tui::new().run(&mut app)
}
