use sweet_galaxy_engine::LevelSpec;

use crate::{command::GlobalArg, storage::ProgressStore};

pub(crate) fn run(global: &GlobalArg) -> anyhow::Result<()> {
    let progress = ProgressStore::new(global.data_dir()).load();

    println!("unlocked level: {}", progress.unlocked_level());
    if progress.entries().next().is_none() {
        println!("no level completed yet");
        return Ok(());
    }

    println!("{:>5}  {:>7}  {:>7}  {:<5}  date", "level", "best", "target", "stars");
    for (level, entry) in progress.entries() {
        let target = LevelSpec::new(level).score_target();
        let stars = "*".repeat(usize::from(entry.stars));
        println!(
            "{level:>5}  {:>7}  {target:>7}  {stars:<5}  {}",
            entry.score,
            entry.achieved_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
