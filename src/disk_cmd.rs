use std::path::PathBuf;

use crate::config::load_show_config;
use crate::music::prepare_ordered_disk;
use crate::pipeline::{load_show, plan};
use crate::sources::HttpFetcher;
use crate::ScheduleResult;

/// Copy cached music into `music_ordered/` in running order.
pub fn run(config: PathBuf, no_tags: bool) -> ScheduleResult<()> {
    let cfg = load_show_config(&config)?;
    let start = cfg.start_time()?;
    let fetcher = HttpFetcher::new()?;
    let loaded = load_show(&cfg, start, &fetcher)?;
    let plan = plan(&loaded.show)?;

    let report = prepare_ordered_disk(
        &plan.ordered,
        &cfg.music_dir(),
        &cfg.ordered_music_dir(),
        &cfg.music.album,
        !no_tags,
    )?;
    for track in &report.tracks {
        println!("{}", track.display());
    }
    for key in &report.missing {
        println!("missing music: {key}");
    }
    Ok(())
}
