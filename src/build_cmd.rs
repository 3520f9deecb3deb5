use std::path::PathBuf;

use tracing::info;

use crate::config::load_show_config;
use crate::music::{LocalMusicResolver, resolve_durations};
use crate::pipeline::{load_show, plan, render, report_options};
use crate::sources::HttpFetcher;
use crate::ScheduleResult;

/// Full run: sources, music, schedule and every report.
pub fn run(
    config: PathBuf,
    start: Option<String>,
    skip_music: bool,
    skip_typeset: bool,
) -> ScheduleResult<()> {
    let mut cfg = load_show_config(&config)?;
    cfg.override_start(start);
    let start = cfg.start_time()?;

    let fetcher = HttpFetcher::new()?;
    let mut loaded = load_show(&cfg, start, &fetcher)?;

    let music_warnings = if skip_music {
        0
    } else {
        let resolver = LocalMusicResolver::new(&cfg, Box::new(HttpFetcher::new()?));
        resolve_durations(&mut loaded.show, &resolver).warnings.len()
    };

    let plan = plan(&loaded.show)?;
    let outcome = render(&loaded.show, &plan, &report_options(&cfg, !skip_typeset));

    info!(
        performances = plan.ordered.len(),
        ingest_warnings = loaded.ingest.warnings.len(),
        music_warnings = music_warnings,
        "build finished"
    );
    let written = outcome.into_result()?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
