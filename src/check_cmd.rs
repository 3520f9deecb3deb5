use std::path::PathBuf;

use crate::config::load_show_config;
use crate::pipeline::{load_show, plan};
use crate::report::render_schedule;
use crate::schedule::{format_clock, show_end};
use crate::sources::HttpFetcher;
use crate::{ScheduleError, ScheduleResult};

/// Ingest, order and time the show, then print the warnings and the
/// schedule. Nothing is written to the show directory.
pub fn run(config: PathBuf, start: Option<String>, strict: bool) -> ScheduleResult<()> {
    let mut cfg = load_show_config(&config)?;
    cfg.override_start(start);
    let start = cfg.start_time()?;

    let fetcher = HttpFetcher::new()?;
    let loaded = load_show(&cfg, start, &fetcher)?;
    let plan = plan(&loaded.show)?;

    let warnings = &loaded.ingest.warnings;
    if !warnings.is_empty() {
        println!("{} warning(s):", warnings.len());
        for w in warnings {
            println!("  {w}");
        }
        println!();
    }
    for performance in plan.ordered.iter().filter(|p| p.blurb.is_empty()) {
        println!("no blurb: {}", performance.id);
    }
    print!("{}", render_schedule(&loaded.show, &plan.schedule));
    println!("ends {}", format_clock(show_end(&plan.schedule, start)));

    if strict && !warnings.is_empty() {
        return Err(ScheduleError::Message(format!(
            "{} ingest warning(s) in strict mode",
            warnings.len()
        )));
    }
    Ok(())
}
