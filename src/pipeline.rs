//! The whole run, as explicit stages over one `Show`:
//! load sources, ingest, (resolve music), order, time, render.

use time::PrimitiveDateTime;
use tracing::info;

use crate::builder::{IngestOptions, IngestReport, ingest_group_sheet, ingest_ledger, ingest_with};
use crate::command::CommandTemplate;
use crate::config::ShowConfig;
use crate::core::{Performance, Show};
use crate::report::{ReportOptions, ReportOutcome, write_reports};
use crate::schedule::{ScheduledPerformance, compute_schedule, ordered_performances};
use crate::sources::{
    Fetcher, load_group_sheet, load_ledger, load_registrations, load_skate_order,
    locate_optional_sheet, locate_sheet,
};
use crate::ScheduleResult;

/// A show built from its sources, with everything ingestion complained about.
#[derive(Debug, Clone)]
pub struct LoadedShow {
    pub show: Show,
    pub ingest: IngestReport,
}

/// Read every configured source and fold it into a fresh `Show`.
///
/// The ledger goes in first so `strict_roster` can check registrations
/// against it; the group sheet goes in last. An unknown key in the skate
/// order is fatal here, before anything is rendered.
pub fn load_show(
    config: &ShowConfig,
    start: PrimitiveDateTime,
    fetcher: &dyn Fetcher,
) -> ScheduleResult<LoadedShow> {
    let inputs = config.inputs_dir();
    let cache = config.inputs.cache_sheets;
    let columns = &config.columns;
    let mut show = Show::new(config.show.name.clone(), start).with_timing(config.timing.clone());
    let mut report = IngestReport::default();

    if let Some(ledger) = &config.inputs.ledger {
        let path = locate_sheet(&inputs, ledger, cache, fetcher)?;
        report.merge(ingest_ledger(&mut show, &load_ledger(&path, columns)?));
    }

    let path = locate_sheet(&inputs, &config.inputs.registrations, cache, fetcher)?;
    let records = load_registrations(&path, columns)?;
    let options = IngestOptions {
        strict_roster: config.show.strict_roster,
    };
    report.merge(ingest_with(&mut show, &records, options));

    if let Some(group_sheet) = &config.inputs.group_sheet {
        if let Some(path) = locate_optional_sheet(&inputs, group_sheet, cache, fetcher)? {
            report.merge(ingest_group_sheet(&mut show, &load_group_sheet(&path, columns)?));
        }
    }

    if let Some(order) = &config.inputs.skate_order {
        if let Some(entries) = load_skate_order(&inputs.join(order))? {
            show.set_explicit_order(entries);
        }
    }
    show.validate()?;

    info!(
        performances = show.performance_count(),
        participants = show.participant_count(),
        warnings = report.warnings.len(),
        "show loaded"
    );
    Ok(LoadedShow {
        show,
        ingest: report,
    })
}

/// Running order with start times.
#[derive(Debug, Clone)]
pub struct Plan<'a> {
    pub ordered: Vec<&'a Performance>,
    pub schedule: Vec<ScheduledPerformance<'a>>,
}

pub fn plan(show: &Show) -> ScheduleResult<Plan<'_>> {
    let ordered = ordered_performances(show)?;
    let schedule = compute_schedule(show, &ordered, show.start_time);
    Ok(Plan { ordered, schedule })
}

/// Report options for a show directory: outputs land in the show root.
pub fn report_options(config: &ShowConfig, typeset: bool) -> ReportOptions {
    ReportOptions {
        out_dir: config.root(),
        template: Some(config.program_template()),
        typeset: typeset.then(|| CommandTemplate::new(config.commands.typeset.clone())),
    }
}

pub fn render(show: &Show, plan: &Plan<'_>, options: &ReportOptions) -> ReportOutcome {
    write_reports(show, &plan.ordered, &plan.schedule, options)
}
