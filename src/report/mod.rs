//! Report rendering for a timed show.
//!
//! This module provides:
//! - `text`: schedule, keys, summary and announcer blurbs
//! - `program`: the LaTeX program booklet
//! - `json`: `schedule.json` for other tools
//!
//! [`write_reports`] attempts every report even when some fail.

pub mod json;
pub mod program;
pub mod text;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::command::CommandTemplate;
use crate::core::{Performance, Show};
use crate::schedule::ScheduledPerformance;
use crate::{ScheduleError, ScheduleResult, ensure_parent_dir};

// Re-export key types
pub use json::{ExportRoster, ScheduleExport, ScheduledEntry, render_json};
pub use program::{PROGRAM_MARKER, latex_escape, render_program};
pub use text::{
    MISSING_BLURB, participants_line, render_blurbs, render_keys, render_schedule, render_summary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Schedule,
    Keys,
    Summary,
    Blurbs,
    Program,
    Json,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::Keys,
        ReportKind::Summary,
        ReportKind::Schedule,
        ReportKind::Blurbs,
        ReportKind::Program,
        ReportKind::Json,
    ];

    pub fn filename(self) -> &'static str {
        match self {
            ReportKind::Schedule => "schedule.txt",
            ReportKind::Keys => "keys.txt",
            ReportKind::Summary => "summary.txt",
            ReportKind::Blurbs => "blurbs.txt",
            ReportKind::Program => "program.tex",
            ReportKind::Json => "schedule.json",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub out_dir: PathBuf,
    /// Program template; without one the program is reported as failed.
    pub template: Option<PathBuf>,
    /// Run after `program.tex` is written.
    pub typeset: Option<CommandTemplate>,
}

#[derive(Debug)]
pub struct ReportFailure {
    pub report: String,
    pub error: ScheduleError,
}

impl fmt::Display for ReportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.report, self.error)
    }
}

#[derive(Debug, Default)]
pub struct ReportOutcome {
    pub written: Vec<PathBuf>,
    pub failures: Vec<ReportFailure>,
}

impl ReportOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Collapse the failures into one error after every report was attempted.
    pub fn into_result(self) -> ScheduleResult<Vec<PathBuf>> {
        if self.failures.is_empty() {
            return Ok(self.written);
        }
        let lines: Vec<String> = self.failures.iter().map(|f| f.to_string()).collect();
        Err(ScheduleError::Message(format!(
            "{} report(s) failed:\n  {}",
            self.failures.len(),
            lines.join("\n  ")
        )))
    }

    fn record(&mut self, report: &str, result: ScheduleResult<PathBuf>) {
        match result {
            Ok(path) => {
                info!(path = %path.display(), "wrote report");
                self.written.push(path);
            }
            Err(e) => {
                error!(report = report, "report failed: {e}");
                self.failures.push(ReportFailure {
                    report: report.to_string(),
                    error: e,
                });
            }
        }
    }
}

fn write_file(path: &Path, contents: &str) -> ScheduleResult<PathBuf> {
    ensure_parent_dir(path)?;
    std::fs::write(path, contents)
        .map_err(|e| ScheduleError::Message(format!("failed to write {}: {e}", path.display())))?;
    Ok(path.to_path_buf())
}

/// Render one report to a string.
pub fn render_report(
    kind: ReportKind,
    show: &Show,
    ordered: &[&Performance],
    schedule: &[ScheduledPerformance<'_>],
    template: Option<&Path>,
) -> ScheduleResult<String> {
    match kind {
        ReportKind::Schedule => Ok(render_schedule(show, schedule)),
        ReportKind::Keys => Ok(render_keys(ordered)),
        ReportKind::Summary => Ok(render_summary(show, ordered)),
        ReportKind::Blurbs => Ok(render_blurbs(show, ordered)),
        ReportKind::Json => Ok(render_json(show, schedule, show.start_time)?),
        ReportKind::Program => {
            let path = template.ok_or_else(|| {
                ScheduleError::Message("no program template configured".into())
            })?;
            if !path.exists() {
                return Err(ScheduleError::MissingSource {
                    path: path.to_path_buf(),
                });
            }
            let template = std::fs::read_to_string(path)?;
            render_program(&template, show, ordered)
        }
    }
}

/// Write every report into `options.out_dir`, then typeset the program.
pub fn write_reports(
    show: &Show,
    ordered: &[&Performance],
    schedule: &[ScheduledPerformance<'_>],
    options: &ReportOptions,
) -> ReportOutcome {
    let mut outcome = ReportOutcome::default();
    for kind in ReportKind::ALL {
        let path = options.out_dir.join(kind.filename());
        let result = render_report(kind, show, ordered, schedule, options.template.as_deref())
            .and_then(|text| write_file(&path, &text));
        let program_written = kind == ReportKind::Program && result.is_ok();
        outcome.record(kind.filename(), result);

        if program_written {
            if let Some(typeset) = &options.typeset {
                let result = typeset
                    .run(&[("tex", path.as_path()), ("outdir", options.out_dir.as_path())])
                    .map(|()| path.with_extension("pdf"));
                outcome.record("program.pdf", result);
            }
        }
    }
    outcome
}
