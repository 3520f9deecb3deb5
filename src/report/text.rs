//! Plain-text reports for the announcer, the organizers and the sound booth.

use std::fmt::Write as _;

use crate::core::{Performance, Show};
use crate::schedule::{ScheduledPerformance, billed_sub_rosters, billing_order, format_clock};

pub const MISSING_BLURB: &str = "MISSING BLURB";

const SCHEDULE_INDENT: &str = "         ";

/// Billed participant names, labeled by sub-roster when a performance has
/// named groups: `"Coaches: Amy Lee; Skaters: Jane Doe, John Smith"`.
pub fn participants_line(show: &Show, performance: &Performance) -> String {
    if !performance.has_labeled_groups() {
        return join_names(billing_order(show, performance).iter().map(|p| p.full_name()));
    }
    billed_sub_rosters(show, performance)
        .into_iter()
        .map(|(roster, members)| {
            let names = join_names(members.iter().map(|p| p.full_name()));
            if roster.is_default() {
                names
            } else {
                format!("{}: {names}", roster.label)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn join_names(names: impl Iterator<Item = String>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// `hh:mm:ss Title` with the participants indented underneath.
pub fn render_schedule(show: &Show, schedule: &[ScheduledPerformance<'_>]) -> String {
    let mut out = String::new();
    for slot in schedule {
        let _ = writeln!(out, "{} {}", format_clock(slot.start), slot.performance.display_title());
        let _ = writeln!(out, "{SCHEDULE_INDENT}{}", participants_line(show, slot.performance));
    }
    out
}

pub fn render_keys(ordered: &[&Performance]) -> String {
    let mut out = String::new();
    for performance in ordered {
        let _ = writeln!(out, "{}", performance.id);
    }
    out
}

/// Key, title and length per performance, for checking the ingest.
pub fn render_summary(show: &Show, ordered: &[&Performance]) -> String {
    let mut out = String::new();
    for performance in ordered {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            performance.id,
            performance.display_title(),
            performance.length_seconds
        );
        let _ = writeln!(out, "{}\n", participants_line(show, performance));
    }
    out
}

/// Announcer script. A missing blurb leaves room to write one in by hand.
pub fn render_blurbs(show: &Show, ordered: &[&Performance]) -> String {
    let mut out = String::new();
    for performance in ordered {
        let title = performance.display_title();
        let _ = writeln!(out, "{title}");
        let participants = participants_line(show, performance);
        if participants != title {
            let _ = writeln!(out, "{participants}");
        }
        if performance.blurb.is_empty() {
            let _ = writeln!(out, "{MISSING_BLURB}\n\n\n\n\n");
        } else {
            out.push_str(&performance.blurb);
        }
        out.push_str("\n\n");
    }
    out
}
