//! Machine-readable schedule export (`schedule.json`).

use serde::Serialize;
use time::PrimitiveDateTime;

use crate::core::Show;
use crate::schedule::{ScheduledPerformance, billed_sub_rosters, billing_order, format_clock, show_end};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleExport {
    pub show: String,
    pub start: String,
    pub end: String,
    pub performances: Vec<ScheduledEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledEntry {
    pub key: String,
    pub title: String,
    /// `hh:mm:ss`, 12-hour clock, as printed on the schedule.
    pub start: String,
    pub start_offset_secs: i64,
    pub length_seconds: u32,
    pub transition_secs: u32,
    pub participants: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_rosters: Vec<ExportRoster>,
    pub blurb: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub withdrawn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRoster {
    pub label: String,
    pub members: Vec<String>,
}

impl ScheduleExport {
    pub fn new(show: &Show, schedule: &[ScheduledPerformance<'_>], start: PrimitiveDateTime) -> Self {
        let performances = schedule
            .iter()
            .map(|slot| {
                let p = slot.performance;
                let sub_rosters = if p.has_labeled_groups() {
                    billed_sub_rosters(show, p)
                        .into_iter()
                        .map(|(roster, members)| ExportRoster {
                            label: roster.label.clone(),
                            members: members.iter().map(|m| m.full_name()).collect(),
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                ScheduledEntry {
                    key: p.id.clone(),
                    title: p.display_title().to_string(),
                    start: format_clock(slot.start),
                    start_offset_secs: (slot.start - start).whole_seconds(),
                    length_seconds: p.length_seconds,
                    transition_secs: slot.transition_secs,
                    participants: billing_order(show, p).iter().map(|m| m.full_name()).collect(),
                    sub_rosters,
                    blurb: p.blurb.clone(),
                    category: p.category.as_ref().map(|c| c.label().to_string()),
                    withdrawn: p.withdrawn,
                }
            })
            .collect();
        ScheduleExport {
            show: show.name.clone(),
            start: format_clock(start),
            end: format_clock(show_end(schedule, start)),
            performances,
        }
    }
}

pub fn render_json(
    show: &Show,
    schedule: &[ScheduledPerformance<'_>],
    start: PrimitiveDateTime,
) -> anyhow::Result<String> {
    let export = ScheduleExport::new(show, schedule, start);
    Ok(serde_json::to_string_pretty(&export)?)
}
