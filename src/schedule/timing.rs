//! Wall-clock timing for an ordered skate list.
//!
//! Each performance starts when the previous one's music ends plus a
//! transition gap. The gap covers the announcer reading the blurb and
//! skaters getting onto the ice; large groups take longer to set up.

use serde::{Deserialize, Serialize};
use time::{Duration, PrimitiveDateTime};

use crate::core::{Performance, Show};

/// Transition gap tuning. Defaults match the rules the show has always run with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingPolicy {
    /// Gap after an intermission, regardless of who is in it.
    pub intermission_gap_secs: u32,
    /// Gap after an item with nobody on the ice.
    pub empty_gap_secs: u32,
    /// Fixed announcer lead-in before the blurb.
    pub announce_base_secs: u32,
    /// Blurb characters read per second of announcing.
    pub blurb_chars_per_sec: u32,
    /// Minimum gap for groups smaller than `large_group_size`.
    pub small_group_min_gap_secs: u32,
    /// Minimum gap for groups of `large_group_size` or more.
    pub large_group_min_gap_secs: u32,
    pub large_group_size: usize,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        TimingPolicy {
            intermission_gap_secs: 0,
            empty_gap_secs: 0,
            announce_base_secs: 15,
            blurb_chars_per_sec: 10,
            small_group_min_gap_secs: 40,
            large_group_min_gap_secs: 80,
            large_group_size: 5,
        }
    }
}

impl TimingPolicy {
    /// Seconds between the end of `performance` and the start of the next item.
    pub fn transition_gap(&self, performance: &Performance) -> u32 {
        if performance.is_intermission() {
            return self.intermission_gap_secs;
        }
        let count = performance.participant_count();
        if count == 0 {
            return self.empty_gap_secs;
        }
        let announce = self.announce_secs(&performance.blurb);
        let floor = if count < self.large_group_size {
            self.small_group_min_gap_secs
        } else {
            self.large_group_min_gap_secs
        };
        floor.max(announce)
    }

    fn announce_secs(&self, blurb: &str) -> u32 {
        if self.blurb_chars_per_sec == 0 {
            return self.announce_base_secs;
        }
        let chars = u32::try_from(blurb.chars().count()).unwrap_or(u32::MAX);
        self.announce_base_secs
            .saturating_add(chars / self.blurb_chars_per_sec)
    }
}

/// A performance with its computed start time.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledPerformance<'a> {
    pub performance: &'a Performance,
    pub start: PrimitiveDateTime,
    pub transition_secs: u32,
}

impl ScheduledPerformance<'_> {
    /// When the next item may start.
    pub fn next_start(&self) -> PrimitiveDateTime {
        self.start
            + Duration::seconds(
                i64::from(self.performance.length_seconds) + i64::from(self.transition_secs),
            )
    }
}

/// Assign a start time to every performance in `ordered`, beginning at `start`.
pub fn compute_schedule<'a>(
    show: &Show,
    ordered: &[&'a Performance],
    start: PrimitiveDateTime,
) -> Vec<ScheduledPerformance<'a>> {
    let mut clock = start;
    let mut schedule = Vec::with_capacity(ordered.len());
    for &performance in ordered {
        let slot = ScheduledPerformance {
            performance,
            start: clock,
            transition_secs: show.timing.transition_gap(performance),
        };
        clock = slot.next_start();
        schedule.push(slot);
    }
    schedule
}

/// Time of day the show ends (start of the slot after the last item).
pub fn show_end(schedule: &[ScheduledPerformance<'_>], start: PrimitiveDateTime) -> PrimitiveDateTime {
    schedule.last().map(|s| s.next_start()).unwrap_or(start)
}

/// Format a time of day as `hh:mm:ss` on a 12-hour clock.
pub fn format_clock(at: PrimitiveDateTime) -> String {
    let fmt = time::macros::format_description!("[hour repr:12]:[minute]:[second]");
    at.format(&fmt).unwrap_or_default()
}
