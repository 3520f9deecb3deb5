//! Skate order and billing order.

use tracing::warn;

use crate::core::{Billing, Participant, Performance, Show, SubRoster};
use crate::{ScheduleError, ScheduleResult};

/// Resolve the running order of the show.
///
/// With an explicit skate order, performances come back in exactly that
/// sequence and an unknown key is an error. Without one, every performance
/// that has not been withdrawn comes back in registration order.
pub fn ordered_performances(show: &Show) -> ScheduleResult<Vec<&Performance>> {
    let Some(order) = show.explicit_order() else {
        return Ok(show.performances().filter(|p| !p.withdrawn).collect());
    };

    let mut ordered = Vec::with_capacity(order.len());
    for entry in order {
        let performance =
            show.performance(&entry.key)
                .ok_or_else(|| ScheduleError::UnknownPerformance {
                    key: entry.key.clone(),
                    line: entry.line,
                })?;
        if performance.withdrawn {
            warn!(key = %entry.key, line = entry.line, "withdrawn performance is in the skate order");
        }
        ordered.push(performance);
    }
    Ok(ordered)
}

/// Participants of `performance` in the order they should be billed.
pub fn billing_order<'a>(show: &'a Show, performance: &Performance) -> Vec<&'a Participant> {
    resolve_members(show, &performance.participants, performance.billing)
}

/// Sub-rosters of `performance` in label order, each with billed members.
pub fn billed_sub_rosters<'a, 'p>(
    show: &'a Show,
    performance: &'p Performance,
) -> Vec<(&'p SubRoster, Vec<&'a Participant>)> {
    performance
        .sub_rosters
        .iter()
        .filter(|s| !s.members.is_empty())
        .map(|s| (s, resolve_members(show, &s.members, performance.billing)))
        .collect()
}

fn resolve_members<'a>(show: &'a Show, ids: &[String], billing: Billing) -> Vec<&'a Participant> {
    let mut members: Vec<&Participant> = ids.iter().filter_map(|id| show.participant(id)).collect();
    if billing == Billing::Alphabetical {
        // stable: equal names keep registration order
        members.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }
    members
}
