//! LaTeX program booklet rendered into `programtemplate.tex`.
//!
//! The template is copied line by line; the line `%!!!PROGRAMCONTENT` is
//! replaced with one `\programnumber{title}{participants}` per performance,
//! followed by a `\subroster{label}{names}` for each named group.

use std::fmt::Write as _;

use crate::core::{Performance, Show};
use crate::schedule::{billed_sub_rosters, billing_order};
use crate::{ScheduleError, ScheduleResult};

use super::text::join_names;

pub const PROGRAM_MARKER: &str = "%!!!PROGRAMCONTENT";

/// Escape LaTeX special characters in running text.
pub fn latex_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                result.push('\\');
                result.push(c);
            }
            '~' => result.push_str("\\textasciitilde{}"),
            '^' => result.push_str("\\textasciicircum{}"),
            _ => result.push(c),
        }
    }
    result
}

fn program_entry(out: &mut String, show: &Show, performance: &Performance) {
    let title = performance.display_title();
    let participants = if performance.has_labeled_groups() {
        billed_sub_rosters(show, performance)
            .into_iter()
            .find(|(roster, _)| roster.is_default())
            .map(|(_, members)| join_names(members.iter().map(|p| p.full_name())))
            .unwrap_or_default()
    } else {
        join_names(billing_order(show, performance).iter().map(|p| p.full_name()))
    };
    let participants = if participants == title {
        String::new()
    } else {
        latex_escape(&participants)
    };
    let _ = writeln!(
        out,
        "\\programnumber{{{}}}{{{}}}",
        latex_escape(title),
        participants
    );

    for (roster, members) in billed_sub_rosters(show, performance) {
        if roster.is_default() {
            continue;
        }
        let names = join_names(members.iter().map(|p| p.full_name()));
        let _ = writeln!(
            out,
            "\\subroster{{{}}}{{{}}}",
            latex_escape(&roster.label),
            latex_escape(&names)
        );
    }
}

/// Fill `template` with the running order. A template without the marker
/// line is an error.
pub fn render_program(template: &str, show: &Show, ordered: &[&Performance]) -> ScheduleResult<String> {
    let mut out = String::with_capacity(template.len() + ordered.len() * 64);
    let mut found = false;
    for line in template.lines() {
        if line.trim_end() == PROGRAM_MARKER {
            found = true;
            for performance in ordered {
                program_entry(&mut out, show, performance);
            }
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }
    if !found {
        return Err(ScheduleError::Message(format!(
            "program template has no `{PROGRAM_MARKER}` line"
        )));
    }
    Ok(out)
}
