//! `skate_order.txt`: one performance key per line.

use std::path::Path;

use tracing::debug;

use crate::core::OrderEntry;
use crate::{ScheduleError, ScheduleResult};

/// Parse an order file. Blank lines and `#` comments are skipped; line
/// numbers are 1-based positions in the file.
pub fn parse_skate_order(text: &str) -> Vec<OrderEntry> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let key = line.trim();
            if key.is_empty() || key.starts_with('#') {
                return None;
            }
            Some(OrderEntry {
                key: key.to_string(),
                line: i + 1,
            })
        })
        .collect()
}

/// Read the order file if it exists. A file with no keys yet counts as
/// absent, so registration order still applies.
pub fn load_skate_order(path: &Path) -> ScheduleResult<Option<Vec<OrderEntry>>> {
    if !path.exists() {
        debug!(path = %path.display(), "no skate order file, using registration order");
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| ScheduleError::Message(format!("failed to read {}: {e}", path.display())))?;
    let entries = parse_skate_order(&text);
    if entries.is_empty() {
        debug!(path = %path.display(), "skate order file lists no keys, using registration order");
        return Ok(None);
    }
    Ok(Some(entries))
}
