//! Participant string parsing.
//!
//! A participant cell can name a soloist (`"Jane Doe"`), an unlabeled
//! ensemble (`"Jane Doe, Sam Lee"`) or several labeled sub-rosters
//! (`"Leads: Jane Doe, Sam Lee : Follows: Ana Ruiz"`). All three parse into
//! the same shape: an ordered list of `(label, names)` groups.

use thiserror::Error;

/// Separates sub-roster labels from their member lists.
pub const GROUP_DELIMITER: char = ':';

/// Separates names within one sub-roster.
pub const NAME_DELIMITER: char = ',';

/// Label assigned to names that appear before any explicit label.
pub const DEFAULT_GROUP: &str = "default";

/// Split a participant string into labeled groups of trimmed names.
///
/// An odd number of `:`-separated segments means the text starts with an
/// unlabeled group, which is given the [`DEFAULT_GROUP`] label. Repeated
/// labels are merged into the position where the label first appeared.
pub fn parse_subgroups(text: &str) -> Vec<(String, Vec<String>)> {
    let mut segments: Vec<&str> = text.split(GROUP_DELIMITER).collect();
    if segments.len() % 2 == 1 {
        segments.insert(0, DEFAULT_GROUP);
    }

    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for pair in segments.chunks(2) {
        let label = pair[0].trim().to_string();
        let names = pair[1]
            .split(NAME_DELIMITER)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        match groups.iter().position(|(existing, _)| *existing == label) {
            Some(idx) => groups[idx].1.extend(names),
            None => groups.push((label, names.collect())),
        }
    }
    groups
}

/// First/last name split of a single participant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedName {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("empty participant name")]
    Empty,
    #[error("cannot split `{name}` into first and last name ({tokens} words; join multi-word names with `_`)")]
    TokenCount { name: String, tokens: usize },
}

/// Split one trimmed name into first and last name.
///
/// Underscores stand in for spaces inside a single name part, so
/// `"Mary_Kate Smith"` yields first name `"Mary Kate"`.
pub fn parse_name(text: &str) -> Result<ParsedName, NameError> {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| t.replace('_', " "))
        .collect();
    match tokens.as_slice() {
        [] => Err(NameError::Empty),
        [first] => Ok(ParsedName {
            first_name: first.clone(),
            last_name: String::new(),
        }),
        [first, last] => Ok(ParsedName {
            first_name: first.clone(),
            last_name: last.clone(),
        }),
        _ => Err(NameError::TokenCount {
            name: text.trim().to_string(),
            tokens: tokens.len(),
        }),
    }
}
