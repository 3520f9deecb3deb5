//! Raw input records, before they are merged into the show.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

static GROUP_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Group Numbers \[(.*?)\]").expect("group column pattern is valid")
});

/// One registration row. Empty strings mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based data row in the source, for warnings.
    pub row: usize,
    pub names: String,
    pub title: String,
    pub length: String,
    pub blurb: String,
    pub music: String,
    pub category: String,
    pub withdrawn: String,
    pub billing: String,
    /// JSON object layered over the other fields (see [`RecordOverride`]).
    pub overrides: String,
}

impl RawRecord {
    pub fn new(row: usize, names: impl Into<String>) -> Self {
        RawRecord {
            row,
            names: names.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_length(mut self, length: impl Into<String>) -> Self {
        self.length = length.into();
        self
    }

    pub fn with_blurb(mut self, blurb: impl Into<String>) -> Self {
        self.blurb = blurb.into();
        self
    }

    pub fn with_music(mut self, music: impl Into<String>) -> Self {
        self.music = music.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_billing(mut self, billing: impl Into<String>) -> Self {
        self.billing = billing.into();
        self
    }

    pub fn with_overrides(mut self, overrides: impl Into<String>) -> Self {
        self.overrides = overrides.into();
        self
    }
}

/// Length given either as seconds or as a clock literal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LengthValue {
    Seconds(u32),
    Text(String),
}

/// Structured corrections an organizer can paste into the override column,
/// e.g. `{"length": "2:45", "category": "intermission"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordOverride {
    pub names: Option<String>,
    pub title: Option<String>,
    pub length: Option<LengthValue>,
    pub blurb: Option<String>,
    pub music: Option<String>,
    pub category: Option<String>,
    /// Only `true` has an effect: withdrawal latches per performance.
    pub withdrawn: Option<bool>,
    pub billing: Option<String>,
}

impl RecordOverride {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Layer the override on top of `record`; present fields replace the base value.
    pub fn apply(&self, record: &mut RawRecord) {
        if let Some(names) = &self.names {
            record.names = names.clone();
        }
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        match &self.length {
            Some(LengthValue::Seconds(secs)) => record.length = secs.to_string(),
            Some(LengthValue::Text(text)) => record.length = text.clone(),
            None => {}
        }
        if let Some(blurb) = &self.blurb {
            record.blurb = blurb.clone();
        }
        if let Some(music) = &self.music {
            record.music = music.clone();
        }
        if let Some(category) = &self.category {
            record.category = category.clone();
        }
        if self.withdrawn == Some(true) {
            record.withdrawn = "yes".to_string();
        }
        if let Some(billing) = &self.billing {
            record.billing = billing.clone();
        }
    }
}

/// One (display name, email) contact row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerRecord {
    pub row: usize,
    pub name: String,
    pub email: String,
}

/// A `Group Numbers [<title>]` column of the group sign-up sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupColumn {
    pub header: String,
    pub title: String,
}

/// One skater's row of the group sign-up sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSheetRow {
    pub row: usize,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Headers of the group columns this skater ticked.
    pub joined: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSheet {
    pub columns: Vec<GroupColumn>,
    pub rows: Vec<GroupSheetRow>,
}

/// Pick the group-number columns out of a sheet header.
pub fn group_columns<'a>(headers: impl IntoIterator<Item = &'a str>) -> Vec<GroupColumn> {
    headers
        .into_iter()
        .filter_map(|header| {
            let captures = GROUP_COLUMN.captures(header)?;
            Some(GroupColumn {
                header: header.to_string(),
                title: captures[1].trim().to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a duration (expected seconds, MM:SS or H:MM:SS)")]
pub struct DurationError(pub String);

/// Parse `H:MM:SS`, `MM:SS` or plain seconds. Empty input is `Ok(None)`.
pub fn parse_duration(text: &str) -> Result<Option<u32>, DurationError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let err = || DurationError(text.to_string());

    let parts: Vec<u64> = text
        .split(':')
        .map(|p| {
            let p = p.trim();
            if p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()) {
                return Err(err());
            }
            p.parse::<u64>().map_err(|_| err())
        })
        .collect::<Result<_, _>>()?;

    let secs = match parts.as_slice() {
        [s] => *s,
        [m, s] if *s < 60 => m * 60 + s,
        [h, m, s] if *m < 60 && *s < 60 => h * 3600 + m * 60 + s,
        _ => return Err(err()),
    };
    u32::try_from(secs).map(Some).map_err(|_| err())
}

/// Spreadsheet truthiness for checkbox-like cells.
pub fn parse_flag(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "x" | "1" | "scratch" | "withdrawn"
    )
}
