//! Canonical show model: participants, performances and the `Show` aggregate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use super::names::DEFAULT_GROUP;
use crate::schedule::timing::TimingPolicy;
use crate::{ScheduleError, ScheduleResult};

/// One skater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<String>) -> Self {
        Participant {
            id: id.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
        }
    }

    pub fn has_name(&self) -> bool {
        !self.first_name.is_empty() || !self.last_name.is_empty()
    }

    /// Display name; falls back to the key for participants whose name never parsed.
    pub fn full_name(&self) -> String {
        if !self.has_name() {
            return self.id.clone();
        }
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Set the name unless one is already recorded. Returns whether anything changed.
    pub fn fill_name(&mut self, first_name: &str, last_name: &str) -> bool {
        if self.has_name() || (first_name.is_empty() && last_name.is_empty()) {
            return false;
        }
        self.first_name = first_name.to_string();
        self.last_name = last_name.to_string();
        true
    }

    /// Set the email unless one is already recorded. Returns whether anything changed.
    pub fn fill_email(&mut self, email: &str) -> bool {
        if self.email.is_some() || email.is_empty() {
            return false;
        }
        self.email = Some(email.to_string());
        true
    }

    /// Billing sort key: last name, then first name.
    pub fn sort_key(&self) -> (&str, &str) {
        (&self.last_name, &self.first_name)
    }
}

/// Optional performance tag that changes scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Intermission,
    Tag(String),
}

impl Category {
    pub fn parse(text: &str) -> Option<Category> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text.eq_ignore_ascii_case("intermission") {
            Some(Category::Intermission)
        } else {
            Some(Category::Tag(text.to_string()))
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::Intermission => "intermission",
            Category::Tag(tag) => tag,
        }
    }
}

/// Where a performance's music comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicReference {
    /// A file uploaded next to the sign-up sheets.
    File(String),
    /// A download link (Google Drive share links included).
    Remote(String),
}

impl MusicReference {
    pub fn parse(text: &str) -> Option<MusicReference> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let lower = text.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Some(MusicReference::Remote(text.to_string()))
        } else {
            Some(MusicReference::File(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MusicReference::File(s) | MusicReference::Remote(s) => s,
        }
    }
}

/// Participant display order within a performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Billing {
    /// Sorted by last name, then first name.
    #[default]
    Alphabetical,
    /// Exactly as registered (lead/follow pairs and the like).
    AsListed,
}

impl Billing {
    pub fn parse(text: &str) -> Option<Billing> {
        let normalized: String = text
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match normalized.as_str() {
            "alphabetical" | "alpha" | "sorted" => Some(Billing::Alphabetical),
            "aslisted" | "listed" | "preserve" | "ordered" => Some(Billing::AsListed),
            _ => None,
        }
    }
}

/// Labeled subset of a performance's participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRoster {
    pub label: String,
    pub members: Vec<String>,
}

impl SubRoster {
    pub fn is_default(&self) -> bool {
        self.label == DEFAULT_GROUP
    }
}

/// One scheduled item: a solo program, a group number or an intermission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performance {
    pub id: String,
    pub title: String,
    /// Insertion-ordered, duplicate-free participant ids.
    pub participants: Vec<String>,
    pub sub_rosters: Vec<SubRoster>,
    pub length_seconds: u32,
    pub blurb: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<MusicReference>,
    pub withdrawn: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub billing: Billing,
}

impl Performance {
    pub fn new(id: impl Into<String>) -> Self {
        Performance {
            id: id.into(),
            title: String::new(),
            participants: Vec::new(),
            sub_rosters: Vec::new(),
            length_seconds: 0,
            blurb: String::new(),
            music: None,
            withdrawn: false,
            category: None,
            billing: Billing::default(),
        }
    }

    /// Title, or the key when no title was ever given.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.id
        } else {
            &self.title
        }
    }

    pub fn is_intermission(&self) -> bool {
        matches!(self.category, Some(Category::Intermission))
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn has_labeled_groups(&self) -> bool {
        self.sub_rosters.iter().any(|s| !s.is_default())
    }

    /// Add a participant to a sub-roster, creating the sub-roster if needed.
    ///
    /// Membership only ever grows; adding the same participant twice is a no-op.
    pub fn add_participant(&mut self, label: &str, participant_id: &str) {
        if !self.participants.iter().any(|p| p == participant_id) {
            self.participants.push(participant_id.to_string());
        }
        let idx = match self.sub_rosters.iter().position(|s| s.label == label) {
            Some(idx) => idx,
            None => {
                self.sub_rosters.push(SubRoster {
                    label: label.to_string(),
                    members: Vec::new(),
                });
                self.sub_rosters.len() - 1
            }
        };
        let members = &mut self.sub_rosters[idx].members;
        if !members.iter().any(|m| m == participant_id) {
            members.push(participant_id.to_string());
        }
    }
}

/// One line of an explicit skate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEntry {
    pub key: String,
    /// 1-based line in the order source, for error messages.
    pub line: usize,
}

/// One show's complete data.
#[derive(Debug, Clone)]
pub struct Show {
    pub name: String,
    pub start_time: PrimitiveDateTime,
    pub timing: TimingPolicy,
    participants: BTreeMap<String, Participant>,
    performances: BTreeMap<String, Performance>,
    registration_order: Vec<String>,
    explicit_order: Option<Vec<OrderEntry>>,
}

impl Show {
    pub fn new(name: impl Into<String>, start_time: PrimitiveDateTime) -> Self {
        Show {
            name: name.into(),
            start_time,
            timing: TimingPolicy::default(),
            participants: BTreeMap::new(),
            performances: BTreeMap::new(),
            registration_order: Vec::new(),
            explicit_order: None,
        }
    }

    pub fn with_timing(mut self, timing: TimingPolicy) -> Self {
        self.timing = timing;
        self
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn participant_mut(&mut self, id: &str) -> Option<&mut Participant> {
        self.participants.get_mut(id)
    }

    /// Locate or lazily create a participant.
    pub fn participant_entry(&mut self, id: &str) -> &mut Participant {
        self.participants
            .entry(id.to_string())
            .or_insert_with(|| Participant::new(id))
    }

    /// Participants sorted by key.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn performance(&self, id: &str) -> Option<&Performance> {
        self.performances.get(id)
    }

    pub fn performance_mut(&mut self, id: &str) -> Option<&mut Performance> {
        self.performances.get_mut(id)
    }

    /// Locate or create a performance, remembering first-seen order.
    pub fn performance_entry(&mut self, id: &str) -> &mut Performance {
        if !self.performances.contains_key(id) {
            self.registration_order.push(id.to_string());
        }
        self.performances
            .entry(id.to_string())
            .or_insert_with(|| Performance::new(id))
    }

    /// Performances in the order they were first registered.
    pub fn performances(&self) -> impl Iterator<Item = &Performance> {
        self.registration_order
            .iter()
            .filter_map(|id| self.performances.get(id))
    }

    pub fn performance_ids(&self) -> &[String] {
        &self.registration_order
    }

    pub fn performance_count(&self) -> usize {
        self.performances.len()
    }

    pub fn explicit_order(&self) -> Option<&[OrderEntry]> {
        self.explicit_order.as_deref()
    }

    pub fn set_explicit_order(&mut self, entries: Vec<OrderEntry>) {
        self.explicit_order = Some(entries);
    }

    pub fn clear_explicit_order(&mut self) {
        self.explicit_order = None;
    }

    /// Check the aggregate's referential invariants.
    pub fn validate(&self) -> ScheduleResult<()> {
        if let Some(order) = &self.explicit_order {
            if let Some(entry) = order
                .iter()
                .find(|e| !self.performances.contains_key(&e.key))
            {
                return Err(ScheduleError::UnknownPerformance {
                    key: entry.key.clone(),
                    line: entry.line,
                });
            }
        }
        for performance in self.performances.values() {
            if let Some(missing) = performance
                .participants
                .iter()
                .find(|p| !self.participants.contains_key(*p))
            {
                return Err(ScheduleError::Message(format!(
                    "performance `{}` references unknown participant `{}`",
                    performance.id, missing
                )));
            }
        }
        Ok(())
    }
}
