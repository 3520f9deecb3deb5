//! `show.toml`: where a show's inputs live and how to run it.
//!
//! ```toml
//! [show]
//! name = "Winter Show 2018"
//! date = "2018-12-09"
//! start = "13:05"
//!
//! [timing]
//! large_group_min_gap_secs = 90
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use time::{Date, PrimitiveDateTime, Time};

use crate::schedule::TimingPolicy;
use crate::{ScheduleError, ScheduleResult};

pub const DEFAULT_CONFIG: &str = "show.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ShowConfig {
    pub show: ShowSection,
    #[serde(default)]
    pub inputs: InputsSection,
    #[serde(default)]
    pub columns: ColumnMap,
    #[serde(default)]
    pub timing: TimingPolicy,
    #[serde(default)]
    pub commands: CommandsSection,
    #[serde(default)]
    pub music: MusicSection,
    /// Directory the config was loaded from; relative paths resolve against it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShowSection {
    pub name: String,
    /// `YYYY-MM-DD`; defaults to today.
    #[serde(default)]
    pub date: Option<String>,
    /// `HH:MM` or `HH:MM:SS`, 24-hour.
    pub start: String,
    /// Show directory, relative to the config file.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub strict_roster: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputsSection {
    pub registrations: String,
    pub group_sheet: Option<String>,
    pub ledger: Option<String>,
    pub skate_order: Option<String>,
    /// Reuse downloaded sheets instead of fetching them again.
    pub cache_sheets: bool,
}

impl Default for InputsSection {
    fn default() -> Self {
        InputsSection {
            registrations: "starts.csv".to_string(),
            group_sheet: Some("group.csv".to_string()),
            ledger: None,
            skate_order: Some("skate_order.txt".to_string()),
            cache_sheets: true,
        }
    }
}

/// Registration sheet column headers. Defaults are the sign-up form's questions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub names: String,
    pub title: String,
    pub length: String,
    pub blurb: String,
    pub music: String,
    pub category: String,
    pub withdrawn: String,
    pub billing: String,
    pub overrides: String,
    pub ledger_name: String,
    pub ledger_email: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        ColumnMap {
            names: "Name(s)".to_string(),
            title: "Program Title (optional)".to_string(),
            length: "Length".to_string(),
            blurb: "Introduction Blurb for Announcer".to_string(),
            music: "Music Upload".to_string(),
            category: "Category".to_string(),
            withdrawn: "Withdrawn".to_string(),
            billing: "Billing".to_string(),
            overrides: "Override".to_string(),
            ledger_name: "Name".to_string(),
            ledger_email: "Email".to_string(),
            first_name: "First Name".to_string(),
            last_name: "Last Name".to_string(),
            email: "Email Address".to_string(),
        }
    }
}

/// External tool command templates, split with shell quoting rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandsSection {
    /// Placeholders: `{input}`, `{output}`.
    pub transcode: String,
    /// Placeholders: `{tex}`, `{outdir}`.
    pub typeset: String,
}

impl Default for CommandsSection {
    fn default() -> Self {
        CommandsSection {
            transcode: "ffmpeg -y -i {input} -acodec mp3 -ab 256k {output}".to_string(),
            typeset: "pdflatex -halt-on-error -output-directory {outdir} {tex}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MusicSection {
    pub album: String,
    /// Directory with uploaded music files, relative to the inputs directory.
    pub uploads: String,
    /// Reuse `music/<key>.mp3` when it already exists.
    pub cache: bool,
}

impl Default for MusicSection {
    fn default() -> Self {
        MusicSection {
            album: "Skating Programs".to_string(),
            uploads: "uploads".to_string(),
            cache: true,
        }
    }
}

impl ShowConfig {
    pub fn from_toml(text: &str, base_dir: impl Into<PathBuf>) -> ScheduleResult<Self> {
        let mut cfg: ShowConfig =
            toml::from_str(text).map_err(|e| ScheduleError::Message(format!("invalid show config: {e}")))?;
        cfg.base_dir = base_dir.into();
        Ok(cfg)
    }

    /// Root of the show directory.
    pub fn root(&self) -> PathBuf {
        match &self.show.directory {
            Some(dir) => self.base_dir.join(dir),
            None => self.base_dir.clone(),
        }
    }

    pub fn inputs_dir(&self) -> PathBuf {
        self.root().join("inputs")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.inputs_dir().join(&self.music.uploads)
    }

    pub fn music_dir(&self) -> PathBuf {
        self.root().join("music")
    }

    pub fn ordered_music_dir(&self) -> PathBuf {
        self.root().join("music_ordered")
    }

    pub fn program_template(&self) -> PathBuf {
        self.root().join("programtemplate.tex")
    }

    /// Replace the configured start time, e.g. from `--start`.
    pub fn override_start(&mut self, start: Option<String>) {
        if let Some(start) = start {
            self.show.start = start;
        }
    }

    /// Show start as a date and time of day.
    pub fn start_time(&self) -> ScheduleResult<PrimitiveDateTime> {
        let date = match &self.show.date {
            Some(text) => parse_date(text)?,
            None => time::OffsetDateTime::now_utc().date(),
        };
        Ok(PrimitiveDateTime::new(date, parse_time_of_day(&self.show.start)?))
    }
}

pub fn load_show_config(path: &Path) -> ScheduleResult<ShowConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| ScheduleError::Message(format!("failed to read {}: {e}", path.display())))?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    ShowConfig::from_toml(&s, base_dir)
}

pub fn parse_date(text: &str) -> ScheduleResult<Date> {
    let fmt = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(text.trim(), &fmt)
        .map_err(|e| ScheduleError::Message(format!("invalid show date `{text}`: {e}")))
}

/// Parse a 24-hour `HH:MM` or `HH:MM:SS` time of day.
pub fn parse_time_of_day(text: &str) -> ScheduleResult<Time> {
    let text = text.trim();
    let with_secs = time::macros::format_description!("[hour]:[minute]:[second]");
    let without_secs = time::macros::format_description!("[hour]:[minute]");
    Time::parse(text, &with_secs)
        .or_else(|_| Time::parse(text, &without_secs))
        .map_err(|e| ScheduleError::Message(format!("invalid start time `{text}`: {e}")))
}
