//! Merge raw records into the show.
//!
//! Every function here is best-effort over a batch: one bad row produces a
//! warning and the rest of the batch still lands. Re-ingesting the same rows
//! leaves the show unchanged.

use thiserror::Error;
use tracing::{debug, warn};

use super::records::{
    DurationError, GroupSheet, LedgerRecord, RawRecord, RecordOverride, parse_duration, parse_flag,
};
use crate::core::{
    Billing, Category, DEFAULT_GROUP, MusicReference, NameError, Show, derive_key, parse_name,
    parse_subgroups, strip_nonprintable,
};

/// Title prefix organizers use to pull a program without deleting the row.
pub const SCRATCH_PREFIX: &str = "SCRATCH";

/// Recoverable data-quality problem found during ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestWarning {
    #[error("row {row}: no name or title, skipped")]
    EmptyRecord { row: usize },
    #[error("row {row}: {error} (performance `{performance}`)")]
    BadName {
        row: usize,
        performance: String,
        error: NameError,
    },
    #[error("row {row}: `{name}` is not on the roster (performance `{performance}`)")]
    UnknownParticipant {
        row: usize,
        performance: String,
        name: String,
    },
    #[error("row {row}: {error} (performance `{performance}`)")]
    BadDuration {
        row: usize,
        performance: String,
        error: DurationError,
    },
    #[error("row {row}: unrecognized billing `{value}` (performance `{performance}`)")]
    BadBilling {
        row: usize,
        performance: String,
        value: String,
    },
    #[error("row {row}: ignoring override: {message}")]
    BadOverride { row: usize, message: String },
    #[error("ledger row {row}: {error}")]
    BadLedgerName { row: usize, error: NameError },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Warn when a performance names someone the roster does not know yet.
    pub strict_roster: bool,
}

/// What an ingestion pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub records: usize,
    pub performances_created: usize,
    pub participants_created: usize,
    pub warnings: Vec<IngestWarning>,
}

impl IngestReport {
    pub fn merge(&mut self, other: IngestReport) {
        self.records += other.records;
        self.performances_created += other.performances_created;
        self.participants_created += other.participants_created;
        self.warnings.extend(other.warnings);
    }

    fn warn(&mut self, warning: IngestWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Ingest registration rows in order.
pub fn ingest(show: &mut Show, records: &[RawRecord]) -> IngestReport {
    ingest_with(show, records, IngestOptions::default())
}

pub fn ingest_with(show: &mut Show, records: &[RawRecord], options: IngestOptions) -> IngestReport {
    let mut report = IngestReport::default();
    for record in records {
        ingest_record(show, record, options, &mut report);
    }
    debug!(
        records = report.records,
        performances_created = report.performances_created,
        participants_created = report.participants_created,
        warnings = report.warnings.len(),
        "ingested registrations"
    );
    report
}

fn ingest_record(show: &mut Show, base: &RawRecord, options: IngestOptions, report: &mut IngestReport) {
    report.records += 1;

    let mut record = base.clone();
    if !record.overrides.trim().is_empty() {
        match RecordOverride::parse(&record.overrides) {
            Ok(o) => {
                if o.withdrawn == Some(false) {
                    report.warn(IngestWarning::BadOverride {
                        row: record.row,
                        message: "`withdrawn: false` cannot reinstate a withdrawn performance; \
                                  remove the SCRATCH prefix or withdrawn flag instead"
                            .into(),
                    });
                }
                o.apply(&mut record);
            }
            Err(e) => report.warn(IngestWarning::BadOverride {
                row: record.row,
                message: e.to_string(),
            }),
        }
    }

    let names = record.names.trim();
    let mut title = strip_nonprintable(&record.title).trim().to_string();
    let mut withdrawn = parse_flag(&record.withdrawn);
    if let Some(rest) = title.strip_prefix(SCRATCH_PREFIX) {
        withdrawn = true;
        title = rest.trim_start_matches([' ', ':', '-']).trim().to_string();
    }

    let key = if title.is_empty() {
        derive_key(names)
    } else {
        derive_key(&title)
    };
    if key.is_empty() {
        report.warn(IngestWarning::EmptyRecord { row: record.row });
        return;
    }

    let mut length = match parse_duration(&record.length) {
        Ok(length) => length,
        Err(error) => {
            report.warn(IngestWarning::BadDuration {
                row: record.row,
                performance: key.clone(),
                error,
            });
            None
        }
    };
    // a bare number in the music column is a length in seconds
    let music_cell = record.music.trim();
    let music = if !music_cell.is_empty() && music_cell.chars().all(|c| c.is_ascii_digit()) {
        if length.is_none() {
            length = music_cell.parse().ok();
        }
        None
    } else {
        MusicReference::parse(music_cell)
    };
    let blurb = strip_nonprintable(&record.blurb).trim().to_string();
    let category = Category::parse(&record.category);
    let billing = match record.billing.trim() {
        "" => None,
        value => {
            let parsed = Billing::parse(value);
            if parsed.is_none() {
                report.warn(IngestWarning::BadBilling {
                    row: record.row,
                    performance: key.clone(),
                    value: value.to_string(),
                });
            }
            parsed
        }
    };

    if show.performance(&key).is_none() {
        report.performances_created += 1;
    }
    let performance = show.performance_entry(&key);
    if !title.is_empty() {
        if !performance.title.is_empty() && performance.title != title {
            debug!(key = %key, old = %performance.title, new = %title, "title replaced by later row");
        }
        performance.title = title;
    } else if performance.title.is_empty() {
        performance.title = names.to_string();
    }
    if let Some(length) = length.filter(|l| *l > 0) {
        performance.length_seconds = length;
    }
    if !blurb.is_empty() {
        performance.blurb = blurb;
    }
    if music.is_some() {
        performance.music = music;
    }
    if category.is_some() {
        performance.category = category;
    }
    if let Some(billing) = billing {
        performance.billing = billing;
    }
    if withdrawn {
        performance.withdrawn = true;
    }

    for (label, members) in parse_subgroups(names) {
        for name in members {
            add_named_participant(show, &key, &label, &name, record.row, options, report);
        }
    }
}

fn add_named_participant(
    show: &mut Show,
    performance_key: &str,
    label: &str,
    name: &str,
    row: usize,
    options: IngestOptions,
    report: &mut IngestReport,
) {
    let mut participant_key = derive_key(name);
    if participant_key.is_empty() {
        // non-Latin names still need a roster entry
        participant_key = name.chars().filter(|c| c.is_alphanumeric()).collect();
    }
    if participant_key.is_empty() {
        report.warn(IngestWarning::BadName {
            row,
            performance: performance_key.to_string(),
            error: NameError::Empty,
        });
        return;
    }

    if show.participant(&participant_key).is_none() {
        report.participants_created += 1;
        if options.strict_roster {
            report.warn(IngestWarning::UnknownParticipant {
                row,
                performance: performance_key.to_string(),
                name: name.to_string(),
            });
        }
    }
    let participant = show.participant_entry(&participant_key);
    if !participant.has_name() {
        match parse_name(name) {
            Ok(parsed) => {
                participant.fill_name(&parsed.first_name, &parsed.last_name);
            }
            Err(error) => report.warn(IngestWarning::BadName {
                row,
                performance: performance_key.to_string(),
                error,
            }),
        }
    }

    show.performance_entry(performance_key)
        .add_participant(label, &participant_key);
}

/// Backfill names and emails from a contact ledger.
pub fn ingest_ledger(show: &mut Show, ledger: &[LedgerRecord]) -> IngestReport {
    let mut report = IngestReport::default();
    for record in ledger {
        report.records += 1;
        let name = record.name.trim();
        let key = derive_key(name);
        if key.is_empty() {
            report.warn(IngestWarning::BadLedgerName {
                row: record.row,
                error: NameError::Empty,
            });
            continue;
        }
        if show.participant(&key).is_none() {
            report.participants_created += 1;
        }
        let participant = show.participant_entry(&key);
        if !participant.has_name() {
            match parse_name(name) {
                Ok(parsed) => {
                    participant.fill_name(&parsed.first_name, &parsed.last_name);
                }
                Err(error) => report.warn(IngestWarning::BadLedgerName {
                    row: record.row,
                    error,
                }),
            }
        }
        let participant = show.participant_entry(&key);
        participant.fill_email(record.email.trim());
    }
    report
}

/// Ingest the group-number sign-up sheet: one performance per group column,
/// one roster entry per row, membership wherever a row ticked a column.
pub fn ingest_group_sheet(show: &mut Show, sheet: &GroupSheet) -> IngestReport {
    let mut report = IngestReport::default();

    for column in &sheet.columns {
        let key = derive_key(&column.header);
        if show.performance(&key).is_none() {
            report.performances_created += 1;
        }
        let performance = show.performance_entry(&key);
        if !column.title.is_empty() {
            performance.title = column.title.clone();
        }
    }

    for row in &sheet.rows {
        report.records += 1;
        let first_name = row.first_name.trim();
        let last_name = row.last_name.trim();
        let key = derive_key(&format!("{first_name}{last_name}"));
        if key.is_empty() {
            report.warn(IngestWarning::EmptyRecord { row: row.row });
            continue;
        }
        if show.participant(&key).is_none() {
            report.participants_created += 1;
        }
        let participant = show.participant_entry(&key);
        participant.fill_name(first_name, last_name);
        participant.fill_email(row.email.trim());

        for header in &row.joined {
            let group_key = derive_key(header);
            show.performance_entry(&group_key)
                .add_participant(DEFAULT_GROUP, &key);
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::records::{GroupColumn, GroupSheetRow};
    use time::macros::datetime;

    fn empty_show() -> Show {
        Show::new("test", datetime!(2018-12-09 13:05))
    }

    #[test]
    fn test_title_preferred_for_key() {
        let mut show = empty_show();
        ingest(&mut show, &[RawRecord::new(1, "Jane Doe").with_title("Firebird Suite")]);
        assert!(show.performance("FirebirdSuite").is_some());
        assert!(show.performance("JaneDoe").is_none());
        assert!(show.participant("JaneDoe").is_some());
    }

    #[test]
    fn test_untitled_performance_keyed_and_titled_by_names() {
        let mut show = empty_show();
        ingest(&mut show, &[RawRecord::new(1, "Jane Doe")]);
        let perf = show.performance("JaneDoe").unwrap();
        assert_eq!(perf.title, "Jane Doe");
        assert_eq!(perf.participants, vec!["JaneDoe"]);
    }

    #[test]
    fn test_reingest_is_idempotent() {
        let mut show = empty_show();
        let records = vec![
            RawRecord::new(1, "Leads: Jane Doe, Sam Lee : Follows: Ana Ruiz").with_title("Tango"),
            RawRecord::new(2, "Jane Doe").with_length("2:05"),
        ];
        ingest(&mut show, &records);
        let performances = show.performance_count();
        let participants = show.participant_count();
        let snapshot: Vec<_> = show.performances().cloned().collect();

        let second = ingest(&mut show, &records);
        assert_eq!(show.performance_count(), performances);
        assert_eq!(show.participant_count(), participants);
        assert_eq!(second.performances_created, 0);
        assert_eq!(second.participants_created, 0);
        let again: Vec<_> = show.performances().cloned().collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_non_empty_blurb_wins_either_order() {
        let empty = RawRecord::new(1, "Jane Doe").with_blurb("");
        let hello = RawRecord::new(2, "Jane Doe").with_blurb("Hello");

        let mut show = empty_show();
        ingest(&mut show, &[empty.clone(), hello.clone()]);
        assert_eq!(show.performance("JaneDoe").unwrap().blurb, "Hello");

        let mut show = empty_show();
        ingest(&mut show, &[hello, empty]);
        assert_eq!(show.performance("JaneDoe").unwrap().blurb, "Hello");
    }

    #[test]
    fn test_participants_union_across_rows() {
        let mut show = empty_show();
        ingest(
            &mut show,
            &[
                RawRecord::new(1, "A One, B Two").with_title("Opening"),
                RawRecord::new(2, "C Three").with_title("Opening"),
            ],
        );
        let perf = show.performance("Opening").unwrap();
        assert_eq!(perf.participants, vec!["AOne", "BTwo", "CThree"]);
    }

    #[test]
    fn test_sub_rosters_recorded_in_label_order() {
        let mut show = empty_show();
        ingest(
            &mut show,
            &[RawRecord::new(1, "Beginners: A One, B Two : Advanced: C Three").with_title("Opening")],
        );
        let perf = show.performance("Opening").unwrap();
        let labels: Vec<&str> = perf.sub_rosters.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Beginners", "Advanced"]);
        assert_eq!(perf.sub_rosters[1].members, vec!["CThree"]);
    }

    #[test]
    fn test_shared_identity_between_solo_and_group() {
        let mut show = empty_show();
        ingest(
            &mut show,
            &[
                RawRecord::new(1, "Jane Doe"),
                RawRecord::new(2, "Stars: Jane Doe, Sam Lee").with_title("Finale"),
            ],
        );
        assert_eq!(show.participant_count(), 2);
        assert!(show.performance("JaneDoe").unwrap().participants.contains(&"JaneDoe".to_string()));
        assert!(show.performance("Finale").unwrap().participants.contains(&"JaneDoe".to_string()));
    }

    #[test]
    fn test_bad_name_is_warning_with_partial_participant() {
        let mut show = empty_show();
        let report = ingest(&mut show, &[RawRecord::new(7, "Mary Kate Smith, Sam Lee").with_title("Duo")]);
        assert!(matches!(report.warnings.as_slice(), [IngestWarning::BadName { row: 7, .. }]));
        let unnamed = show.participant("MaryKateSmith").unwrap();
        assert!(!unnamed.has_name());
        assert_eq!(show.performance("Duo").unwrap().participant_count(), 2);
    }

    #[test]
    fn test_non_ascii_name_keeps_participant() {
        let mut show = empty_show();
        let report = ingest(&mut show, &[RawRecord::new(3, "李明, Sam Lee").with_title("Duo")]);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        let perf = show.performance("Duo").unwrap();
        assert_eq!(perf.participants, vec!["李明", "SamLee"]);
        assert_eq!(show.participant("李明").unwrap().first_name, "李明");
    }

    #[test]
    fn test_first_name_write_wins() {
        let mut show = empty_show();
        ingest(&mut show, &[RawRecord::new(1, "Jane Doe")]);
        ingest_ledger(
            &mut show,
            &[LedgerRecord { row: 1, name: "Jane  Doe".into(), email: "jane@example.com".into() }],
        );
        let jane = show.participant("JaneDoe").unwrap();
        assert_eq!(jane.first_name, "Jane");
        assert_eq!(jane.email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_bad_duration_is_warning_and_keeps_going() {
        let mut show = empty_show();
        let report = ingest(
            &mut show,
            &[
                RawRecord::new(1, "Jane Doe").with_length("three minutes"),
                RawRecord::new(2, "Sam Lee").with_length("1:30"),
            ],
        );
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(show.performance("JaneDoe").unwrap().length_seconds, 0);
        assert_eq!(show.performance("SamLee").unwrap().length_seconds, 90);
    }

    #[test]
    fn test_numeric_music_cell_is_length() {
        let mut show = empty_show();
        ingest(
            &mut show,
            &[
                RawRecord::new(1, "Jane Doe").with_music("142"),
                RawRecord::new(2, "Sam Lee").with_music("https://example.com/sam.mp3"),
            ],
        );
        let jane = show.performance("JaneDoe").unwrap();
        assert_eq!(jane.length_seconds, 142);
        assert!(jane.music.is_none());
        let sam = show.performance("SamLee").unwrap();
        assert_eq!(
            sam.music,
            Some(MusicReference::Remote("https://example.com/sam.mp3".into()))
        );
    }

    #[test]
    fn test_scratch_prefix_flags_same_performance() {
        let mut show = empty_show();
        ingest(
            &mut show,
            &[
                RawRecord::new(1, "Jane Doe").with_title("Firebird"),
                RawRecord::new(2, "Jane Doe").with_title("SCRATCH Firebird"),
            ],
        );
        assert_eq!(show.performance_count(), 1);
        let perf = show.performance("Firebird").unwrap();
        assert!(perf.withdrawn);
        assert_eq!(perf.title, "Firebird");
        assert!(show.participant("JaneDoe").is_some());
    }

    #[test]
    fn test_override_applies_before_merge() {
        let mut show = empty_show();
        ingest(
            &mut show,
            &[RawRecord::new(1, "")
                .with_title("Zamboni Break")
                .with_overrides(r#"{"category": "intermission", "length": "15:00"}"#)],
        );
        let perf = show.performance("ZamboniBreak").unwrap();
        assert!(perf.is_intermission());
        assert_eq!(perf.length_seconds, 900);
    }

    #[test]
    fn test_override_cannot_unscratch() {
        let mut show = empty_show();
        let report = ingest(
            &mut show,
            &[RawRecord::new(2, "Jane Doe")
                .with_title("SCRATCH Firebird")
                .with_overrides(r#"{"withdrawn": false}"#)],
        );
        assert!(show.performance("Firebird").unwrap().withdrawn);
        assert!(matches!(
            report.warnings.as_slice(),
            [IngestWarning::BadOverride { row: 2, message }] if message.contains("withdrawn: false")
        ));
    }

    #[test]
    fn test_bad_override_is_ignored_with_warning() {
        let mut show = empty_show();
        let report = ingest(
            &mut show,
            &[RawRecord::new(3, "Jane Doe").with_length("1:00").with_overrides("{length: }")],
        );
        assert!(matches!(report.warnings.as_slice(), [IngestWarning::BadOverride { row: 3, .. }]));
        assert_eq!(show.performance("JaneDoe").unwrap().length_seconds, 60);
    }

    #[test]
    fn test_empty_record_skipped() {
        let mut show = empty_show();
        let report = ingest(&mut show, &[RawRecord::new(5, " , ")]);
        assert_eq!(report.warnings, vec![IngestWarning::EmptyRecord { row: 5 }]);
        assert_eq!(show.performance_count(), 0);
    }

    #[test]
    fn test_billing_flag_per_performance() {
        let mut show = empty_show();
        let report = ingest(
            &mut show,
            &[
                RawRecord::new(1, "Zed Last, Amy First").with_title("Pairs").with_billing("as listed"),
                RawRecord::new(2, "B C").with_title("Other").with_billing("backwards"),
            ],
        );
        assert_eq!(show.performance("Pairs").unwrap().billing, Billing::AsListed);
        assert_eq!(show.performance("Other").unwrap().billing, Billing::Alphabetical);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_strict_roster_warns_for_unknown_names() {
        let mut show = empty_show();
        ingest_ledger(&mut show, &[LedgerRecord { row: 1, name: "Jane Doe".into(), email: String::new() }]);
        let report = ingest_with(
            &mut show,
            &[RawRecord::new(1, "Jane Doe, Sam Lee").with_title("Duo")],
            IngestOptions { strict_roster: true },
        );
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(
            &report.warnings[0],
            IngestWarning::UnknownParticipant { name, .. } if name == "Sam Lee"
        ));
    }

    #[test]
    fn test_group_sheet_membership_and_contacts() {
        let mut show = empty_show();
        ingest(&mut show, &[RawRecord::new(1, "Jane Doe")]);
        let sheet = GroupSheet {
            columns: vec![
                GroupColumn { header: "Group Numbers [Opening]".into(), title: "Opening".into() },
                GroupColumn { header: "Group Numbers [Finale]".into(), title: "Finale".into() },
            ],
            rows: vec![
                GroupSheetRow {
                    row: 1,
                    first_name: "Jane".into(),
                    last_name: "Doe".into(),
                    email: "jane@example.com".into(),
                    joined: vec!["Group Numbers [Opening]".into()],
                },
                GroupSheetRow {
                    row: 2,
                    first_name: "Sam".into(),
                    last_name: "Lee".into(),
                    email: String::new(),
                    joined: vec!["Group Numbers [Opening]".into(), "Group Numbers [Finale]".into()],
                },
            ],
        };
        let report = ingest_group_sheet(&mut show, &sheet);
        assert_eq!(report.performances_created, 2);
        assert_eq!(report.participants_created, 1);

        let opening = show.performance("GroupNumbersOpening").unwrap();
        assert_eq!(opening.title, "Opening");
        assert_eq!(opening.participants, vec!["JaneDoe", "SamLee"]);
        assert_eq!(show.performance("GroupNumbersFinale").unwrap().participants, vec!["SamLee"]);
        assert_eq!(
            show.participant("JaneDoe").unwrap().email.as_deref(),
            Some("jane@example.com")
        );

        ingest_group_sheet(&mut show, &sheet);
        assert_eq!(show.performance("GroupNumbersOpening").unwrap().participants.len(), 2);
    }

    #[test]
    fn test_ledger_creates_and_backfills() {
        let mut show = empty_show();
        let report = ingest_ledger(
            &mut show,
            &[
                LedgerRecord { row: 1, name: "Ana Ruiz".into(), email: "ana@example.com".into() },
                LedgerRecord { row: 2, name: "".into(), email: "nobody@example.com".into() },
            ],
        );
        assert_eq!(report.participants_created, 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(show.participant("AnaRuiz").unwrap().last_name, "Ruiz");
    }
}
