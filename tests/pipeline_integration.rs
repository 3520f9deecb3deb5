//! End-to-end ingestion and timing over a show directory on disk.

use std::path::Path;

use skate_schedule::ScheduleError;
use skate_schedule::config::load_show_config;
use skate_schedule::pipeline::{LoadedShow, load_show, plan};
use skate_schedule::report::render_summary;
use skate_schedule::schedule::format_clock;
use skate_schedule::sources::{Fetched, MockFetcher};

const SHOW_TOML: &str = r#"
[show]
name = "Winter Show 2018"
date = "2018-12-09"
start = "18:00"

[inputs]
ledger = "contacts.csv"
"#;

const STARTS: &str = "\
Timestamp,Name(s),Program Title (optional),Music Upload,Introduction Blurb for Announcer,Length,Category
12/1/2018,Jane Doe,Firebird,,Jane has skated for ten years.,2:00,
12/1/2018,\"John Smith, Mary Major\",,,,1:30,
12/2/2018,,Intermission,,,10:00,intermission
12/2/2018,Amy Lee,SCRATCH Swan Lake,,,2:00,
12/3/2018,\"Coaches: Bob Axe: Skaters: Jane Doe, Amy Lee\",Finale,,,3:00,
";

const GROUP: &str = "\
First Name,Last Name,Email Address,Group Numbers [Opening]
Jane,Doe,jane@example.com,Yes
Chris,Park,,Yes
";

const CONTACTS: &str = "Name,Email\nJohn Smith,john@example.com\n";

const ORDER: &str = "\
GroupNumbersOpening
Firebird
JohnSmithMaryMajor
Intermission
Finale
";

/// Write a complete show directory and return the path to its config.
fn write_show(root: &Path, order: Option<&str>) -> std::path::PathBuf {
    let inputs = root.join("inputs");
    std::fs::create_dir_all(&inputs).unwrap();
    std::fs::write(inputs.join("starts.csv"), STARTS).unwrap();
    std::fs::write(inputs.join("group.csv"), GROUP).unwrap();
    std::fs::write(inputs.join("contacts.csv"), CONTACTS).unwrap();
    if let Some(order) = order {
        std::fs::write(inputs.join("skate_order.txt"), order).unwrap();
    }
    let config = root.join("show.toml");
    std::fs::write(&config, SHOW_TOML).unwrap();
    config
}

fn load(config: &Path) -> LoadedShow {
    let cfg = load_show_config(config).unwrap();
    load_show(&cfg, cfg.start_time().unwrap(), &MockFetcher::new()).unwrap()
}

#[test]
fn test_explicit_order_and_start_times() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = load(&write_show(dir.path(), Some(ORDER)));
    assert!(loaded.ingest.warnings.is_empty(), "{:?}", loaded.ingest.warnings);

    let plan = plan(&loaded.show).unwrap();
    let slots: Vec<(&str, String)> = plan
        .schedule
        .iter()
        .map(|s| (s.performance.id.as_str(), format_clock(s.start)))
        .collect();
    assert_eq!(
        slots,
        vec![
            ("GroupNumbersOpening", "06:00:00".to_string()),
            ("Firebird", "06:00:40".to_string()),
            ("JohnSmithMaryMajor", "06:03:20".to_string()),
            ("Intermission", "06:05:30".to_string()),
            ("Finale", "06:15:30".to_string()),
        ]
    );
}

#[test]
fn test_registration_order_skips_withdrawn() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = load(&write_show(dir.path(), None));
    let plan = plan(&loaded.show).unwrap();
    let keys: Vec<&str> = plan.ordered.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        keys,
        vec!["Firebird", "JohnSmithMaryMajor", "Intermission", "Finale", "GroupNumbersOpening"]
    );
    assert!(loaded.show.performance("SwanLake").unwrap().withdrawn);
}

#[test]
fn test_roster_is_shared_across_sources() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = load(&write_show(dir.path(), Some(ORDER)));
    let show = &loaded.show;

    let jane = show.participant("JaneDoe").unwrap();
    assert_eq!(jane.email.as_deref(), Some("jane@example.com"));
    assert_eq!(
        show.participant("JohnSmith").unwrap().email.as_deref(),
        Some("john@example.com")
    );
    assert_eq!(show.participant("ChrisPark").unwrap().full_name(), "Chris Park");

    let finale = show.performance("Finale").unwrap();
    let labels: Vec<&str> = finale.sub_rosters.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Coaches", "Skaters"]);
    assert_eq!(finale.participants, vec!["BobAxe", "JaneDoe", "AmyLee"]);

    let opening = show.performance("GroupNumbersOpening").unwrap();
    assert_eq!(opening.title, "Opening");
    assert_eq!(opening.participant_count(), 2);
}

#[test]
fn test_reloading_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_show(dir.path(), Some(ORDER));
    let first = load(&config);
    let second = load(&config);

    let summary = |loaded: &LoadedShow| {
        let plan = plan(&loaded.show).unwrap();
        render_summary(&loaded.show, &plan.ordered)
    };
    assert_eq!(summary(&first), summary(&second));
    assert_eq!(first.show.participant_count(), second.show.participant_count());
}

#[test]
fn test_unknown_order_key_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_show(dir.path(), Some("Firebird\nFirebirdd\n"));
    let cfg = load_show_config(&config).unwrap();
    let err = load_show(&cfg, cfg.start_time().unwrap(), &MockFetcher::new()).unwrap_err();
    assert!(matches!(err, ScheduleError::UnknownPerformance { ref key, line: 2 } if key == "Firebirdd"));
}

#[test]
fn test_registrations_downloaded_from_sheet_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_show(dir.path(), None);
    let inputs = dir.path().join("inputs");
    std::fs::remove_file(inputs.join("starts.csv")).unwrap();
    std::fs::write(inputs.join("starts.csv.key"), "1sheetKey\n").unwrap();

    let url = "https://docs.google.com/spreadsheets/d/1sheetKey/export?format=csv";
    let fetcher = MockFetcher::new().with_response(
        url,
        Fetched {
            bytes: STARTS.as_bytes().to_vec(),
            filename: None,
        },
    );
    let cfg = load_show_config(&config).unwrap();
    let loaded = load_show(&cfg, cfg.start_time().unwrap(), &fetcher).unwrap();

    assert_eq!(fetcher.requests(), vec![url]);
    assert!(loaded.show.performance("Firebird").is_some());
    assert!(inputs.join("starts.csv").exists());
}
