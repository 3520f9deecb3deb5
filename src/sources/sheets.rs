//! CSV sheets: registrations, contact ledger and the group sign-up sheet.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use super::fetch::Fetcher;
use crate::builder::{GroupSheet, GroupSheetRow, LedgerRecord, RawRecord, group_columns};
use crate::config::ColumnMap;
use crate::{ScheduleError, ScheduleResult, ensure_parent_dir};

/// CSV export URL for a Google Sheets document key.
pub const SHEETS_EXPORT_URL: &str = "https://docs.google.com/spreadsheets/d/{key}/export?format=csv";

/// Find `dir/filename`, downloading it first when only `filename.key` exists.
///
/// With `cache` set an existing file wins over its key; otherwise the key is
/// fetched again and the cached copy overwritten.
pub fn locate_sheet(
    dir: &Path,
    filename: &str,
    cache: bool,
    fetcher: &dyn Fetcher,
) -> ScheduleResult<PathBuf> {
    let path = dir.join(filename);
    let key_path = dir.join(format!("{filename}.key"));

    if path.exists() && (cache || !key_path.exists()) {
        debug!(path = %path.display(), "using local sheet");
        return Ok(path);
    }
    if !key_path.exists() {
        return Err(ScheduleError::MissingSource { path });
    }

    let key = std::fs::read_to_string(&key_path)
        .map_err(|e| ScheduleError::Message(format!("failed to read {}: {e}", key_path.display())))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ScheduleError::Message(format!("{} is empty", key_path.display())));
    }
    let url = SHEETS_EXPORT_URL.replace("{key}", key);
    info!(sheet = filename, "downloading sheet");
    let fetched = fetcher.fetch(&url)?;
    ensure_parent_dir(&path)?;
    std::fs::write(&path, &fetched.bytes)?;
    Ok(path)
}

/// Like [`locate_sheet`] but an absent optional sheet is `None`.
pub fn locate_optional_sheet(
    dir: &Path,
    filename: &str,
    cache: bool,
    fetcher: &dyn Fetcher,
) -> ScheduleResult<Option<PathBuf>> {
    match locate_sheet(dir, filename, cache, fetcher) {
        Ok(path) => Ok(Some(path)),
        Err(ScheduleError::MissingSource { path }) => {
            debug!(path = %path.display(), "optional sheet not present");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

struct Header {
    names: Vec<String>,
}

impl Header {
    fn read<R: Read>(reader: &mut csv::Reader<R>) -> ScheduleResult<Self> {
        let names = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        Ok(Header { names })
    }

    fn index(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|h| h == column.trim())
    }

    fn require(&self, column: &str, sheet: &str) -> ScheduleResult<usize> {
        self.index(column).ok_or_else(|| {
            ScheduleError::Message(format!("{sheet} has no `{column}` column"))
        })
    }
}

fn cell(record: &StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|i| record.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new().flexible(true).from_reader(input)
}

fn open(path: &Path) -> ScheduleResult<File> {
    File::open(path)
        .map_err(|e| ScheduleError::Message(format!("failed to open {}: {e}", path.display())))
}

/// Read registration rows. Only the names column is required.
pub fn read_registrations<R: Read>(input: R, columns: &ColumnMap) -> ScheduleResult<Vec<RawRecord>> {
    let mut reader = csv_reader(input);
    let header = Header::read(&mut reader)?;
    let names = header.require(&columns.names, "registration sheet")?;
    let title = header.index(&columns.title);
    let length = header.index(&columns.length);
    let blurb = header.index(&columns.blurb);
    let music = header.index(&columns.music);
    let category = header.index(&columns.category);
    let withdrawn = header.index(&columns.withdrawn);
    let billing = header.index(&columns.billing);
    let overrides = header.index(&columns.overrides);

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        records.push(RawRecord {
            row: i + 1,
            names: cell(&row, Some(names)),
            title: cell(&row, title),
            length: cell(&row, length),
            blurb: cell(&row, blurb),
            music: cell(&row, music),
            category: cell(&row, category),
            withdrawn: cell(&row, withdrawn),
            billing: cell(&row, billing),
            overrides: cell(&row, overrides),
        });
    }
    Ok(records)
}

pub fn read_ledger<R: Read>(input: R, columns: &ColumnMap) -> ScheduleResult<Vec<LedgerRecord>> {
    let mut reader = csv_reader(input);
    let header = Header::read(&mut reader)?;
    let name = header.require(&columns.ledger_name, "ledger")?;
    let email = header.index(&columns.ledger_email);

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        records.push(LedgerRecord {
            row: i + 1,
            name: cell(&row, Some(name)),
            email: cell(&row, email),
        });
    }
    Ok(records)
}

/// Read the group sign-up sheet. A ticked group cell is any non-empty value.
pub fn read_group_sheet<R: Read>(input: R, columns: &ColumnMap) -> ScheduleResult<GroupSheet> {
    let mut reader = csv_reader(input);
    let header = Header::read(&mut reader)?;
    let first = header.require(&columns.first_name, "group sheet")?;
    let last = header.require(&columns.last_name, "group sheet")?;
    let email = header.index(&columns.email);
    let group_cols = group_columns(header.names.iter().map(String::as_str));
    let group_idx: Vec<(usize, &str)> = group_cols
        .iter()
        .filter_map(|c| header.index(&c.header).map(|i| (i, c.header.as_str())))
        .collect();

    let mut rows = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let joined = group_idx
            .iter()
            .filter(|(idx, _)| !cell(&row, Some(*idx)).is_empty())
            .map(|(_, h)| h.to_string())
            .collect();
        rows.push(GroupSheetRow {
            row: i + 1,
            first_name: cell(&row, Some(first)),
            last_name: cell(&row, Some(last)),
            email: cell(&row, email),
            joined,
        });
    }
    Ok(GroupSheet {
        columns: group_cols,
        rows,
    })
}

pub fn load_registrations(path: &Path, columns: &ColumnMap) -> ScheduleResult<Vec<RawRecord>> {
    read_registrations(open(path)?, columns)
}

pub fn load_ledger(path: &Path, columns: &ColumnMap) -> ScheduleResult<Vec<LedgerRecord>> {
    read_ledger(open(path)?, columns)
}

pub fn load_group_sheet(path: &Path, columns: &ColumnMap) -> ScheduleResult<GroupSheet> {
    read_group_sheet(open(path)?, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fetch::{Fetched, MockFetcher};

    const REGISTRATIONS: &str = "\
Timestamp,Name(s),Program Title (optional),Music Upload,Introduction Blurb for Announcer,Length
1/1/2018,Jane Doe,Firebird,https://drive.google.com/open?id=abc,Jane skates.,2:30
1/2/2018,\"John Smith, Mary Major\",, 95 ,,
";

    #[test]
    fn test_read_registrations_maps_columns() {
        let records = read_registrations(REGISTRATIONS.as_bytes(), &ColumnMap::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row, 1);
        assert_eq!(records[0].names, "Jane Doe");
        assert_eq!(records[0].title, "Firebird");
        assert_eq!(records[0].length, "2:30");
        assert_eq!(records[0].category, "");
        assert_eq!(records[1].names, "John Smith, Mary Major");
        assert_eq!(records[1].music, "95");
    }

    #[test]
    fn test_read_registrations_requires_names_column() {
        let err = read_registrations("Title\nFirebird\n".as_bytes(), &ColumnMap::default()).unwrap_err();
        assert!(err.to_string().contains("Name(s)"));
    }

    #[test]
    fn test_read_registrations_short_rows() {
        let records = read_registrations("Name(s),Length\nJane Doe\n".as_bytes(), &ColumnMap::default()).unwrap();
        assert_eq!(records[0].length, "");
    }

    #[test]
    fn test_read_ledger() {
        let text = "Name,Email\nJane Doe, jane@example.com \nJohn Smith,\n";
        let ledger = read_ledger(text.as_bytes(), &ColumnMap::default()).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].email, "jane@example.com");
        assert_eq!(ledger[1].row, 2);
    }

    #[test]
    fn test_read_group_sheet() {
        let text = "\
First Name,Last Name,Email Address,Group Numbers [Opening],Group Numbers [Finale]
Jane,Doe,jane@example.com,Yes,
John,Smith,,,Yes
";
        let sheet = read_group_sheet(text.as_bytes(), &ColumnMap::default()).unwrap();
        assert_eq!(sheet.columns.len(), 2);
        assert_eq!(sheet.rows[0].joined, vec!["Group Numbers [Opening]"]);
        assert_eq!(sheet.rows[1].joined, vec!["Group Numbers [Finale]"]);
        assert_eq!(sheet.rows[1].email, "");
    }

    #[test]
    fn test_locate_sheet_prefers_cached_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("starts.csv"), "Name(s)\n").unwrap();
        std::fs::write(dir.path().join("starts.csv.key"), "abc").unwrap();
        let fetcher = MockFetcher::new();
        let path = locate_sheet(dir.path(), "starts.csv", true, &fetcher).unwrap();
        assert_eq!(path, dir.path().join("starts.csv"));
        assert!(fetcher.requests().is_empty());
    }

    #[test]
    fn test_locate_sheet_downloads_from_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("starts.csv.key"), "abc123\n").unwrap();
        let url = "https://docs.google.com/spreadsheets/d/abc123/export?format=csv";
        let fetcher = MockFetcher::new().with_response(
            url,
            Fetched {
                bytes: b"Name(s)\nJane Doe\n".to_vec(),
                filename: None,
            },
        );
        let path = locate_sheet(dir.path(), "starts.csv", true, &fetcher).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Name(s)\nJane Doe\n");
        assert_eq!(fetcher.requests(), vec![url]);
    }

    #[test]
    fn test_locate_sheet_refreshes_without_cache() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("starts.csv"), "old").unwrap();
        std::fs::write(dir.path().join("starts.csv.key"), "k").unwrap();
        let fetcher = MockFetcher::new().with_response(
            "https://docs.google.com/spreadsheets/d/k/export?format=csv",
            Fetched {
                bytes: b"new".to_vec(),
                filename: None,
            },
        );
        let path = locate_sheet(dir.path(), "starts.csv", false, &fetcher).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
    }

    #[test]
    fn test_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = MockFetcher::new();
        let err = locate_sheet(dir.path(), "starts.csv", true, &fetcher).unwrap_err();
        assert!(matches!(err, ScheduleError::MissingSource { .. }));
        assert_eq!(
            locate_optional_sheet(dir.path(), "group.csv", true, &fetcher).unwrap(),
            None
        );
    }
}
