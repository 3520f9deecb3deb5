//! Schedule builder: folds raw sign-up records into a `Show`.
//!
//! This module provides:
//! - `records`: raw registration, ledger and group-sheet rows plus cell parsers
//! - `ingest`: upsert/merge of those rows into the roster and performance map

pub mod ingest;
pub mod records;

// Re-export key types
pub use ingest::{
    IngestOptions, IngestReport, IngestWarning, SCRATCH_PREFIX, ingest, ingest_group_sheet,
    ingest_ledger, ingest_with,
};
pub use records::{
    DurationError, GroupColumn, GroupSheet, GroupSheetRow, LedgerRecord, RawRecord,
    RecordOverride, group_columns, parse_duration, parse_flag,
};
