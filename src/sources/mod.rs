//! Input adapters: sheet download, CSV readers and the order file.

pub mod fetch;
pub mod order_file;
pub mod sheets;

// Re-export key types
pub use fetch::{Fetched, Fetcher, HttpFetcher, MockFetcher, content_disposition_filename};
pub use order_file::{load_skate_order, parse_skate_order};
pub use sheets::{
    SHEETS_EXPORT_URL, load_group_sheet, load_ledger, load_registrations, locate_optional_sheet,
    locate_sheet, read_group_sheet, read_ledger, read_registrations,
};
