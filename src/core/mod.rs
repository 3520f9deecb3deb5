//! Core types for the show model.
//!
//! - `key`: stable identifiers derived from names and titles
//! - `names`: participant string parsing (sub-rosters, first/last names)
//! - `model`: `Participant`, `Performance` and the `Show` aggregate

pub mod key;
pub mod model;
pub mod names;

// Re-export key types for convenience
pub use key::{derive_key, strip_nonprintable};
pub use model::{
    Billing, Category, MusicReference, OrderEntry, Participant, Performance, Show, SubRoster,
};
pub use names::{DEFAULT_GROUP, NameError, ParsedName, parse_name, parse_subgroups};
