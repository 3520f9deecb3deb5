//! Music assets.
//!
//! This module provides:
//! - `resolver`: the `MusicResolver` seam, a mock, and length refresh from assets
//! - `local`: the cache/download/transcode resolver used for real shows
//! - `tags`: duration and tag access
//! - `disk`: the numbered copy of the music in running order

pub mod disk;
pub mod local;
pub mod resolver;
pub mod tags;

// Re-export key types
pub use disk::{DiskReport, prepare_ordered_disk, track_filename};
pub use local::{LocalMusicResolver, direct_download_url};
pub use resolver::{
    MockConfig, MockResolver, MusicReport, MusicResolver, MusicWarning, ResolvedAsset,
    resolve_durations,
};
pub use tags::{TrackTags, read_duration_secs, write_tags};
