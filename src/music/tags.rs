//! Audio tag and duration access through lofty.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{Tag, TagExt};

use crate::{ScheduleError, ScheduleResult};

/// Tags written onto a prepared track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: String,
    pub album: String,
    pub track: Option<u32>,
}

fn tag_error(path: &Path, e: impl std::fmt::Display) -> ScheduleError {
    ScheduleError::Message(format!("{}: {e}", path.display()))
}

/// Playing time in whole seconds.
pub fn read_duration_secs(path: &Path) -> ScheduleResult<u32> {
    let tagged = Probe::open(path)
        .map_err(|e| tag_error(path, e))?
        .read()
        .map_err(|e| tag_error(path, e))?;
    let secs = tagged.properties().duration().as_secs();
    u32::try_from(secs).map_err(|_| tag_error(path, "duration out of range"))
}

/// Set title, album and (optionally) track number, creating a tag if the
/// file has none.
pub fn write_tags(path: &Path, tags: &TrackTags) -> ScheduleResult<()> {
    let mut tagged = Probe::open(path)
        .map_err(|e| tag_error(path, e))?
        .read()
        .map_err(|e| tag_error(path, e))?;
    if tagged.primary_tag().is_none() {
        let tag_type = tagged.primary_tag_type();
        tagged.insert_tag(Tag::new(tag_type));
    }
    let tag = tagged
        .primary_tag_mut()
        .ok_or_else(|| tag_error(path, "file does not accept tags"))?;
    tag.set_title(tags.title.clone());
    tag.set_album(tags.album.clone());
    if let Some(track) = tags.track {
        tag.set_track(track);
    }
    tag.save_to_path(path, WriteOptions::default())
        .map_err(|e| tag_error(path, e))
}
