//! Numbered copy of the show's music for the sound booth.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::tags::{TrackTags, write_tags};
use crate::core::Performance;
use crate::ScheduleResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskReport {
    pub tracks: Vec<PathBuf>,
    /// Performances with no cached music.
    pub missing: Vec<String>,
}

/// `NN_<key>.mp3`, numbered from 1.
pub fn track_filename(track: usize, key: &str) -> String {
    format!("{track:02}_{key}.mp3")
}

/// Copy `music/<key>.mp3` for each performance, in order, into `out_dir`.
///
/// Existing `.mp3` files in `out_dir` are removed first. Intermissions are
/// skipped and take no track number; performances without cached music are
/// reported and also take no number. With `tag` set each copy gets its track
/// number written.
pub fn prepare_ordered_disk(
    ordered: &[&Performance],
    music_dir: &Path,
    out_dir: &Path,
    album: &str,
    tag: bool,
) -> ScheduleResult<DiskReport> {
    std::fs::create_dir_all(out_dir)?;
    for entry in std::fs::read_dir(out_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "mp3") {
            std::fs::remove_file(&path)?;
        }
    }

    let mut report = DiskReport::default();
    for performance in ordered.iter().filter(|p| !p.is_intermission()) {
        let source = music_dir.join(format!("{}.mp3", performance.id));
        if !source.exists() {
            warn!(performance = %performance.id, "no music for disk");
            report.missing.push(performance.id.clone());
            continue;
        }
        let track = report.tracks.len() + 1;
        let target = out_dir.join(track_filename(track, &performance.id));
        std::fs::copy(&source, &target)?;
        if tag {
            write_tags(
                &target,
                &TrackTags {
                    title: performance.display_title().to_string(),
                    album: album.to_string(),
                    track: u32::try_from(track).ok(),
                },
            )?;
        }
        report.tracks.push(target);
    }
    info!(tracks = report.tracks.len(), dir = %out_dir.display(), "ordered music ready");
    Ok(report)
}
