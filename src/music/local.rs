//! Filesystem-backed music resolution: cache, download, transcode, tag.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::resolver::{MusicResolver, ResolvedAsset};
use super::tags::{TrackTags, read_duration_secs, write_tags};
use crate::command::CommandTemplate;
use crate::config::ShowConfig;
use crate::core::{MusicReference, Performance};
use crate::sources::Fetcher;
use crate::{ScheduleError, ScheduleResult, ensure_parent_dir};

const DRIVE_OPEN: &str = "drive.google.com/open?id=";
const DRIVE_DOWNLOAD: &str = "https://drive.google.com/uc?export=download&id=";

/// Rewrite Drive "open" links to their direct download form.
pub fn direct_download_url(url: &str) -> String {
    match url.split_once(DRIVE_OPEN) {
        Some((_, id)) => format!("{DRIVE_DOWNLOAD}{id}"),
        None => url.to_string(),
    }
}

fn extension_of(name: &str) -> Option<String> {
    let name = name.split(['?', '#']).next().unwrap_or(name);
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
}

fn cd_track_error(name: &str) -> ScheduleError {
    ScheduleError::Message(format!("`{name}` is a CD track shortcut, not audio"))
}

/// Resolves music into `music/<key>.mp3`.
pub struct LocalMusicResolver {
    pub music_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub album: String,
    /// Reuse an existing `music/<key>.mp3`.
    pub cache: bool,
    pub transcode: CommandTemplate,
    fetcher: Box<dyn Fetcher>,
}

impl LocalMusicResolver {
    pub fn new(config: &ShowConfig, fetcher: Box<dyn Fetcher>) -> Self {
        LocalMusicResolver {
            music_dir: config.music_dir(),
            uploads_dir: config.uploads_dir(),
            album: config.music.album.clone(),
            cache: config.music.cache,
            transcode: CommandTemplate::new(config.commands.transcode.clone()),
            fetcher,
        }
    }

    pub fn cached_path(&self, key: &str) -> PathBuf {
        self.music_dir.join(format!("{key}.mp3"))
    }

    /// Download a remote reference into a temporary file in the music
    /// directory; returns the file and its extension.
    fn download(&self, url: &str, key: &str) -> ScheduleResult<(NamedTempFile, String)> {
        let url = direct_download_url(url);
        info!(performance = key, url = %url, "downloading music");
        let fetched = self.fetcher.fetch(&url)?;
        let ext = fetched
            .filename
            .as_deref()
            .and_then(extension_of)
            .or_else(|| extension_of(&url))
            .unwrap_or_else(|| "mp3".to_string());
        if ext == "cda" {
            return Err(cd_track_error(fetched.filename.as_deref().unwrap_or(&url)));
        }
        std::fs::create_dir_all(&self.music_dir)?;
        let mut staged = tempfile::Builder::new()
            .prefix(&format!("{key}."))
            .suffix(&format!(".{ext}"))
            .tempfile_in(&self.music_dir)?;
        staged.write_all(&fetched.bytes)?;
        Ok((staged, ext))
    }

    /// Turn `source` into an mp3 at `target`, transcoding when needed.
    fn transcode_or_copy(&self, source: &Path, ext: &str, target: &Path) -> ScheduleResult<()> {
        ensure_parent_dir(target)?;
        if ext == "mp3" {
            std::fs::copy(source, target)?;
            return Ok(());
        }
        debug!(source = %source.display(), "transcoding");
        self.transcode
            .run(&[("input", source), ("output", target)])
    }
}

impl MusicResolver for LocalMusicResolver {
    fn resolve(&self, performance: &Performance) -> ScheduleResult<ResolvedAsset> {
        let key = &performance.id;
        let target = self.cached_path(key);

        if self.cache && target.exists() {
            debug!(performance = %key, "using cached music");
        } else {
            let reference = performance.music.as_ref().ok_or_else(|| {
                ScheduleError::Message("no music reference".into())
            })?;
            if reference.as_str().trim_end().to_ascii_lowercase().ends_with(".cda") {
                return Err(cd_track_error(reference.as_str()));
            }
            match reference {
                MusicReference::Remote(url) => {
                    let (staged, ext) = self.download(url, key)?;
                    self.transcode_or_copy(staged.path(), &ext, &target)?;
                }
                MusicReference::File(name) => {
                    let source = self.uploads_dir.join(name);
                    if !source.exists() {
                        return Err(ScheduleError::MissingSource { path: source });
                    }
                    let ext = extension_of(name).unwrap_or_default();
                    self.transcode_or_copy(&source, &ext, &target)?;
                }
            }
            write_tags(
                &target,
                &TrackTags {
                    title: performance.display_title().to_string(),
                    album: self.album.clone(),
                    track: None,
                },
            )?;
        }

        Ok(ResolvedAsset {
            duration_secs: read_duration_secs(&target)?,
            path: target,
        })
    }
}
