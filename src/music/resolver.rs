use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::core::{Performance, Show};
use crate::ScheduleResult;

/// A performance's music, ready to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub path: PathBuf,
    pub duration_secs: u32,
}

/// Turns a performance's music reference into a local, playable file.
pub trait MusicResolver {
    fn resolve(&self, performance: &Performance) -> ScheduleResult<ResolvedAsset>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MusicWarning {
    #[error("performance `{performance}`: no music")]
    Missing { performance: String },
    #[error("performance `{performance}`: {message}")]
    Unresolved { performance: String, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MusicReport {
    pub resolved: usize,
    pub warnings: Vec<MusicWarning>,
}

/// Resolve music for every active, non-intermission performance and take
/// its length from the asset. Failures leave the length untouched.
pub fn resolve_durations(show: &mut Show, resolver: &dyn MusicResolver) -> MusicReport {
    let mut report = MusicReport::default();
    let ids: Vec<String> = show.performance_ids().to_vec();
    for id in ids {
        let Some(performance) = show.performance(&id) else {
            continue;
        };
        if performance.withdrawn || performance.is_intermission() {
            continue;
        }
        if performance.music.is_none() {
            let warning = MusicWarning::Missing { performance: id };
            warn!("{warning}");
            report.warnings.push(warning);
            continue;
        }
        match resolver.resolve(performance) {
            Ok(asset) => {
                if let Some(performance) = show.performance_mut(&id) {
                    performance.length_seconds = asset.duration_secs;
                }
                report.resolved += 1;
            }
            Err(e) => {
                let warning = MusicWarning::Unresolved {
                    performance: id,
                    message: e.to_string(),
                };
                warn!("{warning}");
                report.warnings.push(warning);
            }
        }
    }
    info!(
        resolved = report.resolved,
        warnings = report.warnings.len(),
        "music resolved"
    );
    report
}

/// Configuration for [`MockResolver`] behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub durations: HashMap<String, u32>,
    pub failures: HashMap<String, String>,
    pub default_duration: Option<u32>,
    pub dir: PathBuf,
}

impl MockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, key: impl Into<String>, secs: u32) -> Self {
        self.durations.insert(key.into(), secs);
        self
    }

    pub fn with_failure(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(key.into(), message.into());
        self
    }

    /// Duration for keys without an explicit entry; without one they fail.
    pub fn with_default_duration(mut self, secs: u32) -> Self {
        self.default_duration = Some(secs);
        self
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }
}

/// Resolver returning configured durations. Asset paths are `<dir>/<key>.mp3`
/// and are never created.
#[derive(Debug, Default)]
pub struct MockResolver {
    config: MockConfig,
    calls: RefCell<Vec<String>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MockConfig) -> Self {
        MockResolver {
            config,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Performance keys resolved so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl MusicResolver for MockResolver {
    fn resolve(&self, performance: &Performance) -> ScheduleResult<ResolvedAsset> {
        let key = &performance.id;
        self.calls.borrow_mut().push(key.clone());
        if let Some(message) = self.config.failures.get(key) {
            return Err(crate::ScheduleError::Message(message.clone()));
        }
        let duration_secs = self
            .config
            .durations
            .get(key)
            .copied()
            .or(self.config.default_duration)
            .ok_or_else(|| crate::ScheduleError::Message(format!("no mock music for `{key}`")))?;
        Ok(ResolvedAsset {
            path: self.config.dir.join(format!("{key}.mp3")),
            duration_secs,
        })
    }
}
