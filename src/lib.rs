pub mod builder;
pub mod command;
pub mod config;
pub mod core;
pub mod music;
pub mod pipeline;
pub mod report;
pub mod schedule;
pub mod sources;

pub mod build_cmd;
pub mod check_cmd;
pub mod disk_cmd;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("{0}")]
    Message(String),
    #[error("skate order references unknown performance `{key}` (line {line})")]
    UnknownPerformance { key: String, line: usize },
    #[error("missing input source {}", path.display())]
    MissingSource { path: PathBuf },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

// Shared helpers
pub fn ensure_parent_dir(path: &std::path::Path) -> ScheduleResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ScheduleError::Message(format!("failed to create directory: {e}")))?;
        }
    }
    Ok(())
}
