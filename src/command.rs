//! External tool invocation from `{placeholder}` command templates.

use std::path::Path;
use std::process::{Command, Stdio};

use shlex::Shlex;
use tracing::debug;

use crate::{ScheduleError, ScheduleResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    template: String,
}

impl CommandTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        CommandTemplate {
            template: template.into(),
        }
    }

    /// Program name, for messages.
    pub fn program(&self) -> String {
        Shlex::new(&self.template).next().unwrap_or_default()
    }

    /// Split the template and substitute placeholders in every argument.
    pub fn build(&self, vars: &[(&str, &Path)]) -> ScheduleResult<Command> {
        let mut parts: Vec<String> = Shlex::new(&self.template).collect();
        if parts.is_empty() {
            return Err(ScheduleError::Message("empty command template".into()));
        }
        for p in &mut parts {
            for (name, value) in vars {
                *p = p.replace(&format!("{{{name}}}"), &value.to_string_lossy());
            }
        }
        let mut cmd = Command::new(&parts[0]);
        cmd.args(&parts[1..]);
        Ok(cmd)
    }

    /// Run to completion; a non-zero exit is an error carrying the tail of stderr.
    pub fn run(&self, vars: &[(&str, &Path)]) -> ScheduleResult<()> {
        let mut cmd = self.build(vars)?;
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!(command = ?cmd, "running");
        let output = cmd.output().map_err(|e| {
            ScheduleError::Message(format!("failed to run {}: {e}", self.program()))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            let tail: Vec<&str> = tail.into_iter().rev().collect();
            return Err(ScheduleError::Message(format!(
                "{} exited with {}: {}",
                self.program(),
                output.status,
                tail.join("\n")
            )));
        }
        Ok(())
    }
}
