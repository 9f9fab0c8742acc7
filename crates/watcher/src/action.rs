//! Build and reload actions
//!
//! An action is a no-argument side effect run by the debounce loop on each
//! dispatch. Failures are reported to the loop, which logs them and keeps
//! watching.

use crate::error::ActionError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};

/// Side effect run on a dispatch
#[async_trait]
pub trait Action: Send + Sync {
    /// Name used in log lines ("build", "reload")
    fn name(&self) -> &str;

    /// Run the action to completion
    async fn run(&self) -> Result<(), ActionError>;
}

/// Action that only logs its name
///
/// Used when no command is configured for a step.
#[derive(Debug, Clone)]
pub struct LogAction {
    name: String,
}

impl LogAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Action for LogAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), ActionError> {
        info!("{}", self.name);
        Ok(())
    }
}

/// Action that runs a shell command
///
/// The command runs through the platform shell with `workdir` as its current
/// directory. Output is captured and logged line by line. A command still
/// running after `timeout` is killed.
#[derive(Debug, Clone)]
pub struct CommandAction {
    name: String,
    command: String,
    workdir: PathBuf,
    timeout: Duration,
}

impl CommandAction {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        workdir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            workdir: workdir.into(),
            timeout,
        }
    }

    fn shell(&self) -> Command {
        #[cfg(windows)]
        let mut cmd = {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.command);
            cmd
        };

        #[cfg(not(windows))]
        let mut cmd = {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.command);
            cmd
        };

        cmd.current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Action for CommandAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), ActionError> {
        info!("{}: running `{}`", self.name, self.command);

        let child = self.shell().spawn().map_err(|source| ActionError::Spawn {
            action: self.name.clone(),
            command: self.command.clone(),
            source,
        })?;

        // Dropping the pending future on timeout kills the child (kill_on_drop)
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ActionError::TimedOut {
                action: self.name.clone(),
                command: self.command.clone(),
                after: self.timeout,
            })?
            .map_err(|source| ActionError::Spawn {
                action: self.name.clone(),
                command: self.command.clone(),
                source,
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            info!("{}: {}", self.name, line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            warn!("{}: {}", self.name, line);
        }

        if !output.status.success() {
            return Err(ActionError::Failed {
                action: self.name.clone(),
                command: self.command.clone(),
                code: output.status.code(),
            });
        }

        info!("{}: done", self.name);
        Ok(())
    }
}

/// Pick the action for a step: a command when one is configured, a log line
/// otherwise
pub fn action_for(
    name: &str,
    command: Option<&str>,
    workdir: &Path,
    timeout: Duration,
) -> Box<dyn Action> {
    match command {
        Some(command) => Box::new(CommandAction::new(name, command, workdir, timeout)),
        None => Box::new(LogAction::new(name)),
    }
}
