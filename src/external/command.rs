//! Base command execution abstraction
//!
//! Provides the `Command` value produced by the git builder and the trait
//! used to execute it, enabling dependency injection for testing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tracing::Instrument;

use crate::telemetry::{create_command_span, generate_correlation_id};

/// A program name plus an ordered argument list, optionally scoped to a
/// working directory and extra environment variables.
///
/// Building a `Command` performs no I/O; hand it to a [`CommandExecutor`]
/// to actually run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.envs
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn get_envs(&self) -> &[(String, String)] {
        &self.envs
    }

    /// Human readable form: the program name bare, each argument quoted.
    ///
    /// `git "commit" "-m" "fix: bug"`
    pub fn printable_args(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().map(|arg| format!("{arg:?}")));
        parts.join(" ")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.printable_args())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == 0
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Command not found: {command}")]
    CommandNotFound { command: String },
    #[error("Command timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("IO error: {message}")]
    Io { message: String },
    #[error("`{command}` exited with status {code}: {stderr}")]
    ExitStatus {
        command: String,
        code: i32,
        stderr: String,
    },
}

/// Trait for executing external commands
///
/// Only [`execute`](CommandExecutor::execute) has to be implemented; the
/// `run*` helpers interpret its output.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &Command) -> Result<CommandOutput, CommandError>;

    /// Runs the command, treating a non-zero exit status as an error.
    async fn run(&self, command: &Command) -> Result<(), CommandError> {
        let output = self.execute(command).await?;
        check_status(command, &output)
    }

    /// Runs the command and reports its exit code. Only failures to run the
    /// process at all are errors.
    async fn run_and_return_exit_code(&self, command: &Command) -> Result<i32, CommandError> {
        Ok(self.execute(command).await?.status_code)
    }

    /// Runs the command and returns stdout with surrounding whitespace removed.
    async fn run_and_return_trimmed_output(
        &self,
        command: &Command,
    ) -> Result<String, CommandError> {
        let output = self.execute(command).await?;
        check_status(command, &output)?;
        Ok(output.stdout.trim().to_string())
    }
}

fn check_status(command: &Command, output: &CommandOutput) -> Result<(), CommandError> {
    if output.success() {
        return Ok(());
    }
    Err(CommandError::ExitStatus {
        command: command.printable_args(),
        code: output.status_code,
        stderr: output.stderr.trim().to_string(),
    })
}

/// Real implementation using `tokio::process::Command`
#[derive(Debug, Clone, Default)]
pub struct ProcessCommandExecutor {
    timeout: Option<Duration>,
}

impl ProcessCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the child and fail with [`CommandError::Timeout`] once `timeout` elapses.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn spawn_and_wait(&self, command: &Command) -> Result<CommandOutput, CommandError> {
        let mut process = tokio::process::Command::new(command.program());
        process
            .args(command.get_args())
            .envs(command.get_envs().iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = command.get_current_dir() {
            process.current_dir(dir);
        }

        tracing::debug!(command = %command, "spawning process");

        let output_future = process.output();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, output_future).await {
                Ok(result) => result,
                Err(_) => {
                    let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                    tracing::warn!(command = %command, timeout_ms, "command timed out");
                    return Err(CommandError::Timeout { timeout_ms });
                }
            },
            None => output_future.await,
        }
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CommandError::CommandNotFound {
                    command: command.program().to_string(),
                }
            } else {
                CommandError::Io {
                    message: e.to_string(),
                }
            }
        })?;

        let status_code = output.status.code().unwrap_or(-1);
        tracing::debug!(status_code, "process finished");

        Ok(CommandOutput {
            status_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[async_trait]
impl CommandExecutor for ProcessCommandExecutor {
    async fn execute(&self, command: &Command) -> Result<CommandOutput, CommandError> {
        let correlation_id = generate_correlation_id();
        let span = create_command_span(command, &correlation_id);
        self.spawn_and_wait(command).instrument(span).await
    }
}

#[cfg(any(test, feature = "testing"))]
mockall::mock! {
    pub CommandExecutor {}

    #[async_trait]
    impl CommandExecutor for CommandExecutor {
        async fn execute(&self, command: &Command) -> Result<CommandOutput, CommandError>;
    }
}
