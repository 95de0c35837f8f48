use anyhow::{Context, Result};
use std::io::Write;

use crate::external::{Command, CommandExecutor};

/// Render a command for `--dry-run`, either quoted or as pretty JSON.
pub fn render_dry_run(command: &Command, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(command).context("Failed to serialize command")
    } else {
        Ok(command.printable_args())
    }
}

/// Runs one assembled git command and forwards its output.
pub struct RunCommand<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> RunCommand<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Execute `command`, copy its stdout and stderr to the given writers and
    /// return git's exit code.
    pub async fn execute(
        &self,
        command: &Command,
        stdout: &mut impl Write,
        stderr: &mut impl Write,
    ) -> Result<i32> {
        tracing::info!(command = %command, "running git command");

        let output = self
            .executor
            .execute(command)
            .await
            .with_context(|| format!("Failed to run {command}"))?;

        stdout.write_all(output.stdout.as_bytes())?;
        stderr.write_all(output.stderr.as_bytes())?;
        stdout.flush()?;
        stderr.flush()?;

        if !output.success() {
            tracing::warn!(status_code = output.status_code, "git exited with failure");
        }
        Ok(output.status_code)
    }
}
