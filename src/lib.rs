// gitcmd Library - typed builder for git command-line invocations
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod external;
pub mod git;
pub mod telemetry;

// Re-export key types for easy access
pub use crate::config::{GitCmdConfig, GitSettings};
pub use external::{Command, CommandError, CommandExecutor, CommandOutput, ProcessCommandExecutor};
pub use git::{Git, GitError};
pub use telemetry::{create_command_span, generate_correlation_id, init_telemetry};
