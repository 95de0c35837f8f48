//! Git command builder
//!
//! Maps typed method calls onto `git <subcommand> <args...>` invocations.
//! Running them is left to [`crate::external::CommandExecutor`].

pub mod commands;

pub use commands::{Git, GitError};
