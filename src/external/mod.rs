//! External tool abstractions
//!
//! The git builder produces plain [`Command`] values; this module owns
//! everything about actually running them, so callers can swap in a mock
//! executor in tests.

pub mod command;

pub use command::{Command, CommandError, CommandExecutor, CommandOutput, ProcessCommandExecutor};

#[cfg(any(test, feature = "testing"))]
pub use command::MockCommandExecutor;
