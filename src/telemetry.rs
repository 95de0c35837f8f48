use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;
use crate::external::Command;

/// Initialize structured logging to stderr.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already installed.
pub fn init_telemetry(observability: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&observability.log_level))
        .map_err(|e| anyhow!("Invalid log level '{}': {}", observability.log_level, e))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if observability.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!("gitcmd telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking related operations
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span describing a single command execution
pub fn create_command_span(command: &Command, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "command_execution",
        program = command.program(),
        subcommand = command.get_args().first().map(String::as_str),
        working_dir = ?command.get_current_dir(),
        correlation.id = correlation_id,
    )
}
