//! Structured logging for the CLI
//!
//! Installs one global `tracing` subscriber writing to stderr, so stdout
//! stays free for reports. `RUST_LOG` overrides the level picked by `-v`.
//!
//! ```ignore
//! use tenfoot_cli::{init_logging, LogFormat, Verbosity};
//!
//! init_logging(Verbosity::Verbose.log_filter(), LogFormat::Json)?;
//! ```

use crate::error::{CliError, CliResult};
use std::sync::OnceLock;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-friendly lines
    #[default]
    Pretty,
    /// JSON lines
    Json,
}

/// Install the global subscriber with `level` as fallback filter
pub fn init_logging(level: &str, format: LogFormat) -> CliResult<()> {
    if LOGGING_INITIALIZED.get().is_some() {
        return Err(CliError::Logging {
            message: "logging already initialized".to_string(),
        });
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let installed = match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
    };
    installed.map_err(|e| CliError::Logging {
        message: e.to_string(),
    })?;

    let _ = LOGGING_INITIALIZED.set(());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_is_pretty() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }

    #[test]
    fn test_second_init_fails() {
        // The first call may already have happened in another test
        let _ = init_logging("warn", LogFormat::Pretty);
        assert!(init_logging("warn", LogFormat::Json).is_err());
    }
}
