//! CLI errors. Every variant ends the process with a failure exit code.

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Why `tenfoot` exited unsuccessfully
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings or build features do not allow the requested run
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// A command-line value was not understood
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What is wrong
        message: String,
    },

    /// The run completed and at least one scenario failed
    #[error("{failed} of {total} scenarios failed")]
    ScenariosFailed {
        /// Failed scenarios
        failed: usize,
        /// Scenarios run
        total: usize,
    },

    /// The tracing subscriber could not be installed
    #[error("Logging error: {message}")]
    Logging {
        /// What is wrong
        message: String,
    },

    /// Async runtime could not start
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reports could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings loading, browser launch and other library errors
    #[error(transparent)]
    Tenfoot(#[from] tenfoot::TenfootError),
}

impl CliError {
    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
