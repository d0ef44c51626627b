//! Result and error types for tenfoot.
//!
//! Failures fall into the three observational classes a scenario can end
//! with (precondition, search exhaustion, postcondition) plus the
//! infrastructure errors raised by drivers and configuration loading.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for tenfoot operations
pub type TenfootResult<T> = Result<T, TenfootError>;

/// Errors that can occur while driving the target application
#[derive(Debug, Error)]
pub enum TenfootError {
    /// An expected element, URL or state never appeared within its timeout
    #[error("Precondition failed: {what} (after {timeout_ms}ms)")]
    Precondition {
        /// What was being waited for
        what: String,
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// The grid scanner ran out of attempts without focusing the target
    #[error("Target {target:?} not found after {attempts} attempts")]
    SearchExhausted {
        /// Target description
        target: String,
        /// Attempts spent
        attempts: usize,
    },

    /// An expected count, membership or URL relation did not hold
    #[error("Postcondition failed: {message}")]
    Postcondition {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Script evaluation error
    #[error("Evaluation failed: {message}")]
    Evaluation {
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Selector the driver cannot evaluate
    #[error("Invalid selector {selector:?}: {message}")]
    InvalidSelector {
        /// Offending selector
        selector: String,
        /// Error message
        message: String,
    },

    /// A direct interaction targeted a selector with no match
    #[error("No element matches {selector:?}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// URL parse error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Coarse classification of a failure, reported per scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Expected DOM/URL state never appeared
    Precondition,
    /// Grid scan budget exhausted
    SearchExhausted,
    /// Expected change did not materialize
    Postcondition,
    /// Driver, browser or configuration problem
    Infrastructure,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Precondition => "precondition",
            Self::SearchExhausted => "search-exhausted",
            Self::Postcondition => "postcondition",
            Self::Infrastructure => "infrastructure",
        };
        f.write_str(name)
    }
}

impl TenfootError {
    /// Create a precondition error
    #[must_use]
    pub fn precondition(what: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Precondition {
            what: what.into(),
            timeout_ms,
        }
    }

    /// Create a postcondition error
    #[must_use]
    pub fn postcondition(message: impl Into<String>) -> Self {
        Self::Postcondition {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an evaluation error
    #[must_use]
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// Classify the error
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Precondition { .. } => FailureKind::Precondition,
            Self::SearchExhausted { .. } => FailureKind::SearchExhausted,
            Self::Postcondition { .. } => FailureKind::Postcondition,
            _ => FailureKind::Infrastructure,
        }
    }
}

/// Fail with a postcondition error unless `condition` holds.
///
/// # Errors
///
/// Returns [`TenfootError::Postcondition`] carrying `message` when the
/// condition is false.
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> TenfootResult<()> {
    if condition {
        Ok(())
    } else {
        Err(TenfootError::postcondition(message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            TenfootError::precondition("grid", 10).kind(),
            FailureKind::Precondition
        );
        assert_eq!(
            TenfootError::SearchExhausted {
                target: "x".into(),
                attempts: 3
            }
            .kind(),
            FailureKind::SearchExhausted
        );
        assert_eq!(
            TenfootError::postcondition("count").kind(),
            FailureKind::Postcondition
        );
        assert_eq!(
            TenfootError::config("bad").kind(),
            FailureKind::Infrastructure
        );
    }

    #[test]
    fn test_display_messages() {
        let err = TenfootError::precondition("genres grid visible", 10_000);
        assert_eq!(
            err.to_string(),
            "Precondition failed: genres grid visible (after 10000ms)"
        );
        let err = TenfootError::SearchExhausted {
            target: "Drama".into(),
            attempts: 100,
        };
        assert!(err.to_string().contains("\"Drama\""));
        assert!(err.to_string().contains("100 attempts"));
    }

    #[test]
    fn test_ensure() {
        assert!(ensure(true, || "unused".into()).is_ok());
        let err = ensure(false, || "count should increase".into()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Postcondition);
        assert!(err.to_string().contains("count should increase"));
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::SearchExhausted.to_string(), "search-exhausted");
        let json = serde_json::to_string(&FailureKind::Postcondition).unwrap();
        assert_eq!(json, "\"postcondition\"");
    }
}
