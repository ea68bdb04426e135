//! Error taxonomy for the highlight pipeline.
//!
//! Failures are classified at the stage boundary: collaborator failures
//! (network, object store, transcode service) are retryable; missing or
//! malformed handoff records and configuration problems are not, and the
//! retry layer fails fast on them.

use std::time::Duration;
use thiserror::Error;

/// Error produced while loading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required configuration value is absent.
    #[error("missing required configuration value '{name}'")]
    Missing {
        /// The configuration variable name.
        name: String,
    },

    /// A configuration value is present but unusable.
    #[error("invalid configuration value '{name}': {reason}")]
    Invalid {
        /// The configuration variable name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Creates a missing-value error.
    #[must_use]
    pub fn missing(name: impl Into<String>) -> Self {
        Self::Missing { name: name.into() }
    }

    /// Creates an invalid-value error.
    #[must_use]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a single stage invocation.
#[derive(Debug, Error)]
pub enum StageError {
    /// An external collaborator call failed. Retrying can plausibly succeed.
    #[error("{context}: {message}")]
    Collaborator {
        /// Which collaborator interaction failed.
        context: String,
        /// The underlying error message.
        message: String,
    },

    /// An upstream handoff record is missing or malformed. Retrying the
    /// same stage cannot fix this.
    #[error("precondition failed: {what}")]
    Precondition {
        /// The precondition that did not hold.
        what: String,
    },

    /// Required configuration is missing or invalid. Fatal immediately.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl StageError {
    /// Creates a collaborator error from an interaction context and the
    /// collaborator's own error.
    #[must_use]
    pub fn collaborator(context: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Collaborator {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Creates a precondition error.
    #[must_use]
    pub fn precondition(what: impl Into<String>) -> Self {
        Self::Precondition { what: what.into() }
    }

    /// Returns true if a fresh attempt has a chance of succeeding.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Collaborator { .. })
    }
}

/// Terminal pipeline failure surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage exhausted its retry budget, or failed with a non-retryable
    /// error. Carries the total number of attempts actually made.
    #[error("stage '{stage}' failed after {attempts} attempt(s): {source}")]
    StageFailed {
        /// Name of the failing stage.
        stage: String,
        /// Attempts made before giving up.
        attempts: u32,
        /// The last stage error observed.
        source: StageError,
    },

    /// A stage reported success but its handoff record never became
    /// visible in the store within the settle window.
    #[error("record '{key}' written by stage '{stage}' not visible after {waited:?}")]
    SettleTimeout {
        /// Name of the stage whose record was awaited.
        stage: String,
        /// The handoff key that never appeared.
        key: String,
        /// How long the orchestrator polled.
        waited: Duration,
    },
}

impl PipelineError {
    /// Returns the name of the stage the pipeline halted on.
    #[must_use]
    pub fn stage(&self) -> &str {
        match self {
            Self::StageFailed { stage, .. } | Self::SettleTimeout { stage, .. } => stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_errors_are_retryable() {
        let err = StageError::collaborator("highlight API request", "connection reset");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_precondition_errors_are_not_retryable() {
        let err = StageError::precondition("metadata record missing");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_configuration_errors_are_not_retryable() {
        let err = StageError::from(ConfigError::missing("HIGHLIGHT_API_KEY"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_stage_failed_display_names_stage_and_attempts() {
        let err = PipelineError::StageFailed {
            stage: "fetch-highlights".to_string(),
            attempts: 3,
            source: StageError::collaborator("highlight API request", "503"),
        };

        let rendered = err.to_string();
        assert!(rendered.contains("fetch-highlights"));
        assert!(rendered.contains("3 attempt(s)"));
        assert_eq!(err.stage(), "fetch-highlights");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid("QUERY_LIMIT", "not an integer");
        assert_eq!(
            err.to_string(),
            "invalid configuration value 'QUERY_LIMIT': not an integer"
        );
    }
}
