//! Bounded retry of a stage invocation with a flat delay.

use crate::errors::PipelineError;
use crate::stages::Stage;
use std::time::Duration;

/// Bounded re-attempt rule applied to one stage invocation.
///
/// The delay is flat; no backoff growth or jitter. Non-retryable errors
/// (failed preconditions, configuration problems) short-circuit the
/// budget and fail on the attempt they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts, including the initial one. Clamped to at least 1.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the default budget.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the delay between attempts.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Runs a stage under a retry policy.
///
/// Each attempt is a fresh, independent invocation. On exhaustion the
/// last stage error is wrapped in a [`PipelineError::StageFailed`]
/// carrying the stage name and the exact number of attempts made.
///
/// # Errors
///
/// Returns [`PipelineError::StageFailed`] when the stage never succeeds.
pub async fn run_with_retry(stage: &dyn Stage, policy: &RetryPolicy) -> Result<(), PipelineError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        tracing::debug!(stage = stage.name(), attempt, max_attempts, "executing stage");

        let err = match stage.execute().await {
            Ok(()) => {
                tracing::info!(stage = stage.name(), attempt, "stage succeeded");
                return Ok(());
            }
            Err(err) => err,
        };

        if !err.is_retryable() {
            tracing::error!(
                stage = stage.name(),
                attempt,
                error = %err,
                "stage failed with non-retryable error"
            );
            return Err(PipelineError::StageFailed {
                stage: stage.name().to_string(),
                attempts: attempt,
                source: err,
            });
        }

        if attempt < max_attempts {
            tracing::warn!(
                stage = stage.name(),
                attempt,
                max_attempts,
                delay_ms = policy.delay.as_millis() as u64,
                error = %err,
                "stage attempt failed, retrying"
            );
            tokio::time::sleep(policy.delay).await;
        } else {
            tracing::error!(
                stage = stage.name(),
                attempts = attempt,
                error = %err,
                "stage failed, retry budget exhausted"
            );
            return Err(PipelineError::StageFailed {
                stage: stage.name().to_string(),
                attempts: attempt,
                source: err,
            });
        }
    }
}
