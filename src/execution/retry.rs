//! Bounded retries for a single remote call
//!
//! Every non-success outcome is retried the same way: client errors,
//! server errors and malformed responses all count against the stage's
//! budget and the next attempt starts immediately. There is no backoff.

use crate::core::{Stage, StageOutcome, WorkflowError};
use crate::execution::DeadlineGuard;
use std::future::Future;
use tracing::{debug, warn};

/// Attempt counter for one stage
///
/// `attempts_made` starts at 1 for the first attempt. A stage whose budget
/// is exhausted aborts the run.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    stage: Stage,
    attempts_made: usize,
    max_attempts: usize,
}

impl RetryBudget {
    pub fn new(stage: Stage, max_attempts: usize) -> Self {
        Self {
            stage,
            attempts_made: 1,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Attempts made so far, including the one in progress
    pub fn attempts_made(&self) -> usize {
        self.attempts_made
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts_made >= self.max_attempts
    }

    /// Charge a failed attempt
    ///
    /// Returns `RetryExhausted` when no attempts remain, otherwise moves on
    /// to the next attempt.
    pub fn record_failure(&mut self, last_error: String) -> Result<(), WorkflowError> {
        if self.is_exhausted() {
            return Err(WorkflowError::RetryExhausted {
                stage: self.stage,
                attempts: self.attempts_made,
                last_error,
            });
        }
        self.attempts_made += 1;
        Ok(())
    }
}

/// Payload of a successful call plus the attempts it took
#[derive(Debug, Clone, PartialEq)]
pub struct RetryOutput<T> {
    pub value: T,
    pub attempts: usize,
}

/// Run `invoke` until it succeeds, the budget runs out or the deadline passes
///
/// The deadline is checked before every attempt. An expired deadline fails
/// with `Timeout` and is not charged to the budget.
pub async fn retry_call<T, F, Fut>(
    stage: Stage,
    max_attempts: usize,
    deadline: &DeadlineGuard,
    mut invoke: F,
) -> Result<RetryOutput<T>, WorkflowError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StageOutcome<T>>,
{
    let mut budget = RetryBudget::new(stage, max_attempts);

    loop {
        deadline.ensure_active(stage)?;

        debug!(
            "{}: attempt {}/{}",
            stage,
            budget.attempts_made(),
            budget.max_attempts()
        );

        let outcome = invoke().await;
        let message = match outcome {
            StageOutcome::Success(value) => {
                return Ok(RetryOutput {
                    value,
                    attempts: budget.attempts_made(),
                });
            }
            failed => failed.failure_message().unwrap_or_default(),
        };

        warn!(
            "{}: attempt {}/{} failed: {}",
            stage,
            budget.attempts_made(),
            budget.max_attempts(),
            message
        );
        budget.record_failure(message)?;
    }
}
