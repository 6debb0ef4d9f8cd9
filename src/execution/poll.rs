//! Status polling loop

use crate::core::{Stage, StageOutcome, WorkflowError};
use crate::execution::{retry::RetryBudget, DeadlineGuard};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What the poll loop did before the plan went idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    /// Status queries sent, including failed ones
    pub queries: usize,

    /// Intervals slept while the plan was running
    pub sleeps: usize,

    /// Attempts charged to the stage's retry budget
    pub attempts: usize,
}

/// Poll `query` until it reports the plan is no longer running
///
/// `query` resolves to `true` while the plan is still running. Each
/// "running" answer triggers `on_running` and one `interval` of sleep.
/// Failed queries are charged to a single budget shared by the whole loop
/// and re-sent immediately. The deadline is checked before every query, so
/// the loop ends with "not running", `Timeout` or `RetryExhausted`.
pub async fn poll_until_idle<F, Fut, R>(
    stage: Stage,
    interval: Duration,
    max_attempts: usize,
    deadline: &DeadlineGuard,
    mut query: F,
    mut on_running: R,
) -> Result<PollSummary, WorkflowError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StageOutcome<bool>>,
    R: FnMut(usize),
{
    let mut budget = RetryBudget::new(stage, max_attempts);
    let mut queries = 0;
    let mut sleeps = 0;

    loop {
        deadline.ensure_active(stage)?;

        queries += 1;
        match query().await {
            StageOutcome::Success(true) => {
                debug!("{}: plan still running after {} queries", stage, queries);
                on_running(queries);
                tokio::time::sleep(interval).await;
                sleeps += 1;
            }
            StageOutcome::Success(false) => {
                info!("{}: plan is idle after {} queries", stage, queries);
                return Ok(PollSummary {
                    queries,
                    sleeps,
                    attempts: budget.attempts_made(),
                });
            }
            failed => {
                let message = failed.failure_message().unwrap_or_default();
                warn!(
                    "{}: status query failed (attempt {}/{}): {}",
                    stage,
                    budget.attempts_made(),
                    budget.max_attempts(),
                    message
                );
                budget.record_failure(message)?;
            }
        }
    }
}
