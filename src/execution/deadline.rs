//! Wall-clock deadline shared by every stage

use crate::core::{Stage, WorkflowError};
use std::time::Duration;
use tokio::time::Instant;

/// A fixed point in time after which no remote call may start
///
/// Uses the runtime clock, so paused-time tests can move past it without
/// waiting.
#[derive(Debug, Clone, Copy)]
pub struct DeadlineGuard {
    deadline: Instant,
}

impl DeadlineGuard {
    /// Deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
        }
    }

    /// True once the current time is at or after the deadline
    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Fail with `Timeout` for `stage` when the deadline has passed
    pub fn ensure_active(&self, stage: Stage) -> Result<(), WorkflowError> {
        if self.expired() {
            return Err(WorkflowError::Timeout { stage });
        }
        Ok(())
    }
}
