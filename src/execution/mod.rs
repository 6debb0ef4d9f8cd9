//! Pipeline execution engine

pub mod deadline;
pub mod engine;
pub mod poll;
pub mod retry;
pub mod threshold;

pub use deadline::DeadlineGuard;
pub use engine::{exit_code, WorkflowEvent, WorkflowOrchestrator};
pub use poll::{poll_until_idle, PollSummary};
pub use retry::{retry_call, RetryBudget, RetryOutput};
pub use threshold::{percent, ThresholdEvaluator, Verdict};
