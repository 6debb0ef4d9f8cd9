//! testinium-pipeline - run a Testinium test plan from a CI step

pub mod api;
pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;

// Re-export commonly used types
pub use api::{ApiClientConfig, TestiniumApi, TestiniumHttpClient};
pub use core::{ResultSummary, RunConfig, RunContext, Stage, StageOutcome, WorkflowError};
pub use execution::{
    exit_code, DeadlineGuard, ThresholdEvaluator, Verdict, WorkflowEvent, WorkflowOrchestrator,
};
pub use persistence::{EnvFileSink, ResultSink};
