//! Workflow error taxonomy

use crate::core::{report::ResultSummary, state::Stage};
use std::path::PathBuf;
use thiserror::Error;

/// Terminal failures of a pipeline run
///
/// Every variant stops the run. Each maps to its own non-zero exit code so
/// the CI step can tell an infrastructure failure from a failing test run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{stage}: deadline exceeded before the next attempt could start")]
    Timeout { stage: Stage },

    #[error("{stage}: gave up after {attempts} attempts (last error: {last_error})")]
    RetryExhausted {
        stage: Stage,
        attempts: usize,
        last_error: String,
    },

    #[error("{stage}: malformed response: {message}")]
    MalformedResponse { stage: Stage, message: String },

    #[error("{stage}: response is missing required field '{field}'")]
    MissingRequiredField { stage: Stage, field: &'static str },

    #[error("test run failed: {reason} ({summary})")]
    ThresholdFailure {
        reason: String,
        summary: ResultSummary,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to write results to {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("negative count in percentage {numerator}/{denominator}")]
    NegativeCount { numerator: i64, denominator: i64 },
}

impl WorkflowError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkflowError::ThresholdFailure { .. } => 1,
            WorkflowError::RetryExhausted { .. } => 2,
            WorkflowError::Timeout { .. } => 3,
            WorkflowError::MissingRequiredField { .. } => 4,
            WorkflowError::MalformedResponse { .. } => 5,
            WorkflowError::Config(_) => 6,
            WorkflowError::Output { .. } => 7,
            WorkflowError::NegativeCount { .. } => 8,
        }
    }

    /// Stage the failure belongs to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            WorkflowError::Timeout { stage }
            | WorkflowError::RetryExhausted { stage, .. }
            | WorkflowError::MalformedResponse { stage, .. }
            | WorkflowError::MissingRequiredField { stage, .. } => Some(*stage),
            WorkflowError::ThresholdFailure { .. } | WorkflowError::NegativeCount { .. } => {
                Some(Stage::Evaluate)
            }
            WorkflowError::Output { .. } => Some(Stage::Evaluate),
            WorkflowError::Config(_) => None,
        }
    }

    /// Whether the run failed because of the test results rather than the infrastructure
    pub fn is_test_failure(&self) -> bool {
        matches!(self, WorkflowError::ThresholdFailure { .. })
    }
}
